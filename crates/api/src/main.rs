use anyhow::{Context, Result};
use api::config::StoreKind;
use api::logging::init_logging;
use api::{AppConfig, AppState, router};
use clap::Parser;
use extract::{GenerationOptions, Generator, OllamaClient};
use index::{GraphStore, MemoryStore, SparqlStore};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "msds-server", about = "MSDS knowledge graph extraction API")]
struct Cli {
    /// TOML configuration file. Defaults apply to anything it leaves out.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Listen address, overriding `server.bind`.
    #[arg(long)]
    bind: Option<String>,

    /// Log as JSON lines.
    #[arg(long)]
    log_json: bool,
}

fn build_generator(config: &AppConfig) -> Result<Arc<dyn Generator>> {
    let options = GenerationOptions {
        temperature: config.generator.temperature,
        max_tokens: config.generator.max_tokens,
        top_p: config.generator.top_p,
    };
    let client = OllamaClient::new(
        config.generator.base_url.clone(),
        config.generator.model.clone(),
        options,
        config.generator_timeout(),
    )
    .context("Failed to build generator client")?;
    Ok(Arc::new(client))
}

fn build_store(config: &AppConfig) -> Result<Arc<dyn GraphStore>> {
    Ok(match config.store.kind {
        StoreKind::Memory => Arc::new(MemoryStore::new(config.store.batch_size)),
        StoreKind::Sparql => Arc::new(
            SparqlStore::new(
                config.store.query_endpoint.clone(),
                config.store.update_endpoint.clone(),
                config.store.batch_size,
                config.store_timeout(),
            )
            .context("Failed to build SPARQL store")?,
        ),
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_json);

    let mut config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.server.bind = bind;
    }
    config.validate()?;

    tokio::fs::create_dir_all(&config.server.upload_dir)
        .await
        .context("Failed to create upload directory")?;
    tokio::fs::create_dir_all(config.graphs_dir())
        .await
        .context("Failed to create static directory")?;

    let generator = build_generator(&config)?;
    let store = build_store(&config)?;

    let health = store.health().await;
    if health.reachable {
        info!(backend = health.backend, "Graph store reachable");
    } else {
        warn!(backend = health.backend, detail = ?health.detail, "Graph store unreachable");
    }

    let bind = config.server.bind.clone();
    let app = router(AppState::new(config, generator, store));

    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("Failed to bind {bind}"))?;

    info!("Server listening on http://{bind}");

    axum::serve(listener, app).await?;
    Ok(())
}
