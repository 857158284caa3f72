use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use ingest::{generate_doc_id, ingest_file};
use ontology::{RdfFormat, build_schema, document_statements, serialize};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "msds_rdf", about = "Write the MSDS ontology or a document's instance data as RDF")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serialize the ontology schema.
    Schema {
        #[arg(long, default_value = "turtle")]
        format: RdfFormat,
        /// Write to this file instead of stdout.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Validate, segment and map a text document.
    Convert {
        file: PathBuf,
        #[arg(long, default_value = "turtle")]
        format: RdfFormat,
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let (rendered, out) = match cli.command {
        Command::Schema { format, out } => (serialize(&build_schema().statements(), format)?, out),
        Command::Convert { file, format, out } => {
            let (document, validation) = ingest_file(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;
            eprintln!(
                "Validation score {:.2} ({} of {} sections)",
                validation.score,
                validation.sections_found_count(),
                validation.total_sections_required()
            );
            if validation.sections_found_count() == 0 {
                bail!("{} has no recognizable MSDS sections", file.display());
            }

            let title = file
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            let statements = document_statements(&generate_doc_id(&document.text), &title, &document.text);
            eprintln!("Mapped {} statements", statements.len());
            (serialize(&statements, format)?, out)
        }
    };

    match out {
        Some(path) => std::fs::write(&path, rendered)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => print!("{rendered}"),
    }
    Ok(())
}
