use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub generator: GeneratorConfig,
    pub retry: RetryConfig,
    pub store: StoreConfig,
    pub layout: LayoutSettings,
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub upload_dir: PathBuf,
    /// Served under `/static`; graph images go to `graphs/` inside it.
    pub static_dir: PathBuf,
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: f32,
    pub timeout_secs: u64,
    /// Restrict extracted attributes to the ontology's data properties.
    pub ontology_prompt: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_retries: usize,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    Memory,
    Sparql,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub kind: StoreKind,
    pub query_endpoint: String,
    pub update_endpoint: String,
    pub batch_size: usize,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutSettings {
    pub iterations: usize,
    pub spring_k: f64,
    pub seed: u64,
    pub max_nodes: usize,
    /// Also write a PNG of each visualized graph.
    pub render_images: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub max_entries: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:5000".to_string(),
            upload_dir: PathBuf::from("uploads"),
            static_dir: PathBuf::from("static"),
            max_upload_bytes: 16 * 1024 * 1024,
        }
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "llama3".to_string(),
            temperature: 0.3,
            max_tokens: 20000,
            top_p: 0.9,
            timeout_secs: 300,
            ontology_prompt: false,
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff_ms: 1000,
            max_backoff_ms: 10000,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            kind: StoreKind::Memory,
            query_endpoint: String::new(),
            update_endpoint: String::new(),
            batch_size: 100,
            timeout_secs: 60,
        }
    }
}

impl Default for LayoutSettings {
    fn default() -> Self {
        let defaults = layout::LayoutConfig::default();
        Self {
            iterations: defaults.iterations,
            spring_k: defaults.k,
            seed: defaults.seed,
            max_nodes: defaults.max_nodes,
            render_images: true,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { max_entries: 10000 }
    }
}

impl AppConfig {
    pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&source)
    }

    /// Check every field once, reporting all problems together.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut problems = Vec::new();

        if self.server.bind.is_empty() {
            problems.push("server.bind is empty".to_string());
        }
        if self.server.max_upload_bytes == 0 {
            problems.push("server.max_upload_bytes must be positive".to_string());
        }
        if !(0.0..=2.0).contains(&self.generator.temperature) {
            problems.push(format!(
                "generator.temperature {} is outside 0.0-2.0",
                self.generator.temperature
            ));
        }
        if self.generator.max_tokens == 0 {
            problems.push("generator.max_tokens must be positive".to_string());
        }
        if self.generator.timeout_secs == 0 {
            problems.push("generator.timeout_secs must be positive".to_string());
        }
        if self.retry.initial_backoff_ms > self.retry.max_backoff_ms {
            problems.push("retry.initial_backoff_ms exceeds retry.max_backoff_ms".to_string());
        }
        if self.store.kind == StoreKind::Sparql
            && (self.store.query_endpoint.is_empty() || self.store.update_endpoint.is_empty())
        {
            problems.push("store.query_endpoint and store.update_endpoint are required for sparql".to_string());
        }
        if self.store.batch_size == 0 {
            problems.push("store.batch_size must be positive".to_string());
        }
        if self.layout.iterations == 0 || self.layout.max_nodes == 0 {
            problems.push("layout.iterations and layout.max_nodes must be positive".to_string());
        }
        if self.layout.spring_k <= 0.0 {
            problems.push("layout.spring_k must be positive".to_string());
        }
        if self.cache.max_entries == 0 {
            problems.push("cache.max_entries must be positive".to_string());
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(problems.join("; ")))
        }
    }

    pub fn generator_timeout(&self) -> Duration {
        Duration::from_secs(self.generator.timeout_secs)
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_secs(self.store.timeout_secs)
    }

    pub fn layout_config(&self) -> layout::LayoutConfig {
        layout::LayoutConfig {
            iterations: self.layout.iterations,
            k: self.layout.spring_k,
            seed: self.layout.seed,
            max_nodes: self.layout.max_nodes,
            ..layout::LayoutConfig::default()
        }
    }

    pub fn graphs_dir(&self) -> PathBuf {
        self.server.static_dir.join("graphs")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        AppConfig::default().validate().unwrap();
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [server]
            bind = "127.0.0.1:8080"

            [store]
            kind = "sparql"
            query_endpoint = "http://localhost:3030/msds/query"
            update_endpoint = "http://localhost:3030/msds/update"
            "#,
        )
        .unwrap();
        assert_eq!(config.server.bind, "127.0.0.1:8080");
        assert_eq!(config.server.max_upload_bytes, 16 * 1024 * 1024);
        assert_eq!(config.store.kind, StoreKind::Sparql);
        assert_eq!(config.store.batch_size, 100);
        config.validate().unwrap();
    }

    #[test]
    fn reports_every_problem() {
        let mut config = AppConfig::default();
        config.generator.temperature = 3.0;
        config.store.kind = StoreKind::Sparql;
        config.retry.initial_backoff_ms = 20000;

        let Err(ConfigError::Invalid(message)) = config.validate() else {
            panic!("expected invalid config");
        };
        assert!(message.contains("temperature"));
        assert!(message.contains("sparql"));
        assert!(message.contains("initial_backoff_ms"));
    }

    #[test]
    fn unknown_store_kind_is_a_parse_error() {
        assert!(matches!(
            AppConfig::from_toml("[store]\nkind = \"neo4j\""),
            Err(ConfigError::Parse(_))
        ));
    }
}
