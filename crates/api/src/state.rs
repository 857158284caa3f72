use extract::{Extractor, Generator, TriplePrompt};
use index::GraphStore;
use layout::LayoutConfig;
use ontology::{Ontology, allowed_attributes, build_schema};
use query::ChatService;
use std::sync::Arc;

use crate::cache::{InFlight, SessionStore};
use crate::config::AppConfig;
use crate::metrics::Metrics;
use crate::retry::RetryPolicy;
use crate::session::{ExtractionSession, UploadSession};

/// Everything a handler needs, created once at startup and injected.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub uploads: SessionStore<UploadSession>,
    pub extractions: SessionStore<ExtractionSession>,
    /// Uploads with an extraction running.
    pub in_flight: InFlight,
    pub extractor: Arc<Extractor>,
    pub store: Arc<dyn GraphStore>,
    pub chat: Arc<ChatService>,
    pub schema: Arc<Ontology>,
    pub layout: LayoutConfig,
    pub metrics: Arc<Metrics>,
    pub retry: Arc<RetryPolicy>,
}

impl AppState {
    pub fn new(config: AppConfig, generator: Arc<dyn Generator>, store: Arc<dyn GraphStore>) -> Self {
        let prompt = if config.generator.ontology_prompt {
            TriplePrompt::ontology_aware(allowed_attributes())
        } else {
            TriplePrompt::standard()
        };

        Self {
            uploads: SessionStore::new("Upload", config.cache.max_entries),
            extractions: SessionStore::new("Extraction", config.cache.max_entries),
            in_flight: InFlight::default(),
            extractor: Arc::new(Extractor::new(Arc::clone(&generator), prompt)),
            chat: Arc::new(ChatService::new(Arc::clone(&store), generator)),
            store,
            schema: Arc::new(build_schema()),
            layout: config.layout_config(),
            metrics: Metrics::new(),
            retry: Arc::new(RetryPolicy::new(
                config.retry.max_retries,
                config.retry.initial_backoff_ms,
                config.retry.max_backoff_ms,
            )),
            config: Arc::new(config),
        }
    }
}
