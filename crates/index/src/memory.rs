use async_trait::async_trait;
use dashmap::DashMap;
use extract::Triple;
use ontology::Statement;
use std::sync::Arc;

use crate::error::{Result, StoreError};
use crate::store::{GraphInfo, GraphStore, StoreHealth, StoreReport, decode_statement};

/// In-process store, for tests and single-node deployments without a
/// triple store.
#[derive(Clone)]
pub struct MemoryStore {
    graphs: Arc<DashMap<String, Vec<Statement>>>,
    metadata: Arc<DashMap<String, GraphInfo>>,
    batch_size: usize,
    failing_batch: Option<usize>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(100)
    }
}

impl MemoryStore {
    pub fn new(batch_size: usize) -> Self {
        Self {
            graphs: Arc::new(DashMap::new()),
            metadata: Arc::new(DashMap::new()),
            batch_size: batch_size.max(1),
            failing_batch: None,
        }
    }

    /// Reject the batch with this zero-based index on every insert.
    pub fn with_failing_batch(mut self, batch: usize) -> Self {
        self.failing_batch = Some(batch);
        self
    }

    pub fn statement_count(&self, graph_iri: &str) -> usize {
        self.graphs.get(graph_iri).map(|g| g.len()).unwrap_or(0)
    }

    fn decoded(&self, graph_iri: &str) -> Vec<Triple> {
        self.graphs
            .get(graph_iri)
            .map(|g| g.iter().filter_map(decode_statement).collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl GraphStore for MemoryStore {
    async fn insert(&self, graph_iri: &str, statements: &[Statement]) -> Result<StoreReport> {
        let mut report = StoreReport::new(graph_iri, statements.len());
        let mut graph = self.graphs.entry(graph_iri.to_string()).or_default();

        for (i, batch) in statements.chunks(self.batch_size).enumerate() {
            if self.failing_batch == Some(i) {
                report.failed += batch.len();
                continue;
            }
            graph.extend_from_slice(batch);
            report.stored += batch.len();
        }
        Ok(report)
    }

    async fn record_graph(&self, info: GraphInfo) -> Result<()> {
        self.metadata.insert(info.graph_iri.clone(), info);
        Ok(())
    }

    async fn list_graphs(&self) -> Result<Vec<GraphInfo>> {
        let mut graphs: Vec<GraphInfo> = self.metadata.iter().map(|e| e.value().clone()).collect();
        graphs.sort_by(|a, b| b.created.cmp(&a.created));
        Ok(graphs)
    }

    async fn search(&self, graph_iri: &str, term: &str, limit: usize) -> Result<Vec<Triple>> {
        let needle = term.to_lowercase();
        Ok(self
            .decoded(graph_iri)
            .into_iter()
            .filter(|t| {
                [&t.subject, &t.predicate, &t.object]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&needle))
            })
            .take(limit)
            .collect())
    }

    async fn triples(&self, graph_iri: &str, limit: usize) -> Result<Vec<Triple>> {
        if self.statement_count(graph_iri) == 0 {
            return Err(StoreError::GraphNotFound(graph_iri.to_string()));
        }
        Ok(self.decoded(graph_iri).into_iter().take(limit).collect())
    }

    async fn health(&self) -> StoreHealth {
        StoreHealth {
            backend: "memory",
            reachable: true,
            detail: Some(format!("{} graphs", self.graphs.len())),
        }
    }
}
