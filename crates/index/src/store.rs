use async_trait::async_trait;
use chrono::{DateTime, Utc};
use extract::Triple;
use ontology::{Statement, Term, display_name, mint_iri};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Base IRI of named graphs.
pub const GRAPH_BASE: &str = "http://graph/";

pub fn graph_iri(graph_name: &str) -> String {
    mint_iri(GRAPH_BASE, graph_name)
}

/// Graph name used when an approval does not supply one.
pub fn default_graph_name(extraction_id: &str) -> String {
    let short: String = extraction_id.chars().take(8).collect();
    format!("MSDS_Graph_{short}")
}

fn term_text(term: &Term) -> String {
    match term {
        Term::Iri(iri) => display_name(iri),
        other => other.value().to_string(),
    }
}

/// A stored statement as a display triple.
pub fn decode_statement(statement: &Statement) -> Option<Triple> {
    Triple::new(
        &term_text(&statement.subject),
        &display_name(&statement.predicate),
        &term_text(&statement.object),
    )
}

/// Outcome of an insert. Some statements may be stored while others fail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreReport {
    pub graph_iri: String,
    pub stored: usize,
    pub failed: usize,
    pub total: usize,
}

impl StoreReport {
    pub fn new(graph_iri: impl Into<String>, total: usize) -> Self {
        Self {
            graph_iri: graph_iri.into(),
            stored: 0,
            failed: 0,
            total,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.failed == 0 && self.stored == self.total
    }

    pub fn is_partial(&self) -> bool {
        self.stored > 0 && self.failed > 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphInfo {
    pub graph_iri: String,
    pub graph_name: String,
    pub extraction_id: String,
    pub created: DateTime<Utc>,
    pub triples_count: usize,
    pub document_pages: usize,
    pub document_length: usize,
    pub validation_score: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct StoreHealth {
    pub backend: &'static str,
    pub reachable: bool,
    pub detail: Option<String>,
}

/// Persistence collaborator for approved graphs.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Store statements into a named graph. A failing batch counts its
    /// statements as failed; later batches are still attempted.
    async fn insert(&self, graph_iri: &str, statements: &[Statement]) -> Result<StoreReport>;

    async fn record_graph(&self, info: GraphInfo) -> Result<()>;

    /// Recorded graphs, newest first.
    async fn list_graphs(&self) -> Result<Vec<GraphInfo>>;

    /// Case-insensitive substring search over subject, predicate and object.
    /// Results carry IRIs decoded to their local names.
    async fn search(&self, graph_iri: &str, term: &str, limit: usize) -> Result<Vec<Triple>>;

    /// Up to `limit` statements of a graph, decoded like [`GraphStore::search`].
    /// A graph without statements is [`crate::StoreError::GraphNotFound`].
    async fn triples(&self, graph_iri: &str, limit: usize) -> Result<Vec<Triple>>;

    async fn health(&self) -> StoreHealth;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn graph_names() {
        assert_eq!(default_graph_name("1b4e28ba-2fa1-11d2"), "MSDS_Graph_1b4e28ba");
        assert_eq!(default_graph_name("abc"), "MSDS_Graph_abc");
        assert_eq!(graph_iri("WD 40"), "http://graph/WD%2040");
    }

    #[test]
    fn decodes_minted_iris() {
        let statements = ontology::triple_statements(&[Triple::new("WD-40", "is a", "Aerosol product").unwrap()]);
        assert_eq!(
            decode_statement(&statements[0]),
            Triple::new("WD-40", "is a", "Aerosol product")
        );
    }

    #[test]
    fn report_states() {
        let mut report = StoreReport::new("http://graph/g", 10);
        report.stored = 10;
        assert!(report.is_complete());
        report.stored = 6;
        report.failed = 4;
        assert!(report.is_partial());
        assert!(!report.is_complete());
    }
}
