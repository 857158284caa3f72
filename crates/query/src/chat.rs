use extract::{Generator, Triple};
use index::{GraphStore, graph_iri};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::Result;
use crate::summary::{GraphSummary, summarize, suggest_questions};
use crate::terms::{extract_key_terms, merge_unique};

pub const NO_RESULTS_ANSWER: &str =
    "I couldn't find any relevant information in the knowledge graph for your query.";

/// Triples handed to the generator as answer context.
const CONTEXT_TRIPLES: usize = 10;
const SEARCH_LIMIT: usize = 100;
const SUMMARY_SAMPLE: usize = 100;

#[derive(Debug, Clone, Serialize)]
pub struct ChatResponse {
    pub success: bool,
    pub query: String,
    pub answer: String,
    pub relevant_triples: Vec<Triple>,
    pub search_terms: Vec<String>,
    pub graph_name: String,
}

/// Prompt asking the generator to answer from a numbered list of triples.
pub fn answer_prompt(query: &str, triples: &[Triple]) -> String {
    let mut context =
        String::from("Based on the following information from the MSDS knowledge graph:\n\n");
    for (i, triple) in triples.iter().take(CONTEXT_TRIPLES).enumerate() {
        context.push_str(&format!(
            "{}. {} {} {}\n",
            i + 1,
            triple.subject,
            triple.predicate,
            triple.object
        ));
    }

    format!(
        r#"You are an expert assistant helping users understand Material Safety Data Sheets (MSDS) information.

{context}
User Question: {query}

Please provide a clear, accurate answer based on the information above. If the information is not sufficient to answer the question completely, say so and explain what information is available.

Answer:"#
    )
}

pub struct ChatService {
    store: Arc<dyn GraphStore>,
    generator: Arc<dyn Generator>,
}

impl ChatService {
    pub fn new(store: Arc<dyn GraphStore>, generator: Arc<dyn Generator>) -> Self {
        Self { store, generator }
    }

    /// Triples matching any key term of `query`, merged without duplicates.
    pub async fn relevant_triples(&self, query: &str, graph_name: &str) -> Result<(Vec<String>, Vec<Triple>)> {
        let graph = graph_iri(graph_name);
        let terms = extract_key_terms(query);

        let mut passes = Vec::with_capacity(terms.len());
        for term in &terms {
            let found = self.store.search(&graph, term, SEARCH_LIMIT).await?;
            debug!(term = %term, found = found.len(), "Searched graph");
            passes.push(found);
        }

        Ok((terms, merge_unique(passes)))
    }

    pub async fn chat(&self, query: &str, graph_name: &str) -> Result<ChatResponse> {
        let (search_terms, relevant_triples) = self.relevant_triples(query, graph_name).await?;

        if relevant_triples.is_empty() {
            info!(graph = graph_name, "No triples matched chat query");
            return Ok(ChatResponse {
                success: false,
                query: query.to_string(),
                answer: NO_RESULTS_ANSWER.to_string(),
                relevant_triples,
                search_terms,
                graph_name: graph_name.to_string(),
            });
        }

        let prompt = answer_prompt(query, &relevant_triples);
        let answer = self.generator.generate(&prompt).await?;
        info!(
            graph = graph_name,
            triples = relevant_triples.len(),
            "Answered chat query"
        );

        Ok(ChatResponse {
            success: true,
            query: query.to_string(),
            answer: answer.trim().to_string(),
            relevant_triples,
            search_terms,
            graph_name: graph_name.to_string(),
        })
    }

    pub async fn summary(&self, graph_name: &str) -> Result<GraphSummary> {
        let triples = self.store.triples(&graph_iri(graph_name), SUMMARY_SAMPLE).await?;
        Ok(summarize(graph_name, &triples))
    }

    pub async fn suggestions(&self, graph_name: &str) -> Result<Vec<String>> {
        let summary = self.summary(graph_name).await?;
        Ok(suggest_questions(&summary.sample_predicates))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use extract::FixedResponse;
    use index::MemoryStore;
    use ontology::triple_statements;

    async fn service(answer: &str) -> ChatService {
        let store = MemoryStore::default();
        let triples = vec![
            Triple::new("WD-40", "has", "Flash point -20 C").unwrap(),
            Triple::new("WD-40", "is classified as", "Flammable aerosol").unwrap(),
            Triple::new("Naphtha", "is a", "Ingredient").unwrap(),
        ];
        store
            .insert(&graph_iri("g"), &triple_statements(&triples))
            .await
            .unwrap();
        ChatService::new(Arc::new(store), Arc::new(FixedResponse::new(answer)))
    }

    #[tokio::test]
    async fn answers_from_matching_triples() {
        let chat = service("  It flashes at -20 C.  ").await;
        let response = chat.chat("What is the flash point of WD-40?", "g").await.unwrap();

        assert!(response.success);
        assert_eq!(response.answer, "It flashes at -20 C.");
        assert_eq!(response.search_terms, vec!["flash", "point", "wd-40"]);
        // "flash" finds the first triple; "wd-40" finds both WD-40 triples once more
        assert_eq!(response.relevant_triples.len(), 2);
        assert_eq!(response.relevant_triples[0].object, "Flash point -20 C");
    }

    #[tokio::test]
    async fn no_match_is_reported_without_generating() {
        let chat = service("unused").await;
        let response = chat.chat("Where is the lighthouse?", "g").await.unwrap();
        assert!(!response.success);
        assert_eq!(response.answer, NO_RESULTS_ANSWER);
        assert!(response.relevant_triples.is_empty());
    }

    #[tokio::test]
    async fn summary_and_suggestions_read_the_graph() {
        let chat = service("unused").await;
        let summary = chat.summary("g").await.unwrap();
        assert_eq!(summary.stats.total_triples, 3);
        assert_eq!(summary.stats.unique_subjects, 2);

        let questions = chat.suggestions("g").await.unwrap();
        assert_eq!(questions.len(), 10);
    }

    #[test]
    fn prompt_numbers_at_most_ten_triples() {
        let triples: Vec<Triple> = (0..12)
            .map(|i| Triple::new(&format!("s{i}"), "has", "o").unwrap())
            .collect();
        let prompt = answer_prompt("q", &triples);
        assert!(prompt.contains("10. s9 has o\n"));
        assert!(!prompt.contains("11. s10"));
        assert!(prompt.contains("User Question: q"));
    }
}
