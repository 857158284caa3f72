pub mod error;
pub mod llm;
pub mod parser;
pub mod prompt;
pub mod quality;
pub mod schema;

pub use error::{ExtractError, Result};
pub use llm::{FixedResponse, GenerationOptions, Generator, OllamaClient};
pub use parser::{ParseReport, STRATEGIES, TRIPLE_DELIMITER, TripleParser};
pub use prompt::TriplePrompt;
pub use quality::{PREDICATE_VOCABULARY, PredicateCount, QualityMetrics, analyze};
pub use schema::{ExtractionResult, Triple};

use ingest::Document;
use std::sync::Arc;
use tracing::{info, warn};

/// Message attached to results whose generator output held no triples.
pub const EMPTY_YIELD_MESSAGE: &str =
    "The generator response contained no parseable triples. Try re-running the extraction.";

pub struct Extractor {
    generator: Arc<dyn Generator>,
    prompt: TriplePrompt,
    parser: TripleParser,
}

impl Extractor {
    pub fn new(generator: Arc<dyn Generator>, prompt: TriplePrompt) -> Self {
        Self {
            generator,
            prompt,
            parser: TripleParser::default(),
        }
    }

    pub fn generator(&self) -> &Arc<dyn Generator> {
        &self.generator
    }

    /// Render the prompt for a document.
    pub fn build_prompt(&self, document: &Document) -> String {
        self.prompt.render(&document.text)
    }

    /// Prompt, generate, parse and score a document.
    pub async fn extract(&self, document: &Document) -> Result<ExtractionResult> {
        let prompt = self.build_prompt(document);
        let response = self.generator.generate(&prompt).await?;
        Ok(self.process_response(&response, document))
    }

    /// Turn an already generated response into an extraction result.
    pub fn process_response(&self, response: &str, document: &Document) -> ExtractionResult {
        let triples = self.parser.parse(response);
        let quality = analyze(&triples, response);

        if triples.is_empty() {
            warn!(
                response_length = response.len(),
                "Generator response yielded no triples"
            );
        } else {
            info!(
                triples = triples.len(),
                correct_format = quality.correct_format_percentage,
                "Extracted triples"
            );
        }

        ExtractionResult {
            triples,
            quality,
            raw_response_length: response.len(),
            document_pages: document.pages,
            document_length: document.len(),
        }
    }
}
