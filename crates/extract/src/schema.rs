use serde::{Deserialize, Serialize};

use crate::quality::QualityMetrics;

/// A subject-predicate-object statement. Fields are never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Triple {
    pub subject: String,
    pub predicate: String,
    pub object: String,
}

impl Triple {
    /// Normalize the three fields and build a triple, or `None` when any
    /// field is empty after normalization.
    pub fn new(subject: &str, predicate: &str, object: &str) -> Option<Self> {
        let subject = normalize_field(subject);
        let predicate = normalize_field(predicate);
        let object = normalize_field(object);

        if subject.is_empty() || predicate.is_empty() || object.is_empty() {
            return None;
        }

        Some(Self {
            subject: subject.to_string(),
            predicate: predicate.to_string(),
            object: object.to_string(),
        })
    }

    /// Render back into the `(S, P, O)` line form the parser accepts.
    pub fn to_line(&self) -> String {
        format!("({}, {}, {})", self.subject, self.predicate, self.object)
    }
}

/// Trim whitespace and surrounding quote characters.
pub fn normalize_field(field: &str) -> &str {
    field.trim_matches(|c: char| c.is_whitespace() || c == '"' || c == '\'')
}

#[derive(Debug, Clone, Serialize)]
pub struct ExtractionResult {
    pub triples: Vec<Triple>,
    pub quality: QualityMetrics,
    pub raw_response_length: usize,
    pub document_pages: usize,
    pub document_length: usize,
}

impl ExtractionResult {
    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }
}
