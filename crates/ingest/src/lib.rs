pub mod error;
pub mod reader;
pub mod section;
pub mod segment;
pub mod validator;

pub use error::{IngestError, Result};
pub use reader::{Document, FileReader};
pub use section::{SECTION_COUNT, Section, SectionRequirements, section_requirements};
pub use segment::{SectionText, segment_sections};
pub use validator::{SectionDetail, ValidationResult, validate, validate_bytes};

use sha2::{Digest, Sha256};

/// Stable document id from document content
pub fn generate_doc_id(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let result = hasher.finalize();
    hex::encode(&result[..16])
}

/// Read a document from disk and validate it in one step.
pub async fn ingest_file(path: &std::path::Path) -> Result<(Document, ValidationResult)> {
    let document = FileReader::read_file(path).await?;
    let validation = validate(&document.text);
    tracing::info!(
        path = %path.display(),
        pages = document.pages,
        score = validation.score,
        "Ingested document"
    );
    Ok((document, validation))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doc_ids_are_stable_and_short() {
        let a = generate_doc_id("WD-40");
        assert_eq!(a, generate_doc_id("WD-40"));
        assert_ne!(a, generate_doc_id("WD-41"));
        assert_eq!(a.len(), 32);
    }
}
