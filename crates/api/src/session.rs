use chrono::{DateTime, Utc};
use extract::ExtractionResult;
use ingest::ValidationResult;
use serde::Serialize;
use std::path::PathBuf;

/// An uploaded document and its validation. The session owns the saved file.
#[derive(Debug, Clone, Serialize)]
pub struct UploadSession {
    pub upload_id: String,
    pub filename: String,
    pub path: PathBuf,
    pub uploaded: DateTime<Utc>,
    pub validation: ValidationResult,
}

/// One completed extraction. Refers to its upload by id only.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionSession {
    pub extraction_id: String,
    pub upload_id: String,
    pub extracted: DateTime<Utc>,
    pub result: ExtractionResult,
}

/// Keep ASCII letters, digits, `.`, `-` and `_`; everything else becomes `_`.
/// Leading dots are dropped so the name cannot climb out of its directory.
pub fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    cleaned.trim_start_matches('.').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filenames_are_sanitized() {
        assert_eq!(sanitize_filename("WD-40 sheet.txt"), "WD-40_sheet.txt");
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("C:\\docs\\msds.md"), "msds.md");
        assert_eq!(sanitize_filename("..hidden.txt"), "hidden.txt");
    }
}
