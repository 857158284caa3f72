use serde::Serialize;
use std::path::Path;
use tokio::fs;

use crate::error::{IngestError, Result};

/// Text of a document plus its page count. Pages are separated by form
/// feeds, the convention of PDF-to-text tools.
#[derive(Debug, Clone, Serialize)]
pub struct Document {
    pub text: String,
    pub pages: usize,
}

impl Document {
    pub fn new(text: String) -> Self {
        let pages = text.split('\x0c').count();
        Self { text, pages }
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        String::from_utf8(bytes)
            .map(Self::new)
            .map_err(|e| IngestError::Unreadable(e.to_string()))
    }

    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

pub struct FileReader;

impl FileReader {
    /// Extensions accepted as already-extracted text.
    pub const TEXT_EXTENSIONS: [&'static str; 2] = ["txt", "md"];

    pub fn is_supported(path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| Self::TEXT_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
            .unwrap_or(false)
    }

    pub async fn read_file(path: &Path) -> Result<Document> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        if !Self::TEXT_EXTENSIONS.contains(&extension.as_str()) {
            return Err(IngestError::UnsupportedFormat(extension));
        }

        let bytes = fs::read(path).await.map_err(|source| IngestError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Document::from_bytes(bytes)
    }
}
