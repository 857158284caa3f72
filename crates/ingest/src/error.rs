use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("Document is not readable as text: {0}")]
    Unreadable(String),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl IngestError {
    /// Machine-readable error kind reported to callers.
    pub fn kind(&self) -> &'static str {
        match self {
            IngestError::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound => {
                "NotFoundError"
            }
            _ => "ValidationError",
        }
    }
}

pub type Result<T> = std::result::Result<T, IngestError>;
