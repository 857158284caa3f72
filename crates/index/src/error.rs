use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Store endpoint returned {status}: {body}")]
    Endpoint { status: u16, body: String },

    #[error("Malformed store response: {0}")]
    Malformed(String),

    #[error("Graph not found: {0}")]
    GraphNotFound(String),

    #[error("Invalid store configuration: {0}")]
    Config(String),
}

impl StoreError {
    pub fn kind(&self) -> &'static str {
        match self {
            StoreError::GraphNotFound(_) => "NotFoundError",
            StoreError::Config(_) => "ValidationError",
            _ => "StoreFailure",
        }
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
