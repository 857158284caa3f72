use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Generator answered with status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Generator transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl ExtractError {
    pub fn kind(&self) -> &'static str {
        "GeneratorError"
    }

    /// Whether the same request may succeed later: timeouts, refused
    /// connections, throttling and server-side failures.
    pub fn is_transient(&self) -> bool {
        match self {
            ExtractError::Status { status, .. } => *status == 429 || *status >= 500,
            ExtractError::Transport(e) => e.is_timeout() || e.is_connect() || e.is_request(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ExtractError>;
