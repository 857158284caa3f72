use thiserror::Error;

#[derive(Debug, Error)]
pub enum RdfError {
    #[error("Predicate <{0}> has no XML qualified-name form")]
    NotQName(String),

    #[error("Unknown RDF format: {0} (expected turtle, ntriples or xml)")]
    UnknownFormat(String),
}

impl RdfError {
    pub fn kind(&self) -> &'static str {
        "ValidationError"
    }
}

pub type Result<T> = std::result::Result<T, RdfError>;
