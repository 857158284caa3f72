use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueryError {
    #[error(transparent)]
    Store(#[from] index::StoreError),

    #[error(transparent)]
    Generator(#[from] extract::ExtractError),
}

impl QueryError {
    pub fn kind(&self) -> &'static str {
        match self {
            QueryError::Store(e) => e.kind(),
            QueryError::Generator(e) => e.kind(),
        }
    }
}

pub type Result<T> = std::result::Result<T, QueryError>;
