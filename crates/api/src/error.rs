use axum::Json;
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use extract::ExtractError;
use index::StoreError;
use ingest::IngestError;
use layout::LayoutError;
use ontology::RdfError;
use query::QueryError;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use crate::cache::CacheError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Upload failed: {message}")]
    Upload { status: StatusCode, message: String },

    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Generator(#[from] ExtractError),

    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error(transparent)]
    Rdf(#[from] RdfError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error("None of the {0} statements could be stored")]
    NothingStored(usize),

    #[error("{0}")]
    Internal(String),
}

impl From<QueryError> for ApiError {
    fn from(e: QueryError) -> Self {
        match e {
            QueryError::Store(e) => ApiError::Store(e),
            QueryError::Generator(e) => ApiError::Generator(e),
        }
    }
}

impl From<MultipartError> for ApiError {
    fn from(e: MultipartError) -> Self {
        ApiError::Upload {
            status: e.status(),
            message: e.body_text(),
        }
    }
}

impl ApiError {
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) | ApiError::Upload { .. } => "BadRequest",
            ApiError::Ingest(e) => e.kind(),
            ApiError::Generator(e) => e.kind(),
            ApiError::Layout(e) => e.kind(),
            ApiError::Rdf(e) => e.kind(),
            ApiError::Store(e) => e.kind(),
            ApiError::Cache(e) => e.kind(),
            ApiError::NothingStored(_) => "StoreFailure",
            ApiError::Internal(_) => "InternalError",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Upload { status, .. } => *status,
            ApiError::Ingest(e) => match e.kind() {
                "NotFoundError" => StatusCode::NOT_FOUND,
                _ => StatusCode::UNPROCESSABLE_ENTITY,
            },
            ApiError::Generator(_) => StatusCode::BAD_GATEWAY,
            ApiError::Layout(LayoutError::Empty) => StatusCode::BAD_REQUEST,
            ApiError::Layout(LayoutError::TooLarge { .. }) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Layout(LayoutError::Render(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Rdf(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Store(StoreError::GraphNotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Store(StoreError::Config(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Store(_) => StatusCode::BAD_GATEWAY,
            ApiError::Cache(CacheError::NotFound { .. }) => StatusCode::NOT_FOUND,
            ApiError::Cache(_) => StatusCode::CONFLICT,
            ApiError::NothingStored(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(kind = self.kind(), error = %self, "Request failed");
        } else {
            warn!(kind = self.kind(), status = status.as_u16(), error = %self, "Request rejected");
        }

        let body = json!({
            "success": false,
            "kind": self.kind(),
            "error": self.to_string(),
        });
        (status, Json(body)).into_response()
    }
}
