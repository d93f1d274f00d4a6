use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Failures surfaced before any event is streamed
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Thread not found: {0}")]
    ThreadNotFound(String),

    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    #[error("Token limit reached: used {used} of {limit} tokens")]
    QuotaExceeded { used: u64, limit: u64 },

    #[error("Persistence error: {0}")]
    Persist(#[from] folio_persist::PersistError),

    #[error("Upload error: {0}")]
    Upload(#[from] std::io::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            ApiError::ThreadNotFound(_) | ApiError::DocumentNotFound(_) => {
                (StatusCode::NOT_FOUND, self.to_string())
            }
            ApiError::QuotaExceeded { .. } => (StatusCode::TOO_MANY_REQUESTS, self.to_string()),
            ApiError::Persist(ref e) => {
                tracing::error!("Persistence error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Storage error".to_string())
            }
            ApiError::Upload(ref e) => {
                tracing::error!("Upload error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Could not store upload".to_string())
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
