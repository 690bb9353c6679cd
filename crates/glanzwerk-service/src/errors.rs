use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Failures of the generation pipeline.
///
/// Everything the pipeline can raise collapses into this taxonomy so the
/// scheduler can catch it at the cycle boundary, log it, and skip the
/// interval without crashing the process.
#[derive(Error, Debug)]
pub enum GenerationError {
    /// Upstream API returned a non-success status or a payload with no
    /// usable content, or the client has no API key configured.
    #[error("upstream error: {0}")]
    Upstream(String),

    /// Model output decoded, but a required field is missing or empty.
    /// Carries the raw text so failed output can be inspected.
    #[error("failed to parse model output: {reason}")]
    Parse { reason: String, raw: String },

    /// Persistence failure from the stores.
    #[error("storage error: {0}")]
    Storage(#[from] diesel::result::Error),

    /// Another cycle holds the in-flight guard.
    #[error("a generation cycle is already running")]
    CycleInProgress,
}

/// Errors surfaced by the HTTP layer.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("not found")]
    NotFound,

    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound => (StatusCode::NOT_FOUND, "not found".to_string()),
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::Generation(ref err) => {
                // Log the detailed error but don't expose upstream internals
                error!(error = %err, "Generation pipeline error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "blog generation failed".to_string(),
                )
            }
            ApiError::Database(ref err) => {
                error!(error = %err, "Database error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "success": false,
            "message": message,
        }));

        (status, body).into_response()
    }
}
