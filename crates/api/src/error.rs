use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use docflow_core::error::CoreError;
use docflow_store::StoreError;
use serde_json::json;

/// Message returned for any unknown or malformed job id.
pub const JOB_NOT_FOUND: &str = "Job ID not found";

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] and [`StoreError`] for domain errors and adds
/// HTTP-specific variants. Implements [`IntoResponse`] to produce consistent
/// `{ "detail": ..., "code": ... }` JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `docflow_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A job store error from `docflow_store`.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A malformed or oversized multipart body.
    #[error("Multipart error: {0}")]
    Multipart(#[from] MultipartError),

    /// A resource that does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- Domain errors ---
            AppError::Core(core) => classify_core_error(core),

            // --- Store errors ---
            AppError::Store(err) => match err {
                StoreError::NotFound(_) => {
                    (StatusCode::NOT_FOUND, "NOT_FOUND", JOB_NOT_FOUND.to_string())
                }
                StoreError::CapacityExceeded(capacity) => {
                    tracing::warn!(capacity, "Job store at capacity, rejecting upload");
                    (
                        StatusCode::SERVICE_UNAVAILABLE,
                        "SERVICE_UNAVAILABLE",
                        "Too many jobs in progress, retry later".to_string(),
                    )
                }
                StoreError::DuplicateKey(job_id) => {
                    tracing::error!(job_id = %job_id, "Duplicate job id on create");
                    internal()
                }
                StoreError::Rejected(core) => classify_core_error(core),
            },

            // --- HTTP-specific errors ---
            AppError::Multipart(err) => {
                let status = err.status();
                let code = if status == StatusCode::PAYLOAD_TOO_LARGE {
                    "PAYLOAD_TOO_LARGE"
                } else {
                    "BAD_REQUEST"
                };
                (status, code, err.body_text())
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
        };

        let body = json!({
            "detail": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Validation errors come from request input. A rejected transition can only
/// come from a job update, which no handler performs, so it is a server bug.
fn classify_core_error(err: &CoreError) -> (StatusCode, &'static str, String) {
    match err {
        CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
        CoreError::InvalidTransition { .. } => {
            tracing::error!(error = %err, "Job update rejected in request path");
            internal()
        }
    }
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}
