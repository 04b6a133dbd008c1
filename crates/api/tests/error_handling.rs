//! Tests for `AppError` -> HTTP response mapping.
//!
//! These call `IntoResponse` directly on `AppError` values; no router needed.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use docflow_api::error::AppError;
use docflow_core::error::CoreError;
use docflow_core::job::JobStatus;
use docflow_store::StoreError;
use http_body_util::BodyExt;

const JOB_ID: &str = "0b6f3a52-3d1e-4e8a-9a57-2f6a0c1d9e44";

/// Helper: convert an `AppError` into its status code and parsed JSON body.
async fn error_to_response(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

// ---------------------------------------------------------------------------
// Test: StoreError::NotFound maps to 404 with the fixed detail
// ---------------------------------------------------------------------------

#[tokio::test]
async fn store_not_found_returns_404() {
    let err = AppError::Store(StoreError::NotFound(JOB_ID.parse().unwrap()));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["detail"], "Job ID not found");
}

// ---------------------------------------------------------------------------
// Test: capacity exhaustion maps to 503
// ---------------------------------------------------------------------------

#[tokio::test]
async fn capacity_exceeded_returns_503() {
    let err = AppError::Store(StoreError::CapacityExceeded(10));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["code"], "SERVICE_UNAVAILABLE");
}

// ---------------------------------------------------------------------------
// Test: duplicate key is an internal error and hides the id
// ---------------------------------------------------------------------------

#[tokio::test]
async fn duplicate_key_is_sanitized() {
    let err = AppError::Store(StoreError::DuplicateKey(JOB_ID.parse().unwrap()));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "INTERNAL_ERROR");
    assert_eq!(json["detail"], "An internal error occurred");
    assert!(!json.to_string().contains(JOB_ID));
}

// ---------------------------------------------------------------------------
// Test: validation errors map to 400 VALIDATION_ERROR
// ---------------------------------------------------------------------------

#[tokio::test]
async fn validation_error_returns_400() {
    let err = AppError::Core(CoreError::Validation("Uploaded file must have a filename".into()));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["detail"], "Uploaded file must have a filename");
}

// ---------------------------------------------------------------------------
// Test: rejected transitions are internal errors
// ---------------------------------------------------------------------------

#[tokio::test]
async fn rejected_transition_is_internal_error() {
    let err = AppError::Store(StoreError::Rejected(CoreError::InvalidTransition {
        from: JobStatus::Completed,
        to: JobStatus::Processing,
    }));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "INTERNAL_ERROR");
    assert_eq!(json["detail"], "An internal error occurred");
}

// ---------------------------------------------------------------------------
// Test: AppError::BadRequest and AppError::NotFound carry their message
// ---------------------------------------------------------------------------

#[tokio::test]
async fn bad_request_error_returns_400() {
    let err = AppError::BadRequest("Missing multipart field 'file'".into());

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "BAD_REQUEST");
    assert_eq!(json["detail"], "Missing multipart field 'file'");
}

#[tokio::test]
async fn not_found_error_returns_404() {
    let err = AppError::NotFound("Job ID not found".into());

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["detail"], "Job ID not found");
}
