//! Route definitions for uploads and job status.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::jobs;
use crate::state::AppState;

/// Job routes, mounted at the root.
///
/// ```text
/// POST   /upload              -> upload_document
/// GET    /status/{job_id}     -> get_status
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/upload", post(jobs::upload_document))
        .route("/status/{job_id}", get(jobs::get_status))
}
