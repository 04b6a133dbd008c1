use axum::routing::get;
use axum::Router;

use crate::handlers::service;
use crate::state::AppState;

/// `GET /` service metadata.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(service::service_info))
}
