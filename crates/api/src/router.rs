//! HTTP surface of the service: the route table plus its middleware.
//!
//! `main.rs` and the integration tests both build the app through
//! [`build_app_router`], so tests exercise the production layer order.

use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderName, Method, StatusCode};
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::config::ServerConfig;
use crate::routes;
use crate::state::AppState;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Assemble `/`, `/health`, `/upload` and `/status/{job_id}` behind the
/// middleware stack.
///
/// Layers added later wrap the earlier ones, so a request passes through
/// them from the bottom of the chain up:
///
/// - CORS answers preflights before anything else runs.
/// - The request id is assigned next, so the trace span and every handler
///   log line for an upload carry the same `x-request-id`.
/// - The timeout bounds only the request itself. A `202` is sent once the
///   job record exists, so background processing is never cut short by it.
/// - The upload size limit sits innermost, on the `Multipart` extractor:
///   an oversized body surfaces as a multipart error from the handler and
///   is reported as `413` in the usual `{detail, code}` shape.
pub fn build_app_router(state: AppState, config: &ServerConfig) -> Router {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);
    let request_timeout = Duration::from_secs(config.request_timeout_secs);

    let trace = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    Router::new()
        .merge(routes::service::router())
        .merge(routes::health::router())
        .merge(routes::jobs::router())
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        // A panicking handler becomes a 500; job panics are handled by the
        // dispatcher, never here.
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(trace)
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
        .layer(build_cors_layer(config))
        .with_state(state)
}

/// CORS for browser clients: they upload with `POST` and poll with `GET`.
///
/// Panics on an origin that is not a valid header value; `CORS_ORIGINS` is
/// read once at startup.
pub fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let origins: Vec<_> = config
        .cors_origins
        .iter()
        .map(|origin| {
            origin
                .parse()
                .unwrap_or_else(|e| panic!("Invalid CORS origin '{origin}': {e}"))
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600))
}
