#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use axum::Router;
use docflow_pipeline::{StageDelays, StageWork};
use http_body_util::BodyExt;
use tower::ServiceExt;

use docflow_api::config::ServerConfig;
use docflow_api::router::build_app_router;
use docflow_api::state::AppState;

/// Per-stage delay used by tests: long enough to observe intermediate
/// checkpoints, short enough to keep the suite fast.
pub const TEST_STAGE_DELAY: Duration = Duration::from_millis(30);

const BOUNDARY: &str = "docflow-test-boundary";

/// Build a test `ServerConfig` with safe defaults and fast stages.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 5,
        max_upload_bytes: 1024 * 1024,
        stage_delays: StageDelays::uniform(TEST_STAGE_DELAY),
        job_capacity: None,
        job_ttl_secs: None,
        retention_interval_secs: 60,
    }
}

/// Build the full application router over `state`, with the same middleware
/// stack as production.
pub fn build_test_app(state: AppState) -> Router {
    build_app_router(state, &test_config())
}

/// App with simulated timed stages.
pub fn default_app() -> (Router, AppState) {
    let state = AppState::new(test_config());
    (build_test_app(state.clone()), state)
}

/// App with custom stage work.
pub fn app_with_work(work: Arc<dyn StageWork>) -> (Router, AppState) {
    let state = AppState::with_work(test_config(), work);
    (build_test_app(state.clone()), state)
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.oneshot(request).await.unwrap()
}

/// Encode a single multipart field. `filename: None` omits the filename.
pub fn multipart_body(field: &str, filename: Option<&str>, content: &[u8]) -> Vec<u8> {
    let disposition = match filename {
        Some(name) => format!("form-data; name=\"{field}\"; filename=\"{name}\""),
        None => format!("form-data; name=\"{field}\""),
    };

    let mut body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: {disposition}\r\nContent-Type: text/plain\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub async fn post_multipart(app: Router, uri: &str, body: Vec<u8>) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Upload `content` as `filename` in the `file` field.
pub async fn upload(app: Router, filename: &str, content: &[u8]) -> Response<Body> {
    post_multipart(app, "/upload", multipart_body("file", Some(filename), content)).await
}

/// Upload a document and return its job id, asserting 202.
pub async fn upload_ok(app: Router, filename: &str) -> String {
    let response = upload(app, filename, b"This is a sample document.").await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let json = body_json(response).await;
    json["job_id"].as_str().unwrap().to_string()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn status(app: Router, job_id: &str) -> serde_json::Value {
    let response = get(app, &format!("/status/{job_id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await
}

/// Poll `/status/{job_id}` until the job is completed or failed.
///
/// Returns every snapshot observed, the terminal one last.
pub async fn poll_until_terminal(app: Router, job_id: &str) -> Vec<serde_json::Value> {
    tokio::time::timeout(Duration::from_secs(10), async {
        let mut seen = Vec::new();
        loop {
            let snapshot = status(app.clone(), job_id).await;
            let terminal = matches!(
                snapshot["status"].as_str(),
                Some("completed") | Some("failed")
            );
            seen.push(snapshot);
            if terminal {
                return seen;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("job did not reach a terminal state in time")
}
