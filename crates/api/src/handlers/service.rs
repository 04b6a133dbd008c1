//! Service metadata served at the root path.

use axum::extract::State;
use axum::Json;
use docflow_store::JobCounts;
use serde::Serialize;

use crate::state::AppState;

pub const SERVICE_NAME: &str = "Docflow Asynchronous Document Optimizer";

/// Available endpoints, as advertised at `GET /`.
#[derive(Debug, Serialize)]
pub struct Endpoints {
    pub upload: &'static str,
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ServiceInfo {
    pub service: &'static str,
    pub version: &'static str,
    pub endpoints: Endpoints,
    pub total_jobs_tracked: usize,
    pub jobs_by_status: JobCounts,
}

/// GET /
pub async fn service_info(State(state): State<AppState>) -> Json<ServiceInfo> {
    let counts = state.store.counts().await;

    Json(ServiceInfo {
        service: SERVICE_NAME,
        version: env!("CARGO_PKG_VERSION"),
        endpoints: Endpoints {
            upload: "/upload (POST)",
            status: "/status/{job_id} (GET)",
        },
        total_jobs_tracked: counts.total,
        jobs_by_status: counts,
    })
}
