//! Handlers for document uploads and job status polling.
//!
//! An upload is acknowledged as soon as its job record exists; processing
//! happens in the background and is observed through `GET /status/{job_id}`.

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use docflow_core::error::CoreError;
use docflow_core::job::{JobRecord, JobStatus};
use docflow_core::types::JobId;
use docflow_pipeline::JobContext;
use serde::Serialize;

use crate::error::{AppError, AppResult, JOB_NOT_FOUND};
use crate::state::AppState;

/// Multipart field carrying the uploaded document.
pub const FILE_FIELD: &str = "file";

/// Message returned with every accepted upload.
pub const ACCEPTED_MESSAGE: &str =
    "Processing started in background. Please poll the status endpoint.";

/// Response body for `POST /upload`.
#[derive(Debug, Serialize)]
pub struct UploadAccepted {
    pub job_id: JobId,
    pub status: JobStatus,
    pub message: &'static str,
}

struct Upload {
    filename: String,
    payload: Vec<u8>,
}

// ---------------------------------------------------------------------------
// Upload
// ---------------------------------------------------------------------------

/// POST /upload
///
/// Accept a `multipart/form-data` document in the `file` field. Returns 202
/// with the new job id; the job is processed in the background.
pub async fn upload_document(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<UploadAccepted>)> {
    let upload = read_file_field(&mut multipart).await?;

    let record = JobRecord::accept(upload.filename.clone());
    let job_id = record.job_id;
    state.store.create(record).await?;

    let size_bytes = upload.payload.len();
    state
        .dispatcher
        .dispatch(JobContext::new(job_id, upload.filename.clone(), upload.payload));

    tracing::info!(
        job_id = %job_id,
        filename = %upload.filename,
        size_bytes,
        "Accepted upload",
    );

    Ok((
        StatusCode::ACCEPTED,
        Json(UploadAccepted {
            job_id,
            status: JobStatus::Accepted,
            message: ACCEPTED_MESSAGE,
        }),
    ))
}

/// Find the `file` field and read it fully. Other fields are ignored.
async fn read_file_field(multipart: &mut Multipart) -> AppResult<Upload> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = field
            .file_name()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .ok_or_else(|| {
                CoreError::Validation("Uploaded file must have a filename".into())
            })?;

        let payload = field.bytes().await?.to_vec();
        return Ok(Upload { filename, payload });
    }

    Err(AppError::BadRequest(format!(
        "Missing multipart field '{FILE_FIELD}'"
    )))
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// GET /status/{job_id}
///
/// Return the job record as currently stored. Unknown and malformed ids are
/// both reported as 404. Only the exact id handed out by `POST /upload`
/// resolves; other spellings of the same UUID are unknown ids.
pub async fn get_status(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> AppResult<Json<JobRecord>> {
    let job_id = parse_issued_id(&raw_id)
        .ok_or_else(|| AppError::NotFound(JOB_NOT_FOUND.into()))?;

    let record = state.store.get(job_id).await?;
    Ok(Json(record))
}

/// Parse `raw` only if it is the canonical form ids are issued in
/// (lowercase, hyphenated).
fn parse_issued_id(raw: &str) -> Option<JobId> {
    let job_id: JobId = raw.parse().ok()?;
    (job_id.hyphenated().to_string() == raw).then_some(job_id)
}
