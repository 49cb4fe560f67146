//! Handlers for batch uploads, job status and result downloads.

use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, Path, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use prodscore_core::batch::{BatchJob, BatchSummary, JobStatus};
use prodscore_core::error::CoreError;
use prodscore_core::types::{JobId, Timestamp};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Multipart field carrying the uploaded file.
pub const FILE_FIELD: &str = "file";

const MSG_NO_FILE: &str = "No file provided";
const MSG_NO_FILE_NAME: &str = "No file selected";
const MSG_NOT_CSV: &str = "Only CSV files are allowed";

#[derive(Debug, Serialize)]
pub struct BatchCreated {
    pub batch_id: JobId,
    pub status: JobStatus,
}

/// Client-facing view of a [`BatchJob`].
#[derive(Debug, Serialize)]
pub struct BatchStatusResponse {
    pub batch_id: JobId,
    pub status: JobStatus,
    pub created_at: Timestamp,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<BatchSummary>,
}

impl From<BatchJob> for BatchStatusResponse {
    fn from(job: BatchJob) -> Self {
        let results_url = (job.status == JobStatus::Completed)
            .then(|| format!("/api/v1/batch/{}/download", job.id));
        let error = match job.status {
            JobStatus::Failed => job.error,
            _ => None,
        };
        Self {
            batch_id: job.id,
            status: job.status,
            created_at: job.created_at,
            results_url,
            error,
            summary: job.summary,
        }
    }
}

// ── Upload ───────────────────────────────────────────────────────────

/// Keep the 413 that multer reports when the body limit is hit; any other
/// multipart failure is the client's malformed request.
fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        tracing::warn!(error = %e, "Upload exceeds body limit");
        AppError::PayloadTooLarge(e.body_text())
    } else {
        AppError::BadRequest(e.body_text())
    }
}

/// POST /api/v1/batch
///
/// Accept a multipart CSV upload in the `file` field, store it under
/// `UPLOAD_DIR` and queue a batch job for it. Answers 202 with the job id;
/// progress is polled through the status endpoint.
pub async fn create_batch(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<DataResponse<BatchCreated>>)> {
    state.model.ensure_ready()?;

    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(multipart_error)?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let data = field.bytes().await.map_err(multipart_error)?;
        upload = Some((file_name, data));
        break;
    }

    let (file_name, data) = upload.ok_or_else(|| AppError::BadRequest(MSG_NO_FILE.into()))?;
    if file_name.is_empty() {
        return Err(AppError::BadRequest(MSG_NO_FILE_NAME.into()));
    }
    if !file_name.ends_with(".csv") {
        return Err(AppError::BadRequest(MSG_NOT_CSV.into()));
    }

    let upload_dir = &state.config.upload_dir;
    tokio::fs::create_dir_all(upload_dir)
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to create upload dir: {e}")))?;
    let stored = upload_dir.join(format!(
        "{}_{}",
        uuid::Uuid::new_v4(),
        sanitize_file_name(&file_name)
    ));
    tokio::fs::write(&stored, &data)
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to store upload: {e}")))?;
    tracing::debug!(path = %stored.display(), bytes = data.len(), "Batch upload stored");

    let batch_id = state.jobs.submit(stored).await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(DataResponse {
            data: BatchCreated {
                batch_id,
                status: JobStatus::Queued,
            },
        }),
    ))
}

// ── Status ───────────────────────────────────────────────────────────

/// GET /api/v1/batch/{id}
pub async fn get_batch_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<DataResponse<BatchStatusResponse>>> {
    let job = state.jobs.status(parse_job_id(&id)?).await?;
    Ok(Json(DataResponse { data: job.into() }))
}

// ── Download ─────────────────────────────────────────────────────────

/// GET /api/v1/batch/{id}/download
///
/// Stream the result artifact of a completed job as an attachment.
pub async fn download_batch_result(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let artifact = state.jobs.fetch_result(parse_job_id(&id)?).await?;
    Ok((
        [
            (CONTENT_TYPE, artifact.content_type.to_string()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", artifact.file_name),
            ),
        ],
        artifact.bytes,
    ))
}

/// Ids that are not UUIDs can never name a job.
fn parse_job_id(raw: &str) -> Result<JobId, CoreError> {
    uuid::Uuid::parse_str(raw).map_err(|_| CoreError::NotFound {
        entity: "BatchJob",
        id: raw.to_string(),
    })
}

/// Reduce an uploaded file name to a safe single path component.
///
/// Directory parts are dropped, anything outside `[A-Za-z0-9._-]` becomes
/// `_` and leading dots are stripped.
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "upload.csv".to_string()
    } else {
        cleaned.to_string()
    }
}
