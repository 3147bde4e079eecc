//! Axum route handlers for the Submission API.

use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::document::{content_type_for, Document};
use crate::models::submission::{record_key, SubmissionRecord, SubmissionRequest};
use crate::state::AppState;
use crate::submission::pipeline::PipelineOutcome;
use crate::submission::status::FailureStage;
use crate::submission::validation::validate;

// ────────────────────────────────────────────────────────────────────────────
// Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum SubmitResponse {
    Complete {
        record: SubmissionRecord,
        statuses: Vec<String>,
    },
    Failed {
        stage: FailureStage,
        reason: String,
        statuses: Vec<String>,
    },
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/resumes
///
/// Multipart form: `companyName`, `jobTitle`, `jobDescription`, `file`.
/// Validation errors come back as 400 before anything is uploaded.
pub async fn handle_submit(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<SubmitResponse>), AppError> {
    let request = read_submission(multipart).await?;

    let errors = validate(&request);
    if !errors.is_valid() {
        return Err(AppError::Validation(errors));
    }

    let (outcome, statuses) = state.pipeline.run_collecting(request).await;
    let statuses = statuses.into_iter().map(|s| s.message).collect();

    Ok(match outcome {
        PipelineOutcome::Complete(record) => (
            StatusCode::OK,
            Json(SubmitResponse::Complete { record, statuses }),
        ),
        PipelineOutcome::Failed { stage, reason } => (
            StatusCode::BAD_GATEWAY,
            Json(SubmitResponse::Failed {
                stage,
                reason,
                statuses,
            }),
        ),
    })
}

/// GET /api/v1/resumes/:id
pub async fn handle_get_resume(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SubmissionRecord>, AppError> {
    let key = record_key(state.pipeline.key_prefix(), id);
    let raw = state
        .records
        .get(&key)
        .await
        .map_err(|e| AppError::Storage(format!("{e:#}")))?
        .ok_or_else(|| AppError::NotFound(format!("Resume {id} not found")))?;

    let record = serde_json::from_str(&raw)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Corrupt record under {key}: {e}")))?;
    Ok(Json(record))
}

/// GET /api/v1/resumes
///
/// Every stored record, pending ones included. Undecodable values are skipped.
pub async fn handle_list_resumes(
    State(state): State<AppState>,
) -> Result<Json<Vec<SubmissionRecord>>, AppError> {
    let values = state
        .records
        .list(state.pipeline.key_prefix())
        .await
        .map_err(|e| AppError::Storage(format!("{e:#}")))?;

    let records = values
        .iter()
        .filter_map(|raw| match serde_json::from_str::<SubmissionRecord>(raw) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("Skipping undecodable record: {e}");
                None
            }
        })
        .collect();

    Ok(Json(records))
}

/// GET /api/v1/files/*path
///
/// Raw bytes of an uploaded résumé or rendered image.
pub async fn handle_get_file(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> Result<Response, AppError> {
    let path = path.trim_start_matches('/');
    let bytes = state
        .documents
        .read(path)
        .await
        .map_err(|e| AppError::Storage(format!("{e:#}")))?
        .ok_or_else(|| AppError::NotFound(format!("File {path} not found")))?;

    Ok(([(header::CONTENT_TYPE, content_type_for(path))], bytes).into_response())
}

// ────────────────────────────────────────────────────────────────────────────
// Multipart parsing
// ────────────────────────────────────────────────────────────────────────────

/// Reads the form into a request. Unknown fields are ignored, and a file part
/// with no bytes counts as no file.
async fn read_submission(mut multipart: Multipart) -> Result<SubmissionRequest, AppError> {
    let mut request = SubmissionRequest::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Malformed multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "companyName" => request.company_name = read_text(field).await?,
            "jobTitle" => request.job_title = read_text(field).await?,
            "jobDescription" => request.job_description = read_text(field).await?,
            "file" => {
                let file_name = field.file_name().unwrap_or("resume.pdf").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/pdf")
                    .to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Failed to read file: {e}")))?;
                request.file = (!bytes.is_empty())
                    .then(|| Document::new(file_name, content_type, bytes));
            }
            _ => {}
        }
    }

    Ok(request)
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|e| AppError::BadRequest(format!("Failed to read form field: {e}")))
}
