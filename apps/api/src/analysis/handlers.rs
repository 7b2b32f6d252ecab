use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use tracing::{info, warn, Instrument};
use uuid::Uuid;

use crate::analysis::extractor::ResumeUpload;
use crate::analysis::{AnalysisResult, AnalyzeError};
use crate::errors::AppError;
use crate::state::AppState;

const RESUME_FIELD: &str = "resume";
const JOB_DESCRIPTION_FIELD: &str = "job_description";

/// Headroom above the resume limit for the job description and multipart framing.
const FORM_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Largest request body accepted by `POST /api/analyze`.
pub fn form_body_limit(max_upload_bytes: usize) -> usize {
    max_upload_bytes.saturating_add(FORM_OVERHEAD_BYTES)
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub success: bool,
    pub analysis: AnalysisResult,
}

/// POST /api/analyze
pub async fn handle_analyze(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let request_id = Uuid::new_v4();
    analyze_form(state, multipart)
        .instrument(tracing::info_span!("analyze", %request_id))
        .await
}

async fn analyze_form(
    state: AppState,
    multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let (resume, job_description) = read_form(multipart, state.config.max_upload_bytes).await?;
    info!(
        file = %resume.file_name,
        bytes = resume.bytes.len(),
        "Analysis requested"
    );

    let analysis = tokio::time::timeout(
        state.config.request_timeout,
        state.analyzer.analyze(resume, job_description),
    )
    .await
    .map_err(|_| {
        warn!(
            timeout_secs = state.config.request_timeout.as_secs(),
            "Analysis exceeded request deadline"
        );
        AppError::Timeout
    })??;

    Ok(Json(AnalyzeResponse {
        success: true,
        analysis,
    }))
}

/// Pulls the resume file and job description out of the form. Unknown fields are
/// skipped; a missing job description is treated as empty.
async fn read_form(
    mut multipart: Multipart,
    max_upload_bytes: usize,
) -> Result<(ResumeUpload, String), AppError> {
    let mut resume = None;
    let mut job_description = String::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, None, max_upload_bytes))?
    {
        match field.name() {
            Some(RESUME_FIELD) => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| multipart_error(e, Some(RESUME_FIELD), max_upload_bytes))?;
                resume = Some(ResumeUpload {
                    file_name,
                    content_type,
                    bytes,
                });
            }
            Some(JOB_DESCRIPTION_FIELD) => {
                job_description = field
                    .text()
                    .await
                    .map_err(|e| {
                        multipart_error(e, Some(JOB_DESCRIPTION_FIELD), max_upload_bytes)
                    })?;
            }
            other => {
                warn!(field = ?other, "Ignoring unexpected form field");
            }
        }
    }

    let resume = resume.ok_or_else(|| {
        AnalyzeError::EmptyInput("A resume file is required in the 'resume' field".to_string())
    })?;
    Ok((resume, job_description))
}

/// Maps a multipart failure. A body-limit breach is blamed on the resume only when it
/// happens while the resume field is being read.
fn multipart_error(
    error: MultipartError,
    reading: Option<&str>,
    max_upload_bytes: usize,
) -> AppError {
    if error.status() != StatusCode::PAYLOAD_TOO_LARGE {
        return AppError::InvalidRequest(format!(
            "Malformed multipart form: {}",
            error.body_text()
        ));
    }
    match reading {
        Some(RESUME_FIELD) => AnalyzeError::FileTooLarge {
            limit: max_upload_bytes,
        }
        .into(),
        _ => AppError::FormTooLarge {
            limit: form_body_limit(max_upload_bytes),
            resume_limit: max_upload_bytes,
        },
    }
}
