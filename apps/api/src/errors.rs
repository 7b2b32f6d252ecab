use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::analysis::AnalyzeError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Analysis(#[from] AnalyzeError),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Request exceeds the {limit}-byte form limit (resume files may be up to {resume_limit} bytes)")]
    FormTooLarge { limit: usize, resume_limit: usize },

    #[error("Analysis timed out")]
    Timeout,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Analysis(AnalyzeError::EmptyInput(_))
            | AppError::Analysis(AnalyzeError::UnsupportedFormat(_))
            | AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Analysis(AnalyzeError::ExtractionFailed { .. }) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::Analysis(AnalyzeError::FileTooLarge { .. })
            | AppError::FormTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Analysis(AnalyzeError::InternalScoring(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Timeout => StatusCode::GATEWAY_TIMEOUT,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AppError::Analysis(AnalyzeError::InternalScoring(detail)) => {
                tracing::error!("Scoring error: {detail}");
                "An internal error occurred while scoring the resume".to_string()
            }
            AppError::Timeout => {
                "The analysis took too long to complete. Please try a smaller file.".to_string()
            }
            other => {
                tracing::info!(status = status.as_u16(), "Request rejected: {other}");
                other.to_string()
            }
        };

        let body = Json(json!({
            "success": false,
            "error": message
        }));

        (status, body).into_response()
    }
}
