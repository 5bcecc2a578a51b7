use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::dialogue::TranscriptError;
use crate::extract::ExtractError;
use crate::llm_client::LlmError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Input-shape problems become `400 {"error": message}`; upstream and internal
/// failures become a plain-text 5xx body.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("{0}")]
    Extraction(String),

    #[error("Upstream LLM error: {0}")]
    Upstream(String),

    #[error("Failed to parse model response: {0}")]
    Parse(String),

    #[error("{0}")]
    RoleInference(String),

    #[error("Failed to persist course: {0}")]
    Persistence(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<LlmError> for AppError {
    fn from(e: LlmError) -> Self {
        AppError::Upstream(e.to_string())
    }
}

impl From<ExtractError> for AppError {
    fn from(e: ExtractError) -> Self {
        match e {
            ExtractError::UnsupportedFormat(name) => AppError::UnsupportedFormat(name),
            other => AppError::Extraction(other.to_string()),
        }
    }
}

impl From<TranscriptError> for AppError {
    fn from(e: TranscriptError) -> Self {
        match e {
            e @ TranscriptError::RoleInference => AppError::RoleInference(e.to_string()),
            other => AppError::Persistence(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::UnsupportedFormat(_)
            | AppError::Extraction(_)
            | AppError::Parse(_)
            | AppError::RoleInference(_)
            | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AppError::Persistence(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_client_error() {
            tracing::warn!("Rejected request: {}", self);
            return (status, Json(json!({ "error": self.to_string() }))).into_response();
        }

        match &self {
            AppError::Internal(e) => tracing::error!("Internal error: {e:?}"),
            other => tracing::error!("{other}"),
        }

        (
            status,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            format!("Error: {}", self),
        )
            .into_response()
    }
}
