use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use crate::evaluation::parser::ParseError;
use crate::extraction::ExtractionError;
use crate::history::HistoryError;
use crate::llm_client::LlmError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<HistoryError> for AppError {
    fn from(err: HistoryError) -> Self {
        match err {
            HistoryError::NotFound(_) => AppError::NotFound("No saved analysis found.".to_string()),
            HistoryError::Deserialization(msg) => AppError::Deserialization(msg),
            HistoryError::Io(e) => AppError::Io(e.to_string()),
        }
    }
}

/// Error body shared by HTTP error responses and per-item comparison failures.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Extraction(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Llm(_) => StatusCode::BAD_GATEWAY,
            AppError::Parse(_) => StatusCode::BAD_GATEWAY,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Deserialization(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Configuration(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Io(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Extraction(_) => "EXTRACTION_ERROR",
            AppError::Llm(_) => "LLM_ERROR",
            AppError::Parse(_) => "PARSE_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Deserialization(_) => "DESERIALIZATION_ERROR",
            AppError::Configuration(_) => "CONFIGURATION_ERROR",
            AppError::Io(_) => "IO_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// User-facing message. Logs the detail for errors whose detail is not shown.
    pub fn body(&self) -> ErrorBody {
        let message = match self {
            AppError::Validation(msg)
            | AppError::NotFound(msg)
            | AppError::Deserialization(msg)
            | AppError::Configuration(msg) => msg.clone(),
            AppError::Extraction(e) => e.to_string(),
            AppError::Llm(e) => {
                tracing::error!("LLM error: {e}");
                "The AI model call failed. Please try again.".to_string()
            }
            AppError::Parse(e) => {
                tracing::warn!("Parse error: {e}");
                format!("Failed to parse the AI response: {e}")
            }
            AppError::Io(msg) => {
                tracing::error!("I/O error: {msg}");
                "A storage error occurred".to_string()
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                "An internal server error occurred".to_string()
            }
        };
        ErrorBody {
            code: self.code(),
            message,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = self.body();
        let payload = Json(json!({
            "error": {
                "code": body.code,
                "message": body.message
            }
        }));
        (self.status(), payload).into_response()
    }
}
