use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::analysis::extractor::ExtractionError;
use crate::llm_client::LlmError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Upstream returned status {status}: {error}")]
    UpstreamTransport { status: u16, error: Value },

    #[error("Upstream reported an error: {0}")]
    UpstreamLogical(Value),

    #[error("Upstream unreachable: {0}")]
    UpstreamUnreachable(String),

    #[error("Unexpected upstream response shape: {0}")]
    ResponseShape(String),

    #[error("Extraction failed: {0}")]
    Extraction(#[from] ExtractionError),
}

impl From<LlmError> for AppError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::Transport(msg) => AppError::UpstreamUnreachable(msg),
            LlmError::Api { status, error } => AppError::UpstreamTransport { status, error },
            LlmError::Reported(error) => AppError::UpstreamLogical(error),
            LlmError::Shape(msg) => AppError::ResponseShape(msg),
        }
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::UpstreamTransport { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            AppError::ResponseShape(_) | AppError::Extraction(_) => StatusCode::BAD_GATEWAY,
            AppError::Configuration(_)
            | AppError::UpstreamLogical(_)
            | AppError::UpstreamUnreachable(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The single human-readable message shown to callers.
    /// Diagnostic detail stays in the server log.
    pub fn public_message(&self) -> String {
        match self {
            AppError::MethodNotAllowed => "Method not allowed".to_string(),
            AppError::Validation(msg) | AppError::Configuration(msg) => msg.clone(),
            AppError::UpstreamTransport { error, .. } | AppError::UpstreamLogical(error) => error
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("The text generation API returned an error")
                .to_string(),
            AppError::UpstreamUnreachable(_) => {
                "Failed to reach the text generation API".to_string()
            }
            AppError::ResponseShape(_) => {
                "The text generation API returned an unexpected response".to_string()
            }
            AppError::Extraction(_) => {
                "Could not read the analysis result from the model output".to_string()
            }
        }
    }

    fn code(&self) -> &'static str {
        match self {
            AppError::MethodNotAllowed => "METHOD_NOT_ALLOWED",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Configuration(_) => "CONFIGURATION_ERROR",
            AppError::UpstreamTransport { .. } => "UPSTREAM_ERROR",
            AppError::UpstreamLogical(_) => "UPSTREAM_REPORTED_ERROR",
            AppError::UpstreamUnreachable(_) => "UPSTREAM_UNREACHABLE",
            AppError::ResponseShape(_) => "RESPONSE_SHAPE_ERROR",
            AppError::Extraction(_) => "EXTRACTION_ERROR",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        match &self {
            AppError::MethodNotAllowed | AppError::Validation(_) => {}
            AppError::Configuration(msg) => tracing::error!("Configuration error: {msg}"),
            AppError::UpstreamTransport { status, error } => {
                tracing::error!("Upstream error (status {status}): {error}")
            }
            AppError::UpstreamLogical(error) => tracing::error!("Upstream reported error: {error}"),
            AppError::UpstreamUnreachable(msg) => tracing::error!("Upstream unreachable: {msg}"),
            AppError::ResponseShape(msg) => tracing::error!("Response shape error: {msg}"),
            AppError::Extraction(e) => tracing::error!("Extraction error: {e}"),
        }

        // Upstream error objects are passed through untouched.
        let body = match self {
            AppError::UpstreamTransport { error, .. } | AppError::UpstreamLogical(error) => {
                json!({ "error": error })
            }
            other => json!({
                "error": {
                    "code": other.code(),
                    "message": other.public_message()
                }
            }),
        };

        (status, Json(body)).into_response()
    }
}
