//! Axum route handlers for the Analysis API.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::analysis::schema::{DisplayField, ExtractedResult};
use crate::analysis::service::{analyze_posting, request_analysis, validate_jd_text};
use crate::errors::AppError;
use crate::llm_client::Provider;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(rename = "jdText", default)]
    pub jd_text: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeFieldsResponse {
    pub result: ExtractedResult,
    pub fields: Vec<DisplayField>,
    pub provider: Provider,
    pub analyzed_at: DateTime<Utc>,
}

/// Unreadable bodies are a validation failure, same as a missing `jdText`.
fn read_request(
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<AnalyzeRequest, AppError> {
    payload
        .map(|Json(request)| request)
        .map_err(|rejection| AppError::Validation(format!("Invalid request body: {rejection}")))
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/analyze
///
/// Sends the posting to the configured provider and returns the vendor payload
/// unmodified. Callers unwrap and extract the fields themselves.
#[tracing::instrument(skip_all, fields(request_id = %Uuid::new_v4()))]
pub async fn handle_analyze(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let request = read_request(payload)?;
    let jd_text = validate_jd_text(request.jd_text.as_deref())?;

    let upstream = request_analysis(jd_text, &state.config, state.generator.as_ref()).await?;

    Ok(Json(upstream))
}

/// POST /api/analyze/fields
///
/// Same input as `/api/analyze`, but unwraps the payload and extracts the
/// nine schema fields server side.
#[tracing::instrument(skip_all, fields(request_id = %Uuid::new_v4()))]
pub async fn handle_analyze_fields(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<AnalyzeFieldsResponse>, AppError> {
    let request = read_request(payload)?;
    let jd_text = validate_jd_text(request.jd_text.as_deref())?;

    let result = analyze_posting(
        jd_text,
        &state.config,
        state.generator.as_ref(),
        state.locator.as_ref(),
    )
    .await?;

    Ok(Json(AnalyzeFieldsResponse {
        fields: result.display_fields(),
        result,
        provider: state.generator.provider(),
        analyzed_at: Utc::now(),
    }))
}

/// Any method other than POST on the analysis routes.
pub async fn handle_method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}
