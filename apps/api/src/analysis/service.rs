//! Analysis pipeline: validate → credential → prompt → provider → (unwrap → extract).

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::analysis::extractor::{extract_fields_with, CandidateLocator};
use crate::analysis::prompts::build_prompt;
use crate::analysis::schema::ExtractedResult;
use crate::config::Config;
use crate::errors::AppError;
use crate::llm_client::{reported_error, TextGenerator};

/// Rejects absent or blank posting text before any external call.
pub fn validate_jd_text(jd_text: Option<&str>) -> Result<&str, AppError> {
    match jd_text {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(AppError::Validation(
            "Job posting text (jdText) cannot be empty".to_string(),
        )),
    }
}

/// Sends one extraction prompt upstream and returns the vendor payload as-is.
///
/// A missing credential fails before the generator is touched. A payload that
/// carries a vendor `error` object is treated as a failure even on HTTP 200.
pub async fn request_analysis(
    jd_text: &str,
    config: &Config,
    generator: &dyn TextGenerator,
) -> Result<Value, AppError> {
    let api_key = config.credential().ok_or_else(|| {
        AppError::Configuration(format!(
            "{} is not set. Add the API key to the server environment (.env).",
            generator.provider().api_key_var()
        ))
    })?;

    let prompt = build_prompt(jd_text);
    debug!(prompt_len = prompt.len(), "Sending extraction prompt");

    let payload = generator.generate(api_key, &prompt).await?;

    if let Some(error) = reported_error(&payload) {
        return Err(AppError::UpstreamLogical(error.clone()));
    }

    info!(provider = %generator.provider(), "Analysis payload received");
    Ok(payload)
}

/// Full server-side pipeline: upstream call, envelope unwrap, field extraction.
pub async fn analyze_posting(
    jd_text: &str,
    config: &Config,
    generator: &dyn TextGenerator,
    locator: &dyn CandidateLocator,
) -> Result<ExtractedResult, AppError> {
    let payload = request_analysis(jd_text, config, generator).await?;
    let generated = generator.provider().unwrap_text(&payload)?;
    let result = extract_fields_with(Some(generated.as_str()), locator)?;

    if result.is_empty() {
        warn!(provider = %generated.provider, "Model output held no usable fields");
    } else {
        info!(
            provider = %generated.provider,
            fields = result.display_fields().len(),
            "Extracted job posting fields"
        );
    }
    Ok(result)
}
