//! Response extractor: finds the JSON object in raw model text and maps it onto
//! the nine-field schema.
//!
//! Two stages:
//! 1. candidate extraction, delegated to a `CandidateLocator` strategy
//! 2. strict decoding of the candidate into an `ExtractedResult`
//!
//! Default: `GreedyBraceLocator` (first `{` to last `}`).
//! Opt-in: `BalancedBraceLocator` (first brace-balanced object), selected with
//! `JSON_CANDIDATE_STRATEGY=balanced`.

use std::str::FromStr;
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use crate::analysis::schema::ExtractedResult;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("model returned no content")]
    NoContent,

    #[error("no JSON object found in model output")]
    NoJsonFound,

    #[error("model output is not a valid JSON object: {0}")]
    MalformedJson(String),
}

// ────────────────────────────────────────────────────────────────────────────
// Candidate extraction strategies
// ────────────────────────────────────────────────────────────────────────────

/// Finds the substring that should hold the model's JSON object.
///
/// Carried in `AppState` as `Arc<dyn CandidateLocator>`.
pub trait CandidateLocator: Send + Sync {
    fn name(&self) -> &'static str;

    fn locate<'a>(&self, text: &'a str) -> Option<&'a str>;
}

/// First `{` through last `}` in the whole text.
///
/// Assumes the model emits a single object. Prose that itself contains braces
/// widens the span and usually ends in `MalformedJson`.
pub struct GreedyBraceLocator;

impl CandidateLocator for GreedyBraceLocator {
    fn name(&self) -> &'static str {
        "greedy"
    }

    fn locate<'a>(&self, text: &'a str) -> Option<&'a str> {
        let start = text.find('{')?;
        let end = text.rfind('}')?;
        if end < start {
            return None;
        }
        Some(&text[start..=end])
    }
}

/// First brace-balanced object starting at the first `{`.
///
/// Braces inside JSON string literals are not counted. Trailing prose with
/// stray braces is excluded, but an example object echoed *before* the real
/// one is picked instead of it.
pub struct BalancedBraceLocator;

impl CandidateLocator for BalancedBraceLocator {
    fn name(&self) -> &'static str {
        "balanced"
    }

    fn locate<'a>(&self, text: &'a str) -> Option<&'a str> {
        let start = text.find('{')?;
        let mut depth = 0usize;
        let mut in_string = false;
        let mut escaped = false;

        for (offset, ch) in text[start..].char_indices() {
            if in_string {
                match ch {
                    _ if escaped => escaped = false,
                    '\\' => escaped = true,
                    '"' => in_string = false,
                    _ => {}
                }
                continue;
            }

            match ch {
                '"' => in_string = true,
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(&text[start..=start + offset]);
                    }
                }
                _ => {}
            }
        }

        None
    }
}

/// Config-facing selector for the locator strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LocatorKind {
    #[default]
    Greedy,
    Balanced,
}

impl LocatorKind {
    pub fn locator(&self) -> Arc<dyn CandidateLocator> {
        match self {
            LocatorKind::Greedy => Arc::new(GreedyBraceLocator),
            LocatorKind::Balanced => Arc::new(BalancedBraceLocator),
        }
    }
}

impl FromStr for LocatorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "greedy" => Ok(LocatorKind::Greedy),
            "balanced" => Ok(LocatorKind::Balanced),
            other => Err(format!("unknown candidate strategy '{other}'")),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Extraction
// ────────────────────────────────────────────────────────────────────────────

/// Extracts the schema fields using the default greedy locator.
pub fn extract_fields(model_text: Option<&str>) -> Result<ExtractedResult, ExtractionError> {
    extract_fields_with(model_text, &GreedyBraceLocator)
}

/// Extracts the schema fields using the given locator.
///
/// Failures are logged together with the raw text for diagnostics.
pub fn extract_fields_with(
    model_text: Option<&str>,
    locator: &dyn CandidateLocator,
) -> Result<ExtractedResult, ExtractionError> {
    let text = match model_text {
        Some(text) if !text.trim().is_empty() => text,
        _ => {
            warn!("Extraction failed: model returned no content");
            return Err(ExtractionError::NoContent);
        }
    };

    let Some(candidate) = locator.locate(text) else {
        warn!(
            locator = locator.name(),
            "Extraction failed: no JSON object in model output: {text}"
        );
        return Err(ExtractionError::NoJsonFound);
    };

    decode_candidate(candidate).map_err(|e| {
        warn!(
            locator = locator.name(),
            "Extraction failed: {e}; candidate: {candidate}"
        );
        e
    })
}

/// Strictly decodes a candidate substring. Anything but a JSON object is malformed.
pub fn decode_candidate(candidate: &str) -> Result<ExtractedResult, ExtractionError> {
    let value: Value = serde_json::from_str(candidate)
        .map_err(|e| ExtractionError::MalformedJson(e.to_string()))?;

    match value {
        Value::Object(object) => Ok(ExtractedResult::from_object(&object)),
        other => Err(ExtractionError::MalformedJson(format!(
            "expected an object, found {other}"
        ))),
    }
}
