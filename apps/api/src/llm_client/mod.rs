//! LLM Client — the single point of entry for all text-generation calls.
//!
//! ARCHITECTURAL RULE: No other module may call a vendor API directly.
//! Handlers depend on the `TextGenerator` trait; `LlmClient` is the HTTP-backed
//! implementation for whichever `Provider` is configured.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;
pub mod provider;

pub use provider::{GeneratedText, Provider};

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("API error (status {status}): {error}")]
    Api { status: u16, error: Value },

    #[error("API reported an error: {0}")]
    Reported(Value),

    #[error("Unexpected response shape: {0}")]
    Shape(String),
}

/// "Generate text from a prompt", as seen by handlers.
///
/// Implementations return the vendor payload untouched; callers unwrap it with
/// `Provider::unwrap_text` when they need the generated text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    fn provider(&self) -> Provider;

    async fn generate(&self, api_key: &str, prompt: &str) -> Result<Value, LlmError>;
}

/// HTTP client for the configured upstream. One POST per call, no retries.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    provider: Provider,
}

impl LlmClient {
    pub fn new(provider: Provider) -> Self {
        Self {
            client: Client::new(),
            provider,
        }
    }
}

#[async_trait]
impl TextGenerator for LlmClient {
    fn provider(&self) -> Provider {
        self.provider
    }

    async fn generate(&self, api_key: &str, prompt: &str) -> Result<Value, LlmError> {
        let request = self.client.post(self.provider.endpoint());
        let request = match self.provider {
            Provider::Gemini => request
                .header("x-goog-api-key", api_key)
                .json(&provider::GeminiRequest::new(prompt)),
            Provider::OpenAi => request
                .bearer_auth(api_key)
                .json(&provider::ChatRequest::new(self.provider.model(), prompt)),
        };

        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(
                "{} API returned {}: {}",
                self.provider.as_str(),
                status,
                body
            );
            return Err(LlmError::Api {
                status: status.as_u16(),
                error: upstream_error_object(
                    &body,
                    status.as_u16(),
                    status.canonical_reason().unwrap_or("Unknown"),
                ),
            });
        }

        let payload: Value = response.json().await.map_err(transport_error)?;
        debug!("{} call succeeded", self.provider.as_str());

        Ok(payload)
    }
}

/// A body that arrived but is not JSON is a shape problem; anything else means
/// the upstream was never properly reached.
fn transport_error(err: reqwest::Error) -> LlmError {
    if err.is_decode() {
        LlmError::Shape(format!("upstream payload is not JSON: {err}"))
    } else {
        LlmError::Transport(err.to_string())
    }
}

/// Picks the vendor's `error` object out of a failed response body, or
/// synthesizes one when the body carries none.
fn upstream_error_object(body: &str, status: u16, reason: &str) -> Value {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|payload| payload.get("error").cloned())
        .filter(|error| !error.is_null())
        .unwrap_or_else(|| {
            json!({ "message": format!("Upstream request failed: {status} - {reason}") })
        })
}

/// Returns the vendor error object carried by an otherwise successful payload.
pub fn reported_error(payload: &Value) -> Option<&Value> {
    payload.get("error").filter(|error| !error.is_null())
}
