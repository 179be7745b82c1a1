//! Vendor variants of the text-generation capability.
//!
//! Each `Provider` knows its endpoint, its request body, and how to unwrap its
//! response envelope into a vendor-neutral `GeneratedText`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::LlmError;

const GEMINI_API_URL: &str =
    "https://generativelanguage.googleapis.com/v1/models/gemini-1.5-flash:generateContent";
const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Models are fixed per provider to prevent drift between deployments.
const GEMINI_MODEL: &str = "gemini-1.5-flash";
const OPENAI_MODEL: &str = "gpt-4o-mini";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Provider {
    #[serde(rename = "gemini")]
    Gemini,
    #[serde(rename = "openai")]
    OpenAi,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Gemini => "gemini",
            Provider::OpenAi => "openai",
        }
    }

    /// Environment variable holding this provider's credential.
    pub fn api_key_var(&self) -> &'static str {
        match self {
            Provider::Gemini => "GEMINI_API_KEY",
            Provider::OpenAi => "OPENAI_API_KEY",
        }
    }

    pub fn endpoint(&self) -> &'static str {
        match self {
            Provider::Gemini => GEMINI_API_URL,
            Provider::OpenAi => OPENAI_API_URL,
        }
    }

    pub fn model(&self) -> &'static str {
        match self {
            Provider::Gemini => GEMINI_MODEL,
            Provider::OpenAi => OPENAI_MODEL,
        }
    }

    /// Unwraps the vendor envelope into the generated text.
    ///
    /// Fails with `LlmError::Shape` when the fields that carry the text are
    /// missing, which usually means the upstream contract changed.
    pub fn unwrap_text(&self, payload: &Value) -> Result<GeneratedText, LlmError> {
        let text = match self {
            Provider::Gemini => unwrap_gemini(payload)?,
            Provider::OpenAi => unwrap_chat(payload)?,
        };

        Ok(GeneratedText {
            text,
            provider: *self,
        })
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" => Ok(Provider::Gemini),
            "openai" => Ok(Provider::OpenAi),
            other => Err(format!("unknown provider '{other}'")),
        }
    }
}

/// Text produced by the model, independent of which vendor produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedText {
    pub text: String,
    pub provider: Provider,
}

impl GeneratedText {
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Gemini generateContent
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub(crate) struct GeminiRequest<'a> {
    contents: Vec<GeminiContent<'a>>,
}

#[derive(Debug, Serialize)]
struct GeminiContent<'a> {
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Debug, Serialize)]
struct GeminiPart<'a> {
    text: &'a str,
}

impl<'a> GeminiRequest<'a> {
    pub(crate) fn new(prompt: &'a str) -> Self {
        Self {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart { text: prompt }],
            }],
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    prompt_feedback: Option<GeminiPromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiCandidateContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidateContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPromptFeedback {
    block_reason: Option<String>,
}

fn unwrap_gemini(payload: &Value) -> Result<String, LlmError> {
    let response: GeminiResponse = serde_json::from_value(payload.clone())
        .map_err(|e| LlmError::Shape(format!("unreadable generateContent response: {e}")))?;

    let Some(candidate) = response.candidates.first() else {
        let reason = response
            .prompt_feedback
            .and_then(|feedback| feedback.block_reason)
            .map(|reason| format!(" (prompt blocked: {reason})"))
            .unwrap_or_default();
        return Err(LlmError::Shape(format!("response has no candidates{reason}")));
    };

    let text: String = candidate
        .content
        .iter()
        .flat_map(|content| content.parts.iter())
        .filter_map(|part| part.text.as_deref())
        .collect();

    if text.is_empty() {
        return Err(LlmError::Shape(
            "candidate has no content.parts text".to_string(),
        ));
    }

    Ok(text)
}

// ────────────────────────────────────────────────────────────────────────────
// OpenAI chat completions
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub(crate) struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

impl<'a> ChatRequest<'a> {
    pub(crate) fn new(model: &'a str, prompt: &'a str) -> Self {
        Self {
            model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChatResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

fn unwrap_chat(payload: &Value) -> Result<String, LlmError> {
    let response: ChatResponse = serde_json::from_value(payload.clone())
        .map_err(|e| LlmError::Shape(format!("unreadable chat completion response: {e}")))?;

    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| LlmError::Shape("response has no choices".to_string()))?;

    choice
        .message
        .and_then(|message| message.content)
        .filter(|content| !content.is_empty())
        .ok_or_else(|| LlmError::Shape("choice has no message.content".to_string()))
}
