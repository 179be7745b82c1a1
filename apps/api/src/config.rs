use anyhow::{anyhow, Context, Result};

use crate::analysis::extractor::LocatorKind;
use crate::llm_client::Provider;

/// Application configuration loaded from environment variables.
///
/// The upstream credential is optional here: a missing key is reported per
/// request as a configuration error, not at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub provider: Provider,
    pub api_key: Option<String>,
    pub candidate_strategy: LocatorKind,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from a variable lookup. Invalid provider, strategy or
    /// port values are rejected; a missing credential is not.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let provider = lookup("LLM_PROVIDER")
            .unwrap_or_else(|| "gemini".to_string())
            .parse::<Provider>()
            .map_err(|e| anyhow!("LLM_PROVIDER must be 'gemini' or 'openai': {e}"))?;

        let candidate_strategy = lookup("JSON_CANDIDATE_STRATEGY")
            .unwrap_or_else(|| "greedy".to_string())
            .parse::<LocatorKind>()
            .map_err(|e| anyhow!("JSON_CANDIDATE_STRATEGY must be 'greedy' or 'balanced': {e}"))?;

        Ok(Config {
            provider,
            api_key: lookup(provider.api_key_var()).filter(|value| !value.trim().is_empty()),
            candidate_strategy,
            port: lookup("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }

    /// Returns the credential only when it is set to something other than whitespace.
    pub fn credential(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}
