use std::sync::Arc;

use crate::analysis::extractor::CandidateLocator;
use crate::config::Config;
use crate::llm_client::TextGenerator;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Carries the upstream credential; handlers never read the environment.
    pub config: Config,
    /// Pluggable text generation provider. Default: `LlmClient` for the configured vendor.
    pub generator: Arc<dyn TextGenerator>,
    /// JSON candidate strategy used by server-side extraction.
    pub locator: Arc<dyn CandidateLocator>,
}
