//! Client-side request orchestration.
//!
//! `Idle → Sending → Succeeded | Failed`. Terminal states stay until the next
//! submission. Every submission gets a monotonic id, and a completion is only
//! applied if its id is the latest one sent; older completions are dropped.

use tokio::sync::Mutex;
use tracing::debug;

use crate::analysis::extractor::CandidateLocator;
use crate::analysis::schema::ExtractedResult;
use crate::analysis::service::{analyze_posting, validate_jd_text};
use crate::config::Config;
use crate::errors::AppError;
use crate::llm_client::TextGenerator;

pub type RequestId = u64;

#[derive(Debug, Clone, Default, PartialEq)]
pub enum SessionState {
    #[default]
    Idle,
    Sending {
        request_id: RequestId,
    },
    Succeeded(ExtractedResult),
    /// Holds the caller-facing error message.
    Failed(String),
}

#[derive(Debug, Default)]
pub struct AnalysisSession {
    state: SessionState,
    last_request_id: RequestId,
}

impl AnalysisSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// The "disable the submit button" flag.
    pub fn is_sending(&self) -> bool {
        matches!(self.state, SessionState::Sending { .. })
    }

    /// Starts a submission. Blank text is rejected and leaves the state untouched;
    /// otherwise any previous result or error is cleared.
    pub fn begin(&mut self, jd_text: Option<&str>) -> Result<RequestId, AppError> {
        validate_jd_text(jd_text)?;

        self.last_request_id += 1;
        let request_id = self.last_request_id;
        self.state = SessionState::Sending { request_id };

        Ok(request_id)
    }

    /// Applies the outcome of `request_id`. Returns false if it was stale.
    pub fn complete(
        &mut self,
        request_id: RequestId,
        outcome: Result<ExtractedResult, AppError>,
    ) -> bool {
        match self.state {
            SessionState::Sending { request_id: current } if current == request_id => {
                self.state = match outcome {
                    Ok(result) => SessionState::Succeeded(result),
                    Err(err) => SessionState::Failed(err.public_message()),
                };
                true
            }
            _ => {
                debug!(request_id, latest = self.last_request_id, "Discarding stale completion");
                false
            }
        }
    }
}

/// Runs one submission against a shared session.
///
/// The lock is only held to change state, never across the upstream call, so a
/// later submission can supersede this one while it is in flight.
pub async fn submit(
    session: &Mutex<AnalysisSession>,
    jd_text: &str,
    config: &Config,
    generator: &dyn TextGenerator,
    locator: &dyn CandidateLocator,
) -> Result<RequestId, AppError> {
    let request_id = session.lock().await.begin(Some(jd_text))?;

    let outcome = analyze_posting(jd_text, config, generator, locator).await;

    session.lock().await.complete(request_id, outcome);
    Ok(request_id)
}
