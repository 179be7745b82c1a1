// Job posting analysis: prompt building, provider call, field extraction.
// All provider calls go through llm_client — no direct vendor calls here.

pub mod extractor;
pub mod handlers;
pub mod prompts;
pub mod schema;
pub mod service;
pub mod session;
