//! JD Analyzer: turns free-text job postings into a fixed set of fields by way
//! of a text-generation API.

pub mod analysis;
pub mod config;
pub mod errors;
pub mod llm_client;
pub mod routes;
pub mod state;
