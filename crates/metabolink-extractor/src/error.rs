//! Error types for the pipeline

use thiserror::Error;

/// Errors that can stop a batch outright
///
/// Per-food trouble (backend failures, malformed answers) is recovered inside
/// the orchestrator and never surfaces here.
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// The result artifact could not be written
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON parsing error
    #[error("JSON parse error: {0}")]
    JsonParse(String),

    /// Filesystem error while reading
    #[error("IO error: {0}")]
    Io(String),
}

impl From<serde_json::Error> for ExtractorError {
    fn from(e: serde_json::Error) -> Self {
        ExtractorError::JsonParse(e.to_string())
    }
}

impl From<std::io::Error> for ExtractorError {
    fn from(e: std::io::Error) -> Self {
        ExtractorError::Io(e.to_string())
    }
}
