//! Error types for the CLI application.

use metabolink_extractor::ExtractorError;
use metabolink_llm::LlmError;
use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Pipeline error, including failure to persist results
    #[error("{0}")]
    Extractor(#[from] ExtractorError),

    /// Backend call failed
    #[error("Backend error: {0}")]
    Backend(#[from] LlmError),

    /// The run finished without a single usable food
    #[error("No foods were processed successfully")]
    NothingProcessed,
}
