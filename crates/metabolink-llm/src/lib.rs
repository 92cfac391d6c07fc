//! Metabolink LLM Provider Layer
//!
//! Interchangeable text-generation backends behind one call contract.
//!
//! # Architecture
//!
//! Every backend is reduced to "prompt in, text out, or a typed failure".
//! The concrete transport is picked once at startup as a [`Backend`] variant;
//! callers only see the [`TextBackend`] trait.
//!
//! # Providers
//!
//! - `MockProvider`: Deterministic mock for testing, usable as an embedded model
//! - `EmbeddedModel`: Any in-process `LlmProvider`
//! - `OllamaProvider`: Local Ollama-compatible HTTP service
//! - `ProcessProvider`: External executable with the prompt piped to stdin
//!
//! # Examples
//!
//! ```
//! use metabolink_llm::MockProvider;
//! use metabolink_domain::{GenerationOptions, LlmProvider};
//!
//! let provider = MockProvider::new("Hello from LLM!");
//! let result = provider.generate("test prompt", &GenerationOptions::default()).unwrap();
//! assert_eq!(result, "Hello from LLM!");
//! ```

#![warn(missing_docs)]

pub mod backend;
pub mod ollama;
pub mod process;

use metabolink_domain::{GenerationOptions, LlmProvider as LlmProviderTrait};
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;

pub use backend::{Backend, BackendConfig, BackendKind, EmbeddedModel, MIN_RESPONSE_CHARS};
pub use ollama::OllamaProvider;
pub use process::ProcessProvider;

/// Errors that can occur during LLM operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LlmError {
    /// No backend configured, or the configured one cannot be reached
    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    /// The call exceeded its time budget
    #[error("Timed out after {0}s")]
    Timeout(u64),

    /// The backend answered with too little text to be useful
    #[error("Empty response ({length} chars)")]
    EmptyResponse {
        /// Trimmed response length in characters
        length: usize,
    },

    /// Network, protocol or process communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response from LLM
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

impl LlmError {
    /// Whether another attempt at the same call might succeed
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            LlmError::Timeout(_) | LlmError::EmptyResponse { .. } | LlmError::Communication(_)
        )
    }
}

/// The single call contract every backend is normalized to
///
/// Implemented by [`Backend`]; the pipeline is generic over it so tests can
/// script backend behavior.
pub trait TextBackend {
    /// Generate an answer for `prompt`, or fail with a typed error
    fn generate(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> impl Future<Output = Result<String, LlmError>> + Send;
}

/// Mock LLM provider for deterministic testing
///
/// This provider returns pre-configured responses without making any network calls.
/// It's useful for testing and development.
///
/// # Examples
///
/// ```
/// use metabolink_llm::MockProvider;
/// use metabolink_domain::{GenerationOptions, LlmProvider};
///
/// let options = GenerationOptions::default();
///
/// // Simple fixed response
/// let provider = MockProvider::new("Fixed response");
/// assert_eq!(provider.generate("any prompt", &options).unwrap(), "Fixed response");
///
/// // Multiple responses
/// let mut provider = MockProvider::default();
/// provider.add_response("prompt1", "response1");
/// provider.add_response("prompt2", "response2");
/// assert_eq!(provider.generate("prompt1", &options).unwrap(), "response1");
/// assert_eq!(provider.generate("prompt2", &options).unwrap(), "response2");
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_response: String,
    responses: Arc<Mutex<HashMap<String, String>>>,
    failures: Arc<Mutex<HashSet<String>>>,
    call_count: Arc<Mutex<usize>>,
}

impl MockProvider {
    /// Create a new MockProvider with a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            responses: Arc::new(Mutex::new(HashMap::new())),
            failures: Arc::new(Mutex::new(HashSet::new())),
            call_count: Arc::new(Mutex::new(0)),
        }
    }

    /// Add a specific response for a given prompt
    pub fn add_response(&mut self, prompt: impl Into<String>, response: impl Into<String>) {
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(prompt.into(), response.into());
    }

    /// Get the number of times generate was called
    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Reset the call count
    pub fn reset_call_count(&self) {
        *self.call_count.lock().unwrap_or_else(PoisonError::into_inner) = 0;
    }

    /// Configure to report the backend as unavailable for a specific prompt
    pub fn add_error(&mut self, prompt: impl Into<String>) {
        self.failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(prompt.into());
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

impl LlmProviderTrait for MockProvider {
    type Error = LlmError;

    fn generate(&self, prompt: &str, _options: &GenerationOptions) -> Result<String, Self::Error> {
        *self.call_count.lock().unwrap_or_else(PoisonError::into_inner) += 1;

        if self
            .failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(prompt)
        {
            return Err(LlmError::BackendUnavailable("mock backend offline".to_string()));
        }

        let responses = self.responses.lock().unwrap_or_else(PoisonError::into_inner);
        let response = responses
            .get(prompt)
            .cloned()
            .unwrap_or_else(|| self.default_response.clone());
        Ok(response)
    }
}
