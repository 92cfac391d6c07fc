//! Ollama Provider Implementation
//!
//! Provides integration with Ollama's local LLM API on the loopback
//! interface.
//!
//! # Features
//!
//! - Async HTTP communication with the Ollama generate API
//! - Configurable endpoint and model
//! - Per-request timeout from [`GenerationOptions`]
//! - Transport failures mapped onto [`LlmError`] variants
//!
//! The provider makes exactly one request per call. Retry policy belongs to
//! the caller.
//!
//! # Examples
//!
//! ```no_run
//! use metabolink_llm::OllamaProvider;
//!
//! let provider = OllamaProvider::new("http://localhost:11434", "llama2");
//! assert_eq!(provider.model(), "llama2");
//! ```

use crate::LlmError;
use metabolink_domain::GenerationOptions;
use serde::{Deserialize, Serialize};

/// Default Ollama API endpoint
pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434";

/// Default model name
pub const DEFAULT_MODEL: &str = "llama2";

/// Ollama API provider for local LLM inference
#[derive(Debug, Clone)]
pub struct OllamaProvider {
    endpoint: String,
    model: String,
    client: reqwest::Client,
}

/// Request body for Ollama generate API
#[derive(Serialize)]
struct OllamaGenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: OllamaOptions,
}

/// Sampling options understood by Ollama
#[derive(Serialize)]
struct OllamaOptions {
    num_predict: u32,
    temperature: f32,
}

/// Response from Ollama generate API
#[derive(Deserialize)]
struct OllamaGenerateResponse {
    response: String,
}

impl OllamaProvider {
    /// Create a new Ollama provider
    ///
    /// # Parameters
    ///
    /// - `endpoint`: Ollama API endpoint (e.g., "http://localhost:11434")
    /// - `model`: Model to use (e.g., "llama2", "mistral")
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            model: model.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Create a new Ollama provider on the default loopback endpoint
    pub fn default_endpoint(model: impl Into<String>) -> Self {
        Self::new(DEFAULT_ENDPOINT, model)
    }

    /// Configured endpoint
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Configured model
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Generate text using Ollama API
    ///
    /// # Errors
    ///
    /// - `BackendUnavailable` if Ollama is not running
    /// - `Timeout` if the request exceeds `options.timeout_secs`
    /// - `ModelNotAvailable` if the model is not pulled
    /// - `Communication` for other HTTP failures
    /// - `InvalidResponse` if the body cannot be decoded
    pub async fn generate(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, LlmError> {
        let url = format!("{}/api/generate", self.endpoint);

        let request_body = OllamaGenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            options: OllamaOptions {
                num_predict: options.max_tokens,
                temperature: options.temperature,
            },
        };

        let response = self
            .client
            .post(&url)
            .timeout(options.timeout())
            .json(&request_body)
            .send()
            .await
            .map_err(|e| self.transport_error(e, options))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(LlmError::ModelNotAvailable(self.model.clone()));
        }
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(LlmError::Communication(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let body = response
            .json::<OllamaGenerateResponse>()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout(options.timeout_secs)
                } else {
                    LlmError::InvalidResponse(format!("Failed to parse response: {}", e))
                }
            })?;

        Ok(body.response)
    }

    fn transport_error(&self, e: reqwest::Error, options: &GenerationOptions) -> LlmError {
        if e.is_timeout() {
            LlmError::Timeout(options.timeout_secs)
        } else if e.is_connect() {
            LlmError::BackendUnavailable(format!("cannot reach {}: {}", self.endpoint, e))
        } else {
            LlmError::Communication(format!("Request failed: {}", e))
        }
    }
}
