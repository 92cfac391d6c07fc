//! Backend selection and the uniform call contract
//!
//! The transport is chosen once from configuration and wrapped in a
//! [`Backend`]. Whatever the variant, a call is bounded by the configured
//! timeout and an answer shorter than [`MIN_RESPONSE_CHARS`] is reported as
//! [`LlmError::EmptyResponse`].

use crate::ollama::{DEFAULT_ENDPOINT, DEFAULT_MODEL};
use crate::{LlmError, OllamaProvider, ProcessProvider, TextBackend};
use metabolink_domain::{GenerationOptions, LlmProvider};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::time::timeout;
use tracing::debug;

/// Minimum trimmed answer length accepted as a real response
pub const MIN_RESPONSE_CHARS: usize = 100;

/// Which transport serves generation calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// In-process model
    Embedded,

    /// Local HTTP service
    #[default]
    Http,

    /// External executable
    Process,
}

impl BackendKind {
    /// Get the kind name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Embedded => "embedded",
            BackendKind::Http => "http",
            BackendKind::Process => "process",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Backend section of the configuration file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Transport to use
    #[serde(default)]
    pub kind: BackendKind,

    /// HTTP endpoint (http kind)
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Model name (http kind)
    #[serde(default = "default_model")]
    pub model: String,

    /// Executable to run (process kind)
    #[serde(default = "default_executable")]
    pub executable: String,

    /// Argument templates (process kind)
    #[serde(default = "default_args")]
    pub args: Vec<String>,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_executable() -> String {
    "llama".to_string()
}

fn default_args() -> Vec<String> {
    ["-n", "{max_tokens}", "--temp", "{temperature}"]
        .iter()
        .map(|arg| arg.to_string())
        .collect()
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            kind: BackendKind::default(),
            endpoint: default_endpoint(),
            model: default_model(),
            executable: default_executable(),
            args: default_args(),
        }
    }
}

type SharedModel = Arc<dyn LlmProvider<Error = LlmError> + Send + Sync>;

/// An in-process model, possibly absent
///
/// The CLI ships without a model, so its embedded backend is
/// [`EmbeddedModel::unloaded`]; programs embedding the library pass their
/// own provider to [`EmbeddedModel::new`].
///
/// At most one call runs inside the model at a time, clones included. A call
/// abandoned by the caller's timeout keeps the slot until the model returns.
#[derive(Clone)]
pub struct EmbeddedModel {
    model: Option<SharedModel>,
    slot: Arc<Semaphore>,
}

impl EmbeddedModel {
    /// Wrap an in-process provider
    pub fn new<P>(provider: P) -> Self
    where
        P: LlmProvider<Error = LlmError> + Send + Sync + 'static,
    {
        Self {
            model: Some(Arc::new(provider)),
            slot: Arc::new(Semaphore::new(1)),
        }
    }

    /// No model loaded; every call reports the backend as unavailable
    pub fn unloaded() -> Self {
        Self {
            model: None,
            slot: Arc::new(Semaphore::new(1)),
        }
    }

    /// Whether a model is present
    pub fn is_loaded(&self) -> bool {
        self.model.is_some()
    }

    async fn generate(&self, prompt: &str, options: &GenerationOptions) -> Result<String, LlmError> {
        let model = self.model.clone().ok_or_else(|| {
            LlmError::BackendUnavailable("no in-process model loaded".to_string())
        })?;
        let permit = Arc::clone(&self.slot)
            .acquire_owned()
            .await
            .map_err(|e| LlmError::BackendUnavailable(format!("embedded model closed: {}", e)))?;
        let prompt = prompt.to_string();
        let options = options.clone();

        // Call in a blocking context since LlmProvider is not async
        tokio::task::spawn_blocking(move || {
            let _permit = permit;
            model.generate(&prompt, &options)
        })
        .await
        .map_err(|e| LlmError::Other(format!("Task join error: {}", e)))?
    }
}

impl fmt::Debug for EmbeddedModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmbeddedModel")
            .field("loaded", &self.is_loaded())
            .finish()
    }
}

/// A generation backend resolved once at startup
#[derive(Debug, Clone)]
pub enum Backend {
    /// In-process model
    Embedded(EmbeddedModel),

    /// Local Ollama-compatible HTTP service
    Http(OllamaProvider),

    /// External executable
    Process(ProcessProvider),
}

impl Backend {
    /// Build the backend named by configuration
    ///
    /// The embedded kind has no model to load from configuration and
    /// resolves to [`EmbeddedModel::unloaded`].
    pub fn from_config(config: &BackendConfig) -> Self {
        match config.kind {
            BackendKind::Embedded => Backend::Embedded(EmbeddedModel::unloaded()),
            BackendKind::Http => {
                Backend::Http(OllamaProvider::new(&config.endpoint, &config.model))
            }
            BackendKind::Process => Backend::Process(ProcessProvider::new(
                &config.executable,
                config.args.clone(),
            )),
        }
    }

    /// Which transport this backend uses
    pub fn kind(&self) -> BackendKind {
        match self {
            Backend::Embedded(_) => BackendKind::Embedded,
            Backend::Http(_) => BackendKind::Http,
            Backend::Process(_) => BackendKind::Process,
        }
    }

    /// Short description for logs
    pub fn describe(&self) -> String {
        match self {
            Backend::Embedded(model) if model.is_loaded() => "embedded model".to_string(),
            Backend::Embedded(_) => "embedded (no model loaded)".to_string(),
            Backend::Http(provider) => format!("{} @ {}", provider.model(), provider.endpoint()),
            Backend::Process(provider) => format!("process '{}'", provider.executable()),
        }
    }
}

impl TextBackend for Backend {
    async fn generate(&self, prompt: &str, options: &GenerationOptions) -> Result<String, LlmError> {
        let call = async {
            match self {
                Backend::Embedded(model) => model.generate(prompt, options).await,
                Backend::Http(provider) => provider.generate(prompt, options).await,
                Backend::Process(provider) => provider.generate(prompt, options).await,
            }
        };

        let response = timeout(options.timeout(), call)
            .await
            .map_err(|_| LlmError::Timeout(options.timeout_secs))??;

        debug!("{} answered with {} chars", self.kind(), response.len());
        ensure_substantive(response)
    }
}

/// Reject answers too short to hold a single record
fn ensure_substantive(response: String) -> Result<String, LlmError> {
    let length = response.trim().chars().count();
    if length < MIN_RESPONSE_CHARS {
        return Err(LlmError::EmptyResponse { length });
    }
    Ok(response)
}
