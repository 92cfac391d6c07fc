//! External-process provider
//!
//! Runs a generation executable (for example a llama.cpp CLI build), pipes the
//! prompt to its stdin and takes stdout as the answer. Arguments may contain
//! `{max_tokens}` and `{temperature}` placeholders.

use crate::LlmError;
use metabolink_domain::GenerationOptions;
use std::io::ErrorKind;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

/// Provider backed by an external executable
#[derive(Debug, Clone)]
pub struct ProcessProvider {
    executable: String,
    args: Vec<String>,
}

impl ProcessProvider {
    /// Create a provider for `executable` with argument templates
    pub fn new(executable: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            executable: executable.into(),
            args,
        }
    }

    /// Configured executable
    pub fn executable(&self) -> &str {
        &self.executable
    }

    /// Replace placeholders in argument string.
    fn expand_arg(&self, arg: &str, options: &GenerationOptions) -> String {
        arg.replace("{max_tokens}", &options.max_tokens.to_string())
            .replace("{temperature}", &options.temperature.to_string())
    }

    /// Build command arguments with placeholders expanded.
    fn build_args(&self, options: &GenerationOptions) -> Vec<String> {
        self.args
            .iter()
            .map(|arg| self.expand_arg(arg, options))
            .collect()
    }

    /// Run the executable once for `prompt`
    ///
    /// The child is killed if the returned future is dropped, which is how
    /// an enclosing timeout stops it.
    pub async fn generate(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, LlmError> {
        let args = self.build_args(options);
        debug!("Spawning {} {:?}", self.executable, args);

        let mut child = Command::new(&self.executable)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound | ErrorKind::PermissionDenied => LlmError::BackendUnavailable(
                    format!("cannot run '{}': {}", self.executable, e),
                ),
                _ => LlmError::Communication(format!("Failed to run command: {}", e)),
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            // A child that exits without reading its input is judged by its exit status
            if let Err(e) = stdin.write_all(prompt.as_bytes()).await {
                if e.kind() != ErrorKind::BrokenPipe {
                    return Err(LlmError::Communication(format!(
                        "Failed to write prompt: {}",
                        e
                    )));
                }
            }
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| LlmError::Communication(format!("Failed to read output: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(LlmError::Communication(format!(
                "{} failed (exit code {:?}): {}",
                self.executable,
                output.status.code(),
                stderr.lines().take(5).collect::<Vec<_>>().join("\n")
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
