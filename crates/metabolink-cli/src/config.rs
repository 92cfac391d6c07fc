//! Configuration management for the CLI.

use crate::error::{CliError, Result};
use metabolink_domain::GenerationOptions;
use metabolink_extractor::PipelineConfig;
use metabolink_llm::BackendConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// CLI configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Backend selection
    #[serde(default)]
    pub backend: BackendConfig,

    /// Options passed to every backend call
    #[serde(default)]
    pub generation: GenerationOptions,

    /// Batch behavior
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Artifact locations
    #[serde(default)]
    pub output: OutputSettings,
}

/// Output file settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputSettings {
    /// Result artifact
    #[serde(default = "default_output_path")]
    pub path: PathBuf,

    /// Prompt export
    #[serde(default = "default_prompts_path")]
    pub prompts_path: PathBuf,
}

impl Config {
    /// Get the default configuration file path.
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".metabolink").join("config.toml"))
    }

    /// Resolve an explicit path or fall back to the default one.
    pub fn resolve_path(explicit: Option<&Path>) -> Result<PathBuf> {
        match explicit {
            Some(path) => Ok(path.to_path_buf()),
            None => Self::default_path(),
        }
    }

    /// Load configuration from file, or defaults when it does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)?;
            let config: Config = toml::from_str(&contents)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to file.
    pub fn save(&self, path: &Path) -> Result<()> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    /// Render as TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))
    }

    /// Build the immutable pipeline configuration.
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            generation: self.generation.clone(),
            ..self.pipeline.clone()
        }
    }
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            path: default_output_path(),
            prompts_path: default_prompts_path(),
        }
    }
}

fn default_output_path() -> PathBuf {
    PathBuf::from("expert_interface_data.json")
}

fn default_prompts_path() -> PathBuf {
    PathBuf::from("llama_prompts.json")
}
