//! Configuration for the pipeline

use crate::error::ExtractorError;
use metabolink_domain::GenerationOptions;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Immutable settings for one batch run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Fewer parsed records than this triggers fallback
    #[serde(default = "default_min_correlations")]
    pub min_correlations_per_food: usize,

    /// Pause between consecutive foods (seconds)
    #[serde(default = "default_inter_call_delay")]
    pub inter_call_delay_secs: u64,

    /// Total backend attempts per food, first call included
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,

    /// Stop after this many foods; unbounded when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_foods: Option<usize>,

    /// Options forwarded to every backend call; configured in their own
    /// `[generation]` section
    #[serde(skip)]
    pub generation: GenerationOptions,
}

fn default_min_correlations() -> usize {
    15
}

fn default_inter_call_delay() -> u64 {
    2
}

fn default_retry_attempts() -> u32 {
    1
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            min_correlations_per_food: default_min_correlations(),
            inter_call_delay_secs: default_inter_call_delay(),
            retry_attempts: default_retry_attempts(),
            max_foods: None,
            generation: GenerationOptions::default(),
        }
    }
}

impl PipelineConfig {
    /// Quick preset: small minimum and no throttling, for smoke runs
    pub fn quick() -> Self {
        Self {
            min_correlations_per_food: 5,
            inter_call_delay_secs: 0,
            ..Self::default()
        }
    }

    /// Thorough preset: larger minimum and more attempts per food
    pub fn thorough() -> Self {
        Self {
            min_correlations_per_food: 20,
            retry_attempts: 3,
            ..Self::default()
        }
    }

    /// Get the inter-call delay as a Duration
    pub fn inter_call_delay(&self) -> Duration {
        Duration::from_secs(self.inter_call_delay_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ExtractorError> {
        if self.min_correlations_per_food == 0 {
            return Err(ExtractorError::Config(
                "min_correlations_per_food must be greater than 0".to_string(),
            ));
        }
        if self.retry_attempts == 0 {
            return Err(ExtractorError::Config(
                "retry_attempts must be greater than 0".to_string(),
            ));
        }
        self.generation.validate().map_err(ExtractorError::Config)
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ExtractorError> {
        toml::from_str(toml_str)
            .map_err(|e| ExtractorError::Config(format!("Failed to parse TOML: {}", e)))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, ExtractorError> {
        toml::to_string_pretty(self)
            .map_err(|e| ExtractorError::Config(format!("Failed to serialize to TOML: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = PipelineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.min_correlations_per_food, 15);
        assert_eq!(config.inter_call_delay(), Duration::from_secs(2));
        assert_eq!(config.retry_attempts, 1);
    }

    #[test]
    fn test_presets_are_valid() {
        assert!(PipelineConfig::quick().validate().is_ok());
        assert!(PipelineConfig::thorough().validate().is_ok());
        assert_eq!(PipelineConfig::quick().inter_call_delay_secs, 0);
        assert_eq!(PipelineConfig::thorough().retry_attempts, 3);
    }

    #[test]
    fn test_invalid_min_correlations() {
        let mut config = PipelineConfig::default();
        config.min_correlations_per_food = 0;
        assert!(matches!(config.validate(), Err(ExtractorError::Config(_))));
    }

    #[test]
    fn test_invalid_retry_attempts() {
        let mut config = PipelineConfig::default();
        config.retry_attempts = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_generation_options() {
        let mut config = PipelineConfig::default();
        config.generation.max_tokens = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = PipelineConfig::from_toml("max_foods = 5\nretry_attempts = 2\n").unwrap();
        assert_eq!(config.max_foods, Some(5));
        assert_eq!(config.retry_attempts, 2);
        assert_eq!(config.min_correlations_per_food, 15);
    }

    #[test]
    fn test_generation_not_part_of_pipeline_toml() {
        let mut config = PipelineConfig::default();
        config.generation.max_tokens = 512;
        let toml_str = config.to_toml().unwrap();
        assert!(!toml_str.contains("max_tokens"));
        let parsed = PipelineConfig::from_toml(&toml_str).unwrap();
        assert_eq!(parsed.generation, GenerationOptions::default());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = PipelineConfig::thorough();
        let toml_str = config.to_toml().unwrap();
        let parsed = PipelineConfig::from_toml(&toml_str).unwrap();
        assert_eq!(config, parsed);
    }
}
