//! Atomic JSON persistence for batch results and prompt exports
//!
//! Every write goes to a temporary file next to the destination and is then
//! renamed over it, so a reader never sees a half-written artifact.

use crate::error::ExtractorError;
use crate::prompt::PromptBuilder;
use chrono::{DateTime, Utc};
use metabolink_domain::BatchResult;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::info;

/// Prompt export document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptExport {
    /// When the export was written
    pub generated_at: DateTime<Utc>,

    /// Number of prompts
    pub total_foods: usize,

    /// `(food, prompt)` pairs in input order, written as a JSON object
    #[serde(with = "ordered_prompts")]
    pub prompts: Vec<(String, String)>,
}

impl PromptExport {
    /// Build prompts for `foods`, skipping blanks and repeats
    pub fn build<S: AsRef<str>>(foods: &[S]) -> Self {
        let mut seen = HashSet::new();
        let prompts: Vec<(String, String)> = foods
            .iter()
            .map(|food| food.as_ref().trim())
            .filter(|food| !food.is_empty() && seen.insert(food.to_string()))
            .map(|food| (food.to_string(), PromptBuilder::new(food).build()))
            .collect();

        Self {
            generated_at: Utc::now(),
            total_foods: prompts.len(),
            prompts,
        }
    }
}

/// Object keyed by food name, entries kept in insertion order
mod ordered_prompts {
    use serde::de::{MapAccess, Visitor};
    use serde::ser::SerializeMap;
    use serde::{Deserializer, Serializer};
    use std::fmt;

    pub fn serialize<S: Serializer>(
        prompts: &[(String, String)],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(prompts.len()))?;
        for (food, prompt) in prompts {
            map.serialize_entry(food, prompt)?;
        }
        map.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<(String, String)>, D::Error> {
        struct PromptsVisitor;

        impl<'de> Visitor<'de> for PromptsVisitor {
            type Value = Vec<(String, String)>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object of food names to prompts")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut prompts = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some(entry) = access.next_entry::<String, String>()? {
                    prompts.push(entry);
                }
                Ok(prompts)
            }
        }

        deserializer.deserialize_map(PromptsVisitor)
    }
}

/// Reads and writes pipeline artifacts
pub struct ResultStore;

impl ResultStore {
    /// Write `result` to `path` atomically as pretty JSON
    pub fn save(path: &Path, result: &BatchResult) -> Result<(), ExtractorError> {
        let json = serde_json::to_vec_pretty(result)
            .map_err(|e| ExtractorError::Persistence(format!("Failed to serialize result: {}", e)))?;
        write_atomic(path, &json)?;

        info!(
            "Saved {} foods ({} correlations) to {}",
            result.len(),
            result.total_correlations(),
            path.display()
        );
        Ok(())
    }

    /// Read a result artifact; metadata is re-derived from content
    pub fn load(path: &Path) -> Result<BatchResult, ExtractorError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| ExtractorError::Io(format!("{}: {}", path.display(), e)))?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Write the prompt export for `foods` atomically
    pub fn save_prompts<S: AsRef<str>>(
        path: &Path,
        foods: &[S],
    ) -> Result<PromptExport, ExtractorError> {
        let export = PromptExport::build(foods);
        let json = serde_json::to_vec_pretty(&export)
            .map_err(|e| ExtractorError::Persistence(format!("Failed to serialize prompts: {}", e)))?;
        write_atomic(path, &json)?;

        info!("Saved {} prompts to {}", export.total_foods, path.display());
        Ok(export)
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), ExtractorError> {
    let persistence = |e: std::io::Error| {
        ExtractorError::Persistence(format!("{}: {}", path.display(), e))
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(persistence)?;

    let mut file = NamedTempFile::new_in(dir).map_err(persistence)?;
    file.write_all(bytes).map_err(persistence)?;
    file.write_all(b"\n").map_err(persistence)?;
    file.as_file().sync_all().map_err(persistence)?;
    file.persist(path).map_err(|e| persistence(e.error))?;
    Ok(())
}
