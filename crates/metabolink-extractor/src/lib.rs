//! Metabolink Extractor
//!
//! Turns a list of foods into reviewable food/blood-metabolite correlation
//! records.
//!
//! # Architecture
//!
//! ```text
//! food → PromptBuilder → Backend → parse_llm_response → (too few?) FallbackSynthesizer
//!      → FoodEntry → BatchResult → ResultStore
//! ```
//!
//! # Key Features
//!
//! - **Sequential Batches**: one backend call in flight, optional throttle between foods
//! - **Lenient Parsing**: labeled free text in, malformed blocks counted and dropped
//! - **Guaranteed Minimum**: deterministic fallback records when parsing falls short
//! - **Provenance**: every food is wholly parsed or wholly synthesized, and says which
//! - **Atomic Output**: artifacts are written to a temp file and renamed into place
//!
//! # Example Usage
//!
//! ```no_run
//! use metabolink_extractor::{BatchOrchestrator, PipelineConfig, ResultStore};
//! use metabolink_llm::{Backend, BackendConfig};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let backend = Arc::new(Backend::from_config(&BackendConfig::default()));
//! let orchestrator = BatchOrchestrator::new(backend, PipelineConfig::default());
//!
//! let run = orchestrator.run(["broccoli", "kale"]).await;
//! println!("{} foods used fallback data", run.summary.fallback_foods);
//!
//! ResultStore::save(Path::new("expert_interface_data.json"), &run.result)?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod catalog;
mod config;
mod error;
mod fallback;
mod orchestrator;
mod parser;
mod prompt;
mod store;

#[cfg(test)]
mod tests;

pub use catalog::{Catalog, CatalogMetabolite, CatalogReference};
pub use config::PipelineConfig;
pub use error::ExtractorError;
pub use fallback::FallbackSynthesizer;
pub use orchestrator::{BatchOrchestrator, BatchRun, FoodState, RunSummary};
pub use parser::{parse_llm_response, ParseFn, ParseOutcome};
pub use prompt::PromptBuilder;
pub use store::{PromptExport, ResultStore};
