//! Metabolink Domain Layer
//!
//! This crate contains the data model shared by every other Metabolink crate:
//! the correlation records produced for each food, the per-food aggregate, the
//! persisted batch document, and the trait seam behind which text-generation
//! backends live.
//!
//! ## Key Concepts
//!
//! - **CorrelationRecord**: one claimed association between a food and a blood metabolite
//! - **Provenance**: whether a record came from parsed model output or the fallback synthesizer
//! - **Verification**: tri-state expert review flag, owned by the review workflow
//! - **FoodEntry**: everything produced for one food in a batch
//! - **BatchResult**: the persisted artifact, with metadata derived from content
//!
//! ## Architecture
//!
//! - Pure data and invariants only
//! - No I/O; persistence lives in `metabolink-extractor`
//! - Backend implementations live in `metabolink-llm`

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod batch;
pub mod correlation;
pub mod food;
pub mod traits;

// Re-exports for convenience
pub use batch::{BatchMetadata, BatchResult};
pub use correlation::{CorrelationRecord, CorrelationType, Provenance, Verification};
pub use food::{Degradation, FoodEntry};
pub use traits::{GenerationOptions, LlmProvider};
