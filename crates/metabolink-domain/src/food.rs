//! Per-food aggregate

use crate::correlation::{CorrelationRecord, Provenance};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a food ended up with fallback data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Degradation {
    /// The generation backend returned an error
    BackendFailure {
        /// Backend error message
        detail: String,
    },

    /// The parser promoted fewer records than required
    InsufficientExtraction {
        /// Records promoted by the parser
        extracted: usize,
        /// Configured minimum
        required: usize,
    },

    /// An unexpected fault was caught at the per-food boundary
    ProcessingFailure {
        /// Fault description
        detail: String,
    },
}

impl fmt::Display for Degradation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Degradation::BackendFailure { detail } => write!(f, "backend failure: {}", detail),
            Degradation::InsufficientExtraction { extracted, required } => write!(
                f,
                "insufficient extraction: {} of {} required records",
                extracted, required
            ),
            Degradation::ProcessingFailure { detail } => {
                write!(f, "processing failure: {}", detail)
            }
        }
    }
}

/// Everything produced for one food in a batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodEntry {
    /// Position in the batch, assigned by [`crate::BatchResult::push`]
    pub id: usize,

    /// Trimmed food name, unique within a batch
    pub name: String,

    /// Exact instruction text sent to the backend
    pub prompt: String,

    /// Records in extraction order
    pub correlations: Vec<CorrelationRecord>,

    /// Batch-level expert sign-off
    #[serde(default)]
    pub verified: bool,

    /// Food-level expert annotation
    #[serde(default)]
    pub expert_notes: String,

    /// Shared provenance of every record in `correlations`
    pub provenance: Provenance,

    /// Records the parser promoted, before any fallback replacement
    #[serde(default)]
    pub extracted_count: usize,

    /// Reason fallback data was used, if it was
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub degradation: Option<Degradation>,

    /// When processing of this food completed
    pub processed_at: DateTime<Utc>,
}

impl FoodEntry {
    /// Create an entry backed entirely by parsed records
    pub fn parsed(
        name: impl Into<String>,
        prompt: impl Into<String>,
        correlations: Vec<CorrelationRecord>,
    ) -> Self {
        let extracted_count = correlations.len();
        Self {
            id: 0,
            name: name.into(),
            prompt: prompt.into(),
            correlations,
            verified: false,
            expert_notes: String::new(),
            provenance: Provenance::Parsed,
            extracted_count,
            degradation: None,
            processed_at: Utc::now(),
        }
    }

    /// Create an entry whose records were synthesized
    ///
    /// `extracted_count` keeps what the parser managed before it was
    /// replaced, so reviewers can see how close the model came.
    pub fn fallback(
        name: impl Into<String>,
        prompt: impl Into<String>,
        correlations: Vec<CorrelationRecord>,
        extracted_count: usize,
        degradation: Degradation,
    ) -> Self {
        Self {
            id: 0,
            name: name.into(),
            prompt: prompt.into(),
            correlations,
            verified: false,
            expert_notes: String::new(),
            provenance: Provenance::Fallback,
            extracted_count,
            degradation: Some(degradation),
            processed_at: Utc::now(),
        }
    }

    /// Whether fallback data was used
    pub fn is_degraded(&self) -> bool {
        self.degradation.is_some()
    }

    /// Check that every record carries the food-level provenance tag
    pub fn has_uniform_provenance(&self) -> bool {
        self.correlations
            .iter()
            .all(|record| record.provenance == self.provenance)
    }
}
