//! The persisted batch document
//!
//! Metadata counts are never stored on [`BatchResult`]; they are derived from
//! the food list every time they are read or serialized, so the counts in a
//! written file always match its content.

use crate::correlation::{CorrelationType, Provenance};
use crate::food::FoodEntry;
use chrono::{DateTime, Utc};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeSet;

/// Counts describing a batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchMetadata {
    /// Number of food entries
    pub total_foods: usize,

    /// Sum of correlation list lengths across foods
    pub total_correlations: usize,

    /// Foods whose records were all parsed
    pub parsed_foods: usize,

    /// Foods whose records were all synthesized
    pub fallback_foods: usize,

    /// Distinct correlation types present, sorted
    pub correlation_types: Vec<CorrelationType>,
}

/// Ordered results of one batch run
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawBatchResult")]
pub struct BatchResult {
    /// When the batch was generated
    pub generated_at: DateTime<Utc>,

    foods: Vec<FoodEntry>,
}

impl BatchResult {
    /// Create an empty batch stamped with the current time
    pub fn new() -> Self {
        Self::with_timestamp(Utc::now())
    }

    /// Create an empty batch with an explicit timestamp
    pub fn with_timestamp(generated_at: DateTime<Utc>) -> Self {
        Self {
            generated_at,
            foods: Vec::new(),
        }
    }

    /// Append a food, assigning its positional id
    ///
    /// # Examples
    ///
    /// ```
    /// use metabolink_domain::{BatchResult, FoodEntry};
    ///
    /// let mut batch = BatchResult::new();
    /// batch.push(FoodEntry::parsed("broccoli", "prompt", vec![]));
    /// batch.push(FoodEntry::parsed("kale", "prompt", vec![]));
    /// assert_eq!(batch.foods()[1].id, 1);
    /// ```
    pub fn push(&mut self, mut entry: FoodEntry) -> usize {
        let id = self.foods.len();
        entry.id = id;
        self.foods.push(entry);
        id
    }

    /// Foods in input order
    pub fn foods(&self) -> &[FoodEntry] {
        &self.foods
    }

    /// Mutable access to one food, for review tooling
    pub fn food_mut(&mut self, id: usize) -> Option<&mut FoodEntry> {
        self.foods.get_mut(id)
    }

    /// Look up a food by name
    pub fn find(&self, name: &str) -> Option<&FoodEntry> {
        self.foods.iter().find(|food| food.name == name)
    }

    /// Number of foods
    pub fn len(&self) -> usize {
        self.foods.len()
    }

    /// Whether the batch has no foods
    pub fn is_empty(&self) -> bool {
        self.foods.is_empty()
    }

    /// Consume the batch and return its foods
    pub fn into_foods(self) -> Vec<FoodEntry> {
        self.foods
    }

    /// Sum of correlation counts across foods
    pub fn total_correlations(&self) -> usize {
        self.foods.iter().map(|food| food.correlations.len()).sum()
    }

    /// Derive the metadata block from current content
    pub fn metadata(&self) -> BatchMetadata {
        let correlation_types: BTreeSet<CorrelationType> = self
            .foods
            .iter()
            .flat_map(|food| food.correlations.iter().map(|c| c.correlation_type))
            .collect();

        BatchMetadata {
            total_foods: self.foods.len(),
            total_correlations: self.total_correlations(),
            parsed_foods: self.count_provenance(Provenance::Parsed),
            fallback_foods: self.count_provenance(Provenance::Fallback),
            correlation_types: correlation_types.into_iter().collect(),
        }
    }

    fn count_provenance(&self, provenance: Provenance) -> usize {
        self.foods
            .iter()
            .filter(|food| food.provenance == provenance)
            .count()
    }
}

impl Default for BatchResult {
    fn default() -> Self {
        Self::new()
    }
}

impl Serialize for BatchResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("BatchResult", 3)?;
        state.serialize_field("generatedAt", &self.generated_at)?;
        state.serialize_field("foods", &self.foods)?;
        state.serialize_field("metadata", &self.metadata())?;
        state.end()
    }
}

/// Wire shape accepted on load; any stored metadata is ignored
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawBatchResult {
    generated_at: DateTime<Utc>,
    #[serde(default)]
    foods: Vec<FoodEntry>,
}

impl From<RawBatchResult> for BatchResult {
    fn from(raw: RawBatchResult) -> Self {
        let mut batch = BatchResult::with_timestamp(raw.generated_at);
        for entry in raw.foods {
            batch.push(entry);
        }
        batch
    }
}
