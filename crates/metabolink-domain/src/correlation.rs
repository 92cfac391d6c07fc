//! Correlation records - the unit of output reviewed by experts

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Direction of a food/metabolite association
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CorrelationType {
    /// Metabolite level rises with consumption
    Positive,

    /// Metabolite level falls with consumption
    Negative,

    /// Reported association without a clear direction
    Association,
}

impl CorrelationType {
    /// Get the canonical label
    pub fn as_str(&self) -> &'static str {
        match self {
            CorrelationType::Positive => "Positive",
            CorrelationType::Negative => "Negative",
            CorrelationType::Association => "Association",
        }
    }
}

impl fmt::Display for CorrelationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CorrelationType {
    type Err = String;

    /// Parse a correlation label as models tend to write it
    ///
    /// Matching is case-insensitive and only looks at the leading word, so
    /// "positive correlation" and "Negative (inverse)" are both accepted.
    ///
    /// # Examples
    ///
    /// ```
    /// use metabolink_domain::CorrelationType;
    ///
    /// assert_eq!("Positive".parse(), Ok(CorrelationType::Positive));
    /// assert_eq!("negative correlation".parse(), Ok(CorrelationType::Negative));
    /// assert!("unclear".parse::<CorrelationType>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let leading = s
            .trim()
            .split(|c: char| !c.is_ascii_alphabetic())
            .find(|word| !word.is_empty())
            .unwrap_or("");

        match leading.to_ascii_lowercase().as_str() {
            "positive" => Ok(CorrelationType::Positive),
            "negative" => Ok(CorrelationType::Negative),
            "association" | "associated" => Ok(CorrelationType::Association),
            _ => Err(format!("unrecognized correlation type: '{}'", s.trim())),
        }
    }
}

/// Expert review state of a record
///
/// Serialized as `null` / `true` / `false` so the review tool can keep
/// storing its flag unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verification {
    /// Not reviewed yet
    #[default]
    Unknown,

    /// Expert confirmed the correlation
    Confirmed,

    /// Expert rejected the correlation
    Rejected,
}

impl Verification {
    /// Representation used on the wire
    pub fn as_option(&self) -> Option<bool> {
        match self {
            Verification::Unknown => None,
            Verification::Confirmed => Some(true),
            Verification::Rejected => Some(false),
        }
    }
}

impl From<Option<bool>> for Verification {
    fn from(value: Option<bool>) -> Self {
        match value {
            None => Verification::Unknown,
            Some(true) => Verification::Confirmed,
            Some(false) => Verification::Rejected,
        }
    }
}

impl Serialize for Verification {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.as_option().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Verification {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Option::<bool>::deserialize(deserializer)?.into())
    }
}

/// Where a record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    /// Extracted from the generation backend's answer
    Parsed,

    /// Synthesized placeholder content
    Fallback,
}

impl Provenance {
    /// Get the provenance tag as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Provenance::Parsed => "parsed",
            Provenance::Fallback => "fallback",
        }
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One claimed association between a food and a blood metabolite
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrelationRecord {
    /// Human-readable citation
    pub reference: String,

    /// Link to the reference, only when the source stated one
    #[serde(default)]
    pub reference_link: Option<String>,

    /// DOI of the reference, only when the source stated one
    #[serde(default)]
    pub doi: Option<String>,

    /// Measured analyte
    pub metabolite: String,

    /// Direction of the association
    pub correlation_type: CorrelationType,

    /// One-sentence description of the observed effect
    #[serde(default)]
    pub finding: String,

    /// Supporting snippet, may be empty
    #[serde(default)]
    pub relevant_quote: String,

    /// Expert review state
    #[serde(default)]
    pub verified: Verification,

    /// Expert annotation
    #[serde(default)]
    pub expert_notes: String,

    /// Parsed or synthesized
    pub provenance: Provenance,
}

impl CorrelationRecord {
    fn new(
        reference: String,
        metabolite: String,
        correlation_type: CorrelationType,
        finding: String,
        relevant_quote: String,
        provenance: Provenance,
    ) -> Self {
        Self {
            reference,
            reference_link: None,
            doi: None,
            metabolite,
            correlation_type,
            finding,
            relevant_quote,
            verified: Verification::Unknown,
            expert_notes: String::new(),
            provenance,
        }
    }

    /// Create a record extracted from model output
    pub fn parsed(
        reference: impl Into<String>,
        metabolite: impl Into<String>,
        correlation_type: CorrelationType,
        finding: impl Into<String>,
        relevant_quote: impl Into<String>,
    ) -> Self {
        Self::new(
            reference.into(),
            metabolite.into(),
            correlation_type,
            finding.into(),
            relevant_quote.into(),
            Provenance::Parsed,
        )
    }

    /// Create a synthesized placeholder record
    pub fn fallback(
        reference: impl Into<String>,
        metabolite: impl Into<String>,
        correlation_type: CorrelationType,
        finding: impl Into<String>,
        relevant_quote: impl Into<String>,
    ) -> Self {
        Self::new(
            reference.into(),
            metabolite.into(),
            correlation_type,
            finding.into(),
            relevant_quote.into(),
            Provenance::Fallback,
        )
    }

    /// Attach locators found in the source text
    pub fn with_locators(mut self, reference_link: Option<String>, doi: Option<String>) -> Self {
        self.reference_link = reference_link;
        self.doi = doi;
        self
    }

    /// Check the minimum field presence required for review
    pub fn validate(&self) -> Result<(), String> {
        if self.reference.trim().is_empty() {
            return Err("reference is empty".to_string());
        }
        if self.metabolite.trim().is_empty() {
            return Err("metabolite is empty".to_string());
        }
        Ok(())
    }
}
