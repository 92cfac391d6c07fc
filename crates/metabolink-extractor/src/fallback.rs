//! Deterministic placeholder records for foods the model did not cover
//!
//! The same food name always yields the same records. Different foods start
//! at different catalog positions so their placeholder sets do not all open
//! with the same metabolite.

use crate::catalog::Catalog;
use metabolink_domain::CorrelationRecord;

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Stable 64-bit FNV-1a hash; `std`'s hasher is not stable across releases
fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(FNV_OFFSET_BASIS, |hash, byte| {
        (hash ^ u64::from(*byte)).wrapping_mul(FNV_PRIME)
    })
}

/// Builds placeholder record sets from a [`Catalog`]
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackSynthesizer {
    catalog: Catalog,
}

impl FallbackSynthesizer {
    /// Create a synthesizer over `catalog`
    pub fn new(catalog: Catalog) -> Self {
        Self { catalog }
    }

    /// Produce exactly `min_count` fallback records for `food`
    ///
    /// Returns nothing when the catalog is exhausted.
    pub fn synthesize(&self, food: &str, min_count: usize) -> Vec<CorrelationRecord> {
        if self.catalog.is_exhausted() {
            return Vec::new();
        }

        let metabolites = self.catalog.metabolites();
        let references = self.catalog.references();
        let offset = self.offset(food);

        (0..min_count)
            .map(|i| {
                let metabolite = &metabolites[(offset + i) % metabolites.len()];
                let citation = references[(offset + i) % references.len()].citation;

                // Past the first lap, tag the pass so records stay distinguishable
                let lap = i / metabolites.len();
                let reference = if lap == 0 {
                    citation.to_string()
                } else {
                    format!("{} (set {})", citation, lap + 1)
                };

                CorrelationRecord::fallback(
                    reference,
                    metabolite.name,
                    metabolite.correlation_type,
                    metabolite.finding_for(food),
                    metabolite.quote_for(food),
                )
            })
            .collect()
    }

    fn offset(&self, food: &str) -> usize {
        let hash = fnv1a(food.trim().to_lowercase().as_bytes());
        (hash % self.catalog.metabolites().len() as u64) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CatalogMetabolite, CatalogReference};
    use metabolink_domain::{CorrelationType, Provenance};

    static ONE_REFERENCE: &[CatalogReference] = &[CatalogReference {
        citation: "Doe et al. (2020) - Nutrients",
    }];

    static TWO_METABOLITES: &[CatalogMetabolite] = &[
        CatalogMetabolite {
            name: "Folate",
            correlation_type: CorrelationType::Positive,
            finding: "More folate after {food}",
            quote: "folate rose with {food}",
        },
        CatalogMetabolite {
            name: "Homocysteine",
            correlation_type: CorrelationType::Negative,
            finding: "Less homocysteine after {food}",
            quote: "homocysteine fell with {food}",
        },
    ];

    #[test]
    fn test_fnv1a_known_values() {
        assert_eq!(fnv1a(b""), FNV_OFFSET_BASIS);
        assert_eq!(fnv1a(b"a"), 0xaf63_dc4c_8601_ec8c);
    }

    #[test]
    fn test_exact_count_and_provenance() {
        let synthesizer = FallbackSynthesizer::default();
        for count in [0, 1, 15, 40] {
            let records = synthesizer.synthesize("kale", count);
            assert_eq!(records.len(), count);
            assert!(records.iter().all(|r| r.provenance == Provenance::Fallback));
            assert!(records.iter().all(|r| r.validate().is_ok()));
        }
    }

    #[test]
    fn test_deterministic_output() {
        let synthesizer = FallbackSynthesizer::default();
        let first = synthesizer.synthesize("Broccoli", 15);
        let second = synthesizer.synthesize("Broccoli", 15);
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_offset_ignores_case_and_padding() {
        let synthesizer = FallbackSynthesizer::default();
        assert_eq!(synthesizer.offset("Kale"), synthesizer.offset("  kale "));
    }

    #[test]
    fn test_food_interpolated_and_no_locators() {
        let records = FallbackSynthesizer::default().synthesize("blueberries", 5);
        for record in &records {
            assert!(record.finding.contains("blueberries"));
            assert!(record.relevant_quote.contains("blueberries"));
            assert!(record.reference_link.is_none());
            assert!(record.doi.is_none());
        }
    }

    #[test]
    fn test_cycling_marks_repeated_laps() {
        let synthesizer = FallbackSynthesizer::new(Catalog::new(ONE_REFERENCE, TWO_METABOLITES));
        let records = synthesizer.synthesize("oats", 5);
        assert_eq!(records.len(), 5);
        assert_eq!(records[0].reference, "Doe et al. (2020) - Nutrients");
        assert_eq!(records[1].reference, "Doe et al. (2020) - Nutrients");
        assert_eq!(records[2].reference, "Doe et al. (2020) - Nutrients (set 2)");
        assert_eq!(records[4].reference, "Doe et al. (2020) - Nutrients (set 3)");
        assert_eq!(records[0].metabolite, records[2].metabolite);
        assert_ne!(records[0].metabolite, records[1].metabolite);
    }

    #[test]
    fn test_exhausted_catalog_yields_nothing() {
        let synthesizer = FallbackSynthesizer::new(Catalog::new(&[], TWO_METABOLITES));
        assert!(synthesizer.synthesize("oats", 15).is_empty());
        let synthesizer = FallbackSynthesizer::new(Catalog::new(ONE_REFERENCE, &[]));
        assert!(synthesizer.synthesize("oats", 15).is_empty());
    }
}
