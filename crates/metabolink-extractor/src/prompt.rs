//! Literature-search prompt for one food

/// Builds the instruction sent to the backend for a food
pub struct PromptBuilder {
    food: String,
}

impl PromptBuilder {
    /// Create a new prompt builder
    pub fn new(food: impl Into<String>) -> Self {
        Self { food: food.into() }
    }

    /// Build the complete literature-search prompt
    ///
    /// Output is a pure function of the food name.
    pub fn build(&self) -> String {
        let food = &self.food;
        let mut prompt = String::new();

        // 1. Role and task
        prompt.push_str(RESEARCHER_ROLE);
        prompt.push_str("\n\n");
        prompt.push_str(&format!(
            "Your task is to find ALL scientific papers, research articles, and references that mention the food item \"{}\" in correlation with metabolites found in blood (plasma or serum).\n\n",
            food
        ));

        // 2. Correlation kinds
        prompt.push_str("Please search for:\n");
        prompt.push_str(&format!(
            "1. Positive correlations (increased levels of metabolites when consuming {})\n",
            food
        ));
        prompt.push_str(&format!(
            "2. Negative correlations (decreased levels of metabolites when consuming {})\n",
            food
        ));
        prompt.push_str(&format!(
            "3. Any significant associations between {} consumption and blood metabolite levels\n\n",
            food
        ));

        // 3. Specimen restriction
        prompt.push_str(SPECIMEN_RESTRICTION);
        prompt.push_str("\n\n");

        // 4. Output format the parser understands
        prompt.push_str(OUTPUT_FORMAT);

        prompt
    }
}

const RESEARCHER_ROLE: &str =
    "You are a scientific literature researcher specializing in metabolomics and nutritional science.";

const SPECIMEN_RESTRICTION: &str = "Focus ONLY on blood-based studies (plasma, serum, whole blood) and exclude urine, tissue, or other biospecimens.";

const OUTPUT_FORMAT: &str = r#"For each correlation found, write one record using exactly these labeled lines:

Reference: <authors, title, journal, year, DOI if available>
Metabolite: <the blood metabolite measured>
Correlation Type: <Positive, Negative or Association>
Finding Description: <one sentence describing the finding>
Relevant Quote: "<a quote or sentence from the paper mentioning the correlation>"

Separate records with a blank line. If a food affects several metabolites, write a separate record for each one. Be comprehensive and thorough."#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_names_the_food() {
        let prompt = PromptBuilder::new("broccoli").build();
        assert!(prompt.contains("\"broccoli\""));
        assert!(prompt.contains("when consuming broccoli"));
    }

    #[test]
    fn test_prompt_is_deterministic() {
        assert_eq!(
            PromptBuilder::new("kale").build(),
            PromptBuilder::new("kale").build()
        );
        assert_ne!(
            PromptBuilder::new("kale").build(),
            PromptBuilder::new("spinach").build()
        );
    }

    #[test]
    fn test_prompt_requests_parseable_labels() {
        let prompt = PromptBuilder::new("tomatoes").build();
        for label in [
            "Reference:",
            "Metabolite:",
            "Correlation Type:",
            "Finding Description:",
            "Relevant Quote:",
        ] {
            assert!(prompt.contains(label), "missing label {}", label);
        }
        assert!(prompt.contains("blank line"));
    }

    #[test]
    fn test_prompt_restricts_to_blood() {
        let prompt = PromptBuilder::new("oats").build();
        assert!(prompt.contains("plasma"));
        assert!(prompt.contains("exclude urine"));
        assert!(prompt.contains("Positive"));
        assert!(prompt.contains("Negative"));
        assert!(prompt.contains("Association"));
    }
}
