//! Output formatting for the CLI.

use colored::*;
use metabolink_domain::{BatchMetadata, BatchResult};
use metabolink_extractor::RunSummary;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
pub struct Formatter {
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(color_enabled: bool) -> Self {
        Self { color_enabled }
    }

    /// Format the end-of-run summary.
    pub fn run_summary(&self, summary: &RunSummary) -> String {
        let mut builder = Builder::default();
        builder.push_record(["Metric", "Value"]);
        builder.push_record(["Foods processed", &summary.foods_processed.to_string()]);
        builder.push_record(["Total correlations", &summary.total_correlations.to_string()]);
        builder.push_record(["Parsed foods", &summary.parsed_foods.to_string()]);
        builder.push_record(["Fallback foods", &summary.fallback_foods.to_string()]);
        if summary.skipped_inputs > 0 {
            builder.push_record(["Skipped inputs", &summary.skipped_inputs.to_string()]);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        let mut output = table.to_string();
        if summary.fallback_foods > 0 {
            output.push('\n');
            output.push_str(&self.warning(&format!(
                "{} of {} foods use fallback placeholder data",
                summary.fallback_foods, summary.foods_processed
            )));
        }
        output
    }

    /// Format one row per food.
    pub fn foods_table(&self, result: &BatchResult) -> String {
        if result.is_empty() {
            return self.colorize("No foods processed.", "yellow");
        }

        let mut builder = Builder::default();
        builder.push_record(["ID", "Food", "Provenance", "Records", "Extracted", "Note"]);

        for food in result.foods() {
            let note = food
                .degradation
                .as_ref()
                .map(|d| d.to_string())
                .unwrap_or_default();
            builder.push_record([
                food.id.to_string(),
                food.name.clone(),
                food.provenance.to_string(),
                food.correlations.len().to_string(),
                food.extracted_count.to_string(),
                note,
            ]);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        table.to_string()
    }

    /// Format derived batch metadata.
    pub fn metadata(&self, metadata: &BatchMetadata) -> String {
        let types: Vec<&str> = metadata
            .correlation_types
            .iter()
            .map(|t| t.as_str())
            .collect();

        let mut builder = Builder::default();
        builder.push_record(["Field", "Value"]);
        builder.push_record(["totalFoods", &metadata.total_foods.to_string()]);
        builder.push_record(["totalCorrelations", &metadata.total_correlations.to_string()]);
        builder.push_record(["parsedFoods", &metadata.parsed_foods.to_string()]);
        builder.push_record(["fallbackFoods", &metadata.fallback_foods.to_string()]);
        builder.push_record(["correlationTypes", &types.join(", ")]);

        let mut table = builder.build();
        table.with(Style::rounded());
        table.to_string()
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}
