//! Probe command implementation.

use crate::cli::ProbeArgs;
use crate::config::Config;
use crate::error::Result;
use crate::input::load_foods;
use crate::output::Formatter;
use metabolink_extractor::{parse_llm_response, PromptBuilder};
use metabolink_llm::{Backend, TextBackend};

const DEFAULT_PROBE_FOOD: &str = "broccoli";

/// Execute the probe command.
///
/// Sends a single prompt and reports the raw answer length and how many
/// records the parser finds in it.
pub async fn execute_probe(args: ProbeArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let food = match &args.foods {
        Some(path) => load_foods(path)?
            .into_iter()
            .next()
            .unwrap_or_else(|| DEFAULT_PROBE_FOOD.to_string()),
        None => DEFAULT_PROBE_FOOD.to_string(),
    };

    let mut backend_config = config.backend.clone();
    if let Some(kind) = args.backend {
        backend_config.kind = kind.into();
    }
    let backend = Backend::from_config(&backend_config);

    println!(
        "{}",
        formatter.info(&format!("Probing {} with '{}'", backend.describe(), food))
    );

    let prompt = PromptBuilder::new(food.as_str()).build();
    match backend.generate(&prompt, &config.generation).await {
        Ok(answer) => {
            let outcome = parse_llm_response(&answer, &food);
            println!(
                "{}",
                formatter.success(&format!(
                    "Received {} chars, {} records parsed, {} blocks discarded",
                    answer.chars().count(),
                    outcome.extracted_count,
                    outcome.discarded_blocks
                ))
            );
            Ok(())
        }
        Err(e) => {
            println!("{}", formatter.error(&e.to_string()));
            Err(e.into())
        }
    }
}
