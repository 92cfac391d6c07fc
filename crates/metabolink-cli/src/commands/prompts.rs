//! Prompts command implementation.

use crate::cli::PromptsArgs;
use crate::config::Config;
use crate::error::Result;
use crate::input::load_foods;
use crate::output::Formatter;
use metabolink_extractor::ResultStore;

/// Execute the prompts command.
pub async fn execute_prompts(
    args: PromptsArgs,
    config: &Config,
    formatter: &Formatter,
) -> Result<()> {
    let foods = load_foods(&args.foods)?;
    let output = args
        .output
        .unwrap_or_else(|| config.output.prompts_path.clone());

    let export = ResultStore::save_prompts(&output, &foods)?;
    println!(
        "{}",
        formatter.success(&format!(
            "Saved {} prompts to {}",
            export.total_foods,
            output.display()
        ))
    );
    Ok(())
}
