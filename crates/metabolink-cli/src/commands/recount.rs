//! Recount command implementation.

use crate::cli::RecountArgs;
use crate::error::Result;
use crate::output::Formatter;
use metabolink_extractor::ResultStore;

/// Execute the recount command.
///
/// Loading re-derives the metadata block from content; saving writes it back.
pub async fn execute_recount(args: RecountArgs, formatter: &Formatter) -> Result<()> {
    let result = ResultStore::load(&args.input)?;
    ResultStore::save(&args.input, &result)?;

    println!("{}", formatter.metadata(&result.metadata()));
    println!(
        "{}",
        formatter.success(&format!("Metadata rewritten in {}", args.input.display()))
    );
    Ok(())
}
