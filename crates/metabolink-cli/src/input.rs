//! Food list loading.

use crate::error::{CliError, Result};
use std::fs;
use std::path::Path;

/// Read a food list file.
///
/// Entries are separated by commas or newlines; blanks are dropped.
pub fn load_foods(path: &Path) -> Result<Vec<String>> {
    let contents = fs::read_to_string(path).map_err(|e| {
        CliError::InvalidInput(format!("Cannot read food list {}: {}", path.display(), e))
    })?;

    let foods = parse_foods(&contents);
    if foods.is_empty() {
        return Err(CliError::InvalidInput(format!(
            "No foods found in {}",
            path.display()
        )));
    }
    Ok(foods)
}

/// Split food list text into trimmed, non-empty names.
pub fn parse_foods(contents: &str) -> Vec<String> {
    contents
        .split([',', '\n'])
        .map(str::trim)
        .filter(|food| !food.is_empty())
        .map(str::to_string)
        .collect()
}
