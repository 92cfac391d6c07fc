//! Parse free-text model answers into correlation records
//!
//! The expected shape is the one [`crate::PromptBuilder`] asks for: records
//! separated by blank lines, one `Label: value` line per field. Anything that
//! does not fit is counted and dropped, never raised.

use metabolink_domain::{CorrelationRecord, CorrelationType};
use tracing::debug;

/// Signature of the parse step, so the orchestrator can swap it out
pub type ParseFn = fn(&str, &str) -> ParseOutcome;

/// What the parser made of one answer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseOutcome {
    /// Promoted records in answer order
    pub records: Vec<CorrelationRecord>,

    /// Number of promoted records
    pub extracted_count: usize,

    /// Blocks dropped as irrelevant or malformed
    pub discarded_blocks: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Reference,
    Metabolite,
    CorrelationType,
    Finding,
    Quote,
}

const LABELS: &[(&str, Field)] = &[
    ("Reference:", Field::Reference),
    ("Metabolite:", Field::Metabolite),
    ("Correlation Type:", Field::CorrelationType),
    ("Finding Description:", Field::Finding),
    ("Relevant Quote:", Field::Quote),
];

#[derive(Debug, Default)]
struct PartialRecord {
    reference: Option<String>,
    metabolite: Option<String>,
    correlation_type: Option<String>,
    finding: Option<String>,
    quote: Option<String>,
}

impl PartialRecord {
    fn set(&mut self, field: Field, value: String) {
        let slot = match field {
            Field::Reference => &mut self.reference,
            Field::Metabolite => &mut self.metabolite,
            Field::CorrelationType => &mut self.correlation_type,
            Field::Finding => &mut self.finding,
            Field::Quote => &mut self.quote,
        };
        *slot = Some(value);
    }

    fn promote(self) -> Result<CorrelationRecord, String> {
        let reference = self
            .reference
            .filter(|r| !r.is_empty())
            .ok_or_else(|| "missing reference".to_string())?;
        let metabolite = self
            .metabolite
            .filter(|m| !m.is_empty())
            .ok_or_else(|| "missing metabolite".to_string())?;
        let correlation_type: CorrelationType = self
            .correlation_type
            .ok_or_else(|| "missing correlation type".to_string())?
            .parse()?;

        let link = extract_link(&reference);
        let doi = extract_doi(&reference);
        let quote = self.quote.map(|q| strip_quotes(&q).to_string());

        Ok(CorrelationRecord::parsed(
            reference,
            metabolite,
            correlation_type,
            self.finding.unwrap_or_default(),
            quote.unwrap_or_default(),
        )
        .with_locators(link, doi))
    }
}

/// Parse a model answer for `food` into correlation records
///
/// Never fails: an answer with nothing usable yields an empty outcome.
pub fn parse_llm_response(raw: &str, food: &str) -> ParseOutcome {
    let normalized = raw.replace("\r\n", "\n");
    let mut outcome = ParseOutcome::default();

    for (idx, block) in split_blocks(&normalized).iter().enumerate() {
        let text = block.join("\n");
        if !(text.contains("Reference:") && text.contains("Metabolite:")) {
            debug!("{}: block {} has no record labels, skipping", food, idx);
            outcome.discarded_blocks += 1;
            continue;
        }

        match parse_block(block).promote() {
            Ok(record) => outcome.records.push(record),
            Err(reason) => {
                debug!("{}: block {} is malformed: {}", food, idx, reason);
                outcome.discarded_blocks += 1;
            }
        }
    }

    outcome.extracted_count = outcome.records.len();
    outcome
}

/// Group lines into blocks separated by blank lines
fn split_blocks(text: &str) -> Vec<Vec<&str>> {
    let mut blocks = Vec::new();
    let mut current = Vec::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        blocks.push(current);
    }

    blocks
}

fn parse_block(lines: &[&str]) -> PartialRecord {
    let mut record = PartialRecord::default();

    for line in lines {
        let line = strip_list_marker(line.trim());
        // First matching label wins; a repeated label overwrites
        if let Some((field, value)) = LABELS
            .iter()
            .find_map(|(label, field)| line.strip_prefix(label).map(|v| (*field, v)))
        {
            record.set(field, value.trim().to_string());
        }
    }

    record
}

/// Drop a leading bullet or ordinal such as `- `, `* `, `• ` or `3. `
fn strip_list_marker(line: &str) -> &str {
    for marker in ["- ", "* ", "• "] {
        if let Some(rest) = line.strip_prefix(marker) {
            return rest.trim_start();
        }
    }

    let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 {
        if let Some(rest) = line[digits..]
            .strip_prefix(". ")
            .or_else(|| line[digits..].strip_prefix(") "))
        {
            return rest.trim_start();
        }
    }

    line
}

/// Remove one pair of surrounding double quotes
fn strip_quotes(value: &str) -> &str {
    for (open, close) in [('"', '"'), ('\u{201C}', '\u{201D}')] {
        if let Some(inner) = value
            .strip_prefix(open)
            .and_then(|rest| rest.strip_suffix(close))
        {
            return inner.trim();
        }
    }
    value
}

fn trim_token(token: &str) -> &str {
    token.trim_matches(|c: char| matches!(c, '.' | ',' | ';' | '(' | ')' | '[' | ']' | '<' | '>' | '"'))
}

/// First `http(s)://` URL stated in the reference text
fn extract_link(reference: &str) -> Option<String> {
    reference
        .split_whitespace()
        .map(trim_token)
        .find(|token| token.starts_with("https://") || token.starts_with("http://"))
        .map(str::to_string)
}

/// First DOI stated in the reference text, bare or inside a doi.org URL
fn extract_doi(reference: &str) -> Option<String> {
    reference.split_whitespace().map(trim_token).find_map(|token| {
        let lower = token.to_ascii_lowercase();
        let candidate = if let Some(idx) = lower.find("doi.org/") {
            &token[idx + "doi.org/".len()..]
        } else if lower.starts_with("doi:") {
            &token["doi:".len()..]
        } else {
            token
        };
        let candidate = trim_token(candidate);
        (candidate.starts_with("10.") && candidate.contains('/')).then(|| candidate.to_string())
    })
}
