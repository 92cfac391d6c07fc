//! Sequential batch driver
//!
//! Walks the food list one entry at a time: prompt, backend call, parse, and
//! fallback when the parse comes up short. Whatever happens to one food ends
//! up as a [`FoodEntry`], a panic in the backend or the parser included;
//! nothing short of the caller's stop flag ends the batch early.

use crate::config::PipelineConfig;
use crate::fallback::FallbackSynthesizer;
use crate::parser::{parse_llm_response, ParseFn, ParseOutcome};
use crate::prompt::PromptBuilder;
use futures::FutureExt;
use metabolink_domain::{BatchResult, Degradation, FoodEntry};
use metabolink_llm::{LlmError, TextBackend};
use std::any::Any;
use std::collections::HashSet;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Lifecycle of a single food
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FoodState {
    /// Not started
    Pending,
    /// Waiting on the backend
    Generating,
    /// Parsing the backend answer
    Parsing,
    /// Enough records were parsed
    Sufficient,
    /// Fallback records are needed
    Insufficient,
    /// Entry built
    Finalized,
}

impl fmt::Display for FoodState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FoodState::Pending => "pending",
            FoodState::Generating => "generating",
            FoodState::Parsing => "parsing",
            FoodState::Sufficient => "sufficient",
            FoodState::Insufficient => "insufficient",
            FoodState::Finalized => "finalized",
        };
        f.write_str(name)
    }
}

/// Counts reported after a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Foods that produced an entry
    pub foods_processed: usize,
    /// Records across all entries
    pub total_correlations: usize,
    /// Entries built from fallback records
    pub fallback_foods: usize,
    /// Entries built from parsed records
    pub parsed_foods: usize,
    /// Input names dropped as empty or duplicate
    pub skipped_inputs: usize,
}

impl RunSummary {
    fn from_result(result: &BatchResult, skipped_inputs: usize) -> Self {
        let metadata = result.metadata();
        Self {
            foods_processed: metadata.total_foods,
            total_correlations: metadata.total_correlations,
            fallback_foods: metadata.fallback_foods,
            parsed_foods: metadata.parsed_foods,
            skipped_inputs,
        }
    }

    /// Whether at least one food ended with records, parsed or synthesized
    pub fn is_success(&self) -> bool {
        self.foods_processed > 0 && self.total_correlations > 0
    }
}

/// Output of [`BatchOrchestrator::run`]
#[derive(Debug, Clone)]
pub struct BatchRun {
    /// The aggregate to persist
    pub result: BatchResult,
    /// Counts for the caller's report
    pub summary: RunSummary,
}

/// Drives prompt, generation, parsing and fallback for every food
pub struct BatchOrchestrator<B> {
    backend: Arc<B>,
    config: PipelineConfig,
    synthesizer: FallbackSynthesizer,
    parser: ParseFn,
    stop: Arc<AtomicBool>,
}

impl<B: TextBackend> BatchOrchestrator<B> {
    /// Create an orchestrator over `backend`
    pub fn new(backend: Arc<B>, config: PipelineConfig) -> Self {
        Self {
            backend,
            config,
            synthesizer: FallbackSynthesizer::default(),
            parser: parse_llm_response,
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Use a different fallback synthesizer
    pub fn with_synthesizer(mut self, synthesizer: FallbackSynthesizer) -> Self {
        self.synthesizer = synthesizer;
        self
    }

    /// Replace the parse step
    pub fn with_parser(mut self, parser: ParseFn) -> Self {
        self.parser = parser;
        self
    }

    /// Flag that stops the run before the next food once set
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    /// Active configuration
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Process `foods` in order and return the aggregate
    pub async fn run<I, S>(&self, foods: I) -> BatchRun
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let (mut names, skipped_inputs) = normalize_names(foods);
        if let Some(max) = self.config.max_foods {
            if names.len() > max {
                info!("Limiting run to the first {} of {} foods", max, names.len());
                names.truncate(max);
            }
        }

        info!("Processing {} foods", names.len());
        let mut result = BatchResult::new();

        for (idx, name) in names.iter().enumerate() {
            if self.stop.load(Ordering::SeqCst) {
                info!("Stop requested, ending batch after {} foods", idx);
                break;
            }
            if idx > 0 && self.config.inter_call_delay_secs > 0 {
                tokio::time::sleep(self.config.inter_call_delay()).await;
            }

            info!("[{}/{}] {}", idx + 1, names.len(), name);
            let entry = self.process_food(name).await;
            result.push(entry);
        }

        let summary = RunSummary::from_result(&result, skipped_inputs);
        info!(
            "Batch complete: {} foods, {} correlations, {} using fallback data",
            summary.foods_processed, summary.total_correlations, summary.fallback_foods
        );

        BatchRun { result, summary }
    }

    /// Produce the entry for one food; never fails
    pub async fn process_food(&self, name: &str) -> FoodEntry {
        let prompt = PromptBuilder::new(name).build();
        let min = self.config.min_correlations_per_food;
        transition(name, FoodState::Pending, FoodState::Generating);

        let generated = AssertUnwindSafe(self.generate_with_retry(name, &prompt))
            .catch_unwind()
            .await;
        let raw = match generated {
            Ok(Ok(raw)) => raw,
            Ok(Err(e)) => {
                transition(name, FoodState::Generating, FoodState::Insufficient);
                let degradation = Degradation::BackendFailure {
                    detail: e.to_string(),
                };
                return self.fallback_entry(name, prompt, 0, degradation);
            }
            Err(panic) => {
                transition(name, FoodState::Generating, FoodState::Insufficient);
                let degradation = Degradation::ProcessingFailure {
                    detail: panic_message("backend", panic.as_ref()),
                };
                return self.fallback_entry(name, prompt, 0, degradation);
            }
        };

        transition(name, FoodState::Generating, FoodState::Parsing);
        let parser = self.parser;
        let parsed = catch_unwind(AssertUnwindSafe(|| parser(&raw, name)));

        match parsed {
            Ok(ParseOutcome {
                records,
                extracted_count,
                discarded_blocks,
            }) if extracted_count >= min => {
                transition(name, FoodState::Parsing, FoodState::Sufficient);
                info!(
                    "{}: {} records parsed ({} blocks discarded)",
                    name, extracted_count, discarded_blocks
                );
                transition(name, FoodState::Sufficient, FoodState::Finalized);
                FoodEntry::parsed(name, prompt, records)
            }
            Ok(outcome) => {
                transition(name, FoodState::Parsing, FoodState::Insufficient);
                let degradation = Degradation::InsufficientExtraction {
                    extracted: outcome.extracted_count,
                    required: min,
                };
                self.fallback_entry(name, prompt, outcome.extracted_count, degradation)
            }
            Err(panic) => {
                transition(name, FoodState::Parsing, FoodState::Insufficient);
                let degradation = Degradation::ProcessingFailure {
                    detail: panic_message("parser", panic.as_ref()),
                };
                self.fallback_entry(name, prompt, 0, degradation)
            }
        }
    }

    /// Call the backend, retrying transient failures with exponential backoff
    async fn generate_with_retry(&self, name: &str, prompt: &str) -> Result<String, LlmError> {
        let attempts = self.config.retry_attempts.max(1);
        let mut attempt = 1;

        loop {
            match self.backend.generate(prompt, &self.config.generation).await {
                Ok(raw) => return Ok(raw),
                Err(e) if e.is_transient() && attempt < attempts => {
                    let backoff = Duration::from_secs(1u64 << (attempt - 1).min(6));
                    warn!(
                        "{}: attempt {}/{} failed ({}), retrying in {}s",
                        name,
                        attempt,
                        attempts,
                        e,
                        backoff.as_secs()
                    );
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn fallback_entry(
        &self,
        name: &str,
        prompt: String,
        extracted_count: usize,
        degradation: Degradation,
    ) -> FoodEntry {
        let records = self
            .synthesizer
            .synthesize(name, self.config.min_correlations_per_food);
        warn!(
            "{}: using {} fallback records ({})",
            name,
            records.len(),
            degradation
        );
        transition(name, FoodState::Insufficient, FoodState::Finalized);
        FoodEntry::fallback(name, prompt, records, extracted_count, degradation)
    }
}

fn transition(name: &str, from: FoodState, to: FoodState) {
    debug!("{}: {} -> {}", name, from, to);
}

/// Trim names, drop empties and repeats; returns the names and the drop count
fn normalize_names<I, S>(foods: I) -> (Vec<String>, usize)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut names = Vec::new();
    let mut skipped = 0;

    for food in foods {
        let name = food.as_ref().trim();
        if name.is_empty() {
            skipped += 1;
            continue;
        }
        if !seen.insert(name.to_string()) {
            warn!("Skipping duplicate food '{}'", name);
            skipped += 1;
            continue;
        }
        names.push(name.to_string());
    }

    (names, skipped)
}

fn panic_message(stage: &str, panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        format!("{} panicked: {}", stage, message)
    } else if let Some(message) = panic.downcast_ref::<String>() {
        format!("{} panicked: {}", stage, message)
    } else {
        format!("{} panicked", stage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_names() {
        let (names, skipped) =
            normalize_names(vec![" broccoli ", "", "kale", "broccoli", "   ", "Kale"]);
        assert_eq!(names, vec!["broccoli", "kale", "Kale"]);
        assert_eq!(skipped, 3);
    }

    #[test]
    fn test_panic_message() {
        let boxed: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message("parser", boxed.as_ref()), "parser panicked: boom");
        let boxed: Box<dyn Any + Send> = Box::new(String::from("bad block"));
        assert_eq!(
            panic_message("parser", boxed.as_ref()),
            "parser panicked: bad block"
        );
        let boxed: Box<dyn Any + Send> = Box::new(7_u8);
        assert_eq!(panic_message("backend", boxed.as_ref()), "backend panicked");
    }

    #[test]
    fn test_summary_success_needs_records() {
        let mut summary = RunSummary::default();
        assert!(!summary.is_success());
        summary.foods_processed = 2;
        assert!(!summary.is_success());
        summary.total_correlations = 3;
        assert!(summary.is_success());
    }

    #[test]
    fn test_state_display() {
        assert_eq!(FoodState::Insufficient.to_string(), "insufficient");
    }
}
