//! Pipeline tests for the batch orchestrator

#[cfg(test)]
mod tests {
    use crate::{
        parse_llm_response, BatchOrchestrator, ParseOutcome, PipelineConfig, PromptBuilder,
        ResultStore,
    };
    use metabolink_domain::{Degradation, GenerationOptions, LlmProvider, Provenance};
    use metabolink_llm::{Backend, EmbeddedModel, LlmError, MockProvider, TextBackend};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::{Duration, Instant};
    use tempfile::TempDir;

    const BROCCOLI_ANSWER: &str = r#"Here are the blood-based studies I found for broccoli.

Reference: Fahey JW, et al. (2019). Sulforaphane Bioavailability from Glucoraphanin-Rich Broccoli. PLoS One. https://doi.org/10.1371/journal.pone.0209600
Metabolite: Sulforaphane
Correlation Type: Positive
Finding Description: Increased plasma sulforaphane levels after broccoli consumption
Relevant Quote: "Broccoli consumption led to a 2.5-fold increase in plasma sulforaphane levels"

Reference: Riso P, et al. (2017). Effect of Broccoli Consumption on Markers of Oxidative Stress. European Journal of Nutrition
Metabolite: Malondialdehyde
Correlation Type: Negative
Finding Description: Reduced oxidative stress markers in blood after broccoli consumption
Relevant Quote: "Plasma malondialdehyde levels decreased by 23% following broccoli consumption"
"#;

    fn config(min: usize) -> PipelineConfig {
        PipelineConfig {
            min_correlations_per_food: min,
            inter_call_delay_secs: 0,
            retry_attempts: 1,
            max_foods: None,
            generation: GenerationOptions::default(),
        }
    }

    fn embedded(provider: MockProvider) -> Arc<Backend> {
        Arc::new(Backend::Embedded(EmbeddedModel::new(provider)))
    }

    fn broccoli_provider() -> MockProvider {
        let mut provider = MockProvider::new(BROCCOLI_ANSWER);
        provider.add_response(PromptBuilder::new("broccoli").build(), BROCCOLI_ANSWER);
        provider
    }

    /// Fails a fixed number of times before answering
    struct FlakyBackend {
        failures: usize,
        error: LlmError,
        calls: AtomicUsize,
    }

    impl FlakyBackend {
        fn new(failures: usize, error: LlmError) -> Self {
            Self {
                failures,
                error,
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl TextBackend for FlakyBackend {
        async fn generate(
            &self,
            _prompt: &str,
            _options: &GenerationOptions,
        ) -> Result<String, LlmError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                Err(self.error.clone())
            } else {
                Ok(BROCCOLI_ANSWER.to_string())
            }
        }
    }

    /// Panics instead of answering for one food
    struct PanickyBackend {
        food: &'static str,
    }

    impl TextBackend for PanickyBackend {
        async fn generate(
            &self,
            prompt: &str,
            _options: &GenerationOptions,
        ) -> Result<String, LlmError> {
            if prompt == PromptBuilder::new(self.food).build() {
                panic!("adapter blew up");
            }
            Ok(BROCCOLI_ANSWER.to_string())
        }
    }

    /// In-process model that outlives short timeouts and records overlap
    struct SlowModel {
        delay: Duration,
        active: Arc<AtomicUsize>,
        peak: Arc<AtomicUsize>,
    }

    impl LlmProvider for SlowModel {
        type Error = LlmError;

        fn generate(&self, _prompt: &str, _options: &GenerationOptions) -> Result<String, LlmError> {
            let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            std::thread::sleep(self.delay);
            self.active.fetch_sub(1, Ordering::SeqCst);
            Ok(BROCCOLI_ANSWER.to_string())
        }
    }

    fn panics_on_kale(raw: &str, food: &str) -> ParseOutcome {
        if food == "kale" {
            panic!("corrupt block for {}", food);
        }
        parse_llm_response(raw, food)
    }

    #[tokio::test]
    async fn test_broccoli_parsed_records_are_kept() {
        let orchestrator = BatchOrchestrator::new(embedded(broccoli_provider()), config(2));
        let run = orchestrator.run(["broccoli"]).await;

        let food = &run.result.foods()[0];
        assert_eq!(food.id, 0);
        assert_eq!(food.name, "broccoli");
        assert_eq!(food.provenance, Provenance::Parsed);
        assert_eq!(food.extracted_count, 2);
        assert_eq!(food.correlations.len(), 2);
        assert!(food.degradation.is_none());
        assert_eq!(food.prompt, PromptBuilder::new("broccoli").build());
        assert_eq!(
            food.correlations[0].doi.as_deref(),
            Some("10.1371/journal.pone.0209600")
        );
        assert_eq!(run.summary.parsed_foods, 1);
        assert!(run.summary.is_success());
    }

    #[tokio::test]
    async fn test_too_few_parsed_records_are_replaced() {
        let orchestrator = BatchOrchestrator::new(embedded(broccoli_provider()), config(15));
        let run = orchestrator.run(["broccoli"]).await;

        let food = &run.result.foods()[0];
        assert_eq!(food.provenance, Provenance::Fallback);
        assert_eq!(food.correlations.len(), 15);
        assert_eq!(food.extracted_count, 2);
        assert_eq!(
            food.degradation,
            Some(Degradation::InsufficientExtraction {
                extracted: 2,
                required: 15
            })
        );
        assert!(food
            .correlations
            .iter()
            .all(|r| r.provenance == Provenance::Fallback));
    }

    #[tokio::test]
    async fn test_kale_backend_unavailable_uses_fallback() {
        let mut provider = MockProvider::new(BROCCOLI_ANSWER);
        provider.add_error(PromptBuilder::new("kale").build());
        let mut cfg = config(15);
        cfg.retry_attempts = 3;

        let orchestrator = BatchOrchestrator::new(embedded(provider.clone()), cfg);
        let run = orchestrator.run(["kale"]).await;

        let food = &run.result.foods()[0];
        assert_eq!(food.correlations.len(), 15);
        assert_eq!(food.provenance, Provenance::Fallback);
        assert_eq!(food.extracted_count, 0);
        assert!(matches!(
            food.degradation,
            Some(Degradation::BackendFailure { .. })
        ));
        // Unavailability is not worth retrying
        assert_eq!(provider.call_count(), 1);
        assert_eq!(run.summary.fallback_foods, 1);
        assert!(run.summary.is_success());
    }

    #[tokio::test]
    async fn test_mid_parse_fault_is_contained() {
        let orchestrator = BatchOrchestrator::new(embedded(broccoli_provider()), config(2))
            .with_parser(panics_on_kale);
        let run = orchestrator.run(["broccoli", "kale", "spinach"]).await;

        let names: Vec<_> = run.result.foods().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["broccoli", "kale", "spinach"]);

        let kale = &run.result.foods()[1];
        assert_eq!(kale.provenance, Provenance::Fallback);
        assert_eq!(kale.correlations.len(), 2);
        match &kale.degradation {
            Some(Degradation::ProcessingFailure { detail }) => {
                assert!(detail.contains("corrupt block for kale"))
            }
            other => panic!("Expected ProcessingFailure, got {:?}", other),
        }

        assert_eq!(run.result.foods()[0].provenance, Provenance::Parsed);
        assert_eq!(run.result.foods()[2].provenance, Provenance::Parsed);
        assert_eq!(run.summary.foods_processed, 3);
        assert_eq!(run.summary.fallback_foods, 1);
        assert_eq!(run.summary.parsed_foods, 2);
    }

    #[tokio::test]
    async fn test_backend_panic_is_contained() {
        let backend = Arc::new(PanickyBackend { food: "kale" });
        let run = BatchOrchestrator::new(backend, config(2))
            .run(["broccoli", "kale", "spinach"])
            .await;

        assert_eq!(run.result.len(), 3);
        let kale = &run.result.foods()[1];
        assert_eq!(kale.name, "kale");
        assert_eq!(kale.provenance, Provenance::Fallback);
        assert_eq!(kale.correlations.len(), 2);
        assert_eq!(kale.extracted_count, 0);
        match &kale.degradation {
            Some(Degradation::ProcessingFailure { detail }) => {
                assert_eq!(detail, "backend panicked: adapter blew up")
            }
            other => panic!("Expected ProcessingFailure, got {:?}", other),
        }
        assert_eq!(run.result.foods()[0].provenance, Provenance::Parsed);
        assert_eq!(run.result.foods()[2].provenance, Provenance::Parsed);
    }

    #[tokio::test]
    async fn test_retry_after_timeout_never_overlaps_model_calls() {
        let peak = Arc::new(AtomicUsize::new(0));
        let backend = Arc::new(Backend::Embedded(EmbeddedModel::new(SlowModel {
            delay: Duration::from_secs(2),
            active: Arc::new(AtomicUsize::new(0)),
            peak: Arc::clone(&peak),
        })));
        let mut cfg = config(2);
        cfg.retry_attempts = 2;
        cfg.generation.timeout_secs = 1;

        let run = BatchOrchestrator::new(backend, cfg).run(["broccoli"]).await;

        let food = &run.result.foods()[0];
        assert_eq!(food.provenance, Provenance::Fallback);
        assert_eq!(
            food.degradation,
            Some(Degradation::BackendFailure {
                detail: LlmError::Timeout(1).to_string()
            })
        );
        assert_eq!(peak.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_batch_invariants() {
        let mut provider = MockProvider::new("Sorry, I could not find anything about this food in blood studies, so no records follow here.");
        provider.add_response(PromptBuilder::new("broccoli").build(), BROCCOLI_ANSWER);
        provider.add_error(PromptBuilder::new("kale").build());
        let min = 3;

        let orchestrator = BatchOrchestrator::new(embedded(provider), config(min));
        let foods = ["tomatoes", "broccoli", "kale", "blueberries"];
        let run = orchestrator.run(foods).await;

        assert_eq!(run.result.len(), foods.len());
        for (idx, food) in run.result.foods().iter().enumerate() {
            assert_eq!(food.id, idx);
            assert_eq!(food.name, foods[idx]);
            assert!(food.correlations.len() >= min, "{} is short", food.name);
            assert!(food.has_uniform_provenance(), "{} mixes provenance", food.name);
        }
        assert_eq!(
            run.result.metadata().total_correlations,
            run.result
                .foods()
                .iter()
                .map(|f| f.correlations.len())
                .sum::<usize>()
        );
    }

    #[tokio::test]
    async fn test_metadata_follows_mutation() {
        let orchestrator = BatchOrchestrator::new(embedded(broccoli_provider()), config(2));
        let mut run = orchestrator.run(["broccoli", "kale"]).await;
        let before = run.result.metadata().total_correlations;

        if let Some(food) = run.result.food_mut(0) {
            food.correlations.pop();
        }
        assert_eq!(run.result.metadata().total_correlations, before - 1);
    }

    #[tokio::test]
    async fn test_fallback_is_deterministic_across_runs() {
        let provider = MockProvider::new("too short");
        let first = BatchOrchestrator::new(embedded(provider.clone()), config(15))
            .run(["lentils"])
            .await;
        let second = BatchOrchestrator::new(embedded(provider), config(15))
            .run(["lentils"])
            .await;
        assert_eq!(
            first.result.foods()[0].correlations,
            second.result.foods()[0].correlations
        );
        assert!(matches!(
            first.result.foods()[0].degradation,
            Some(Degradation::BackendFailure { ref detail }) if detail.contains("Empty response")
        ));
    }

    #[tokio::test]
    async fn test_transient_failure_is_retried() {
        let backend = Arc::new(FlakyBackend::new(1, LlmError::Timeout(300)));
        let mut cfg = config(2);
        cfg.retry_attempts = 2;

        let run = BatchOrchestrator::new(Arc::clone(&backend), cfg)
            .run(["broccoli"])
            .await;
        assert_eq!(backend.calls(), 2);
        assert_eq!(run.result.foods()[0].provenance, Provenance::Parsed);
    }

    #[tokio::test]
    async fn test_single_attempt_does_not_retry() {
        let backend = Arc::new(FlakyBackend::new(1, LlmError::Timeout(300)));
        let run = BatchOrchestrator::new(Arc::clone(&backend), config(2))
            .run(["broccoli"])
            .await;
        assert_eq!(backend.calls(), 1);
        assert_eq!(run.result.foods()[0].provenance, Provenance::Fallback);
    }

    #[tokio::test]
    async fn test_names_are_normalized() {
        let orchestrator = BatchOrchestrator::new(embedded(broccoli_provider()), config(2));
        let run = orchestrator
            .run(vec!["  broccoli ", "", "broccoli", "kale", "   "])
            .await;

        let names: Vec<_> = run.result.foods().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["broccoli", "kale"]);
        assert_eq!(run.summary.skipped_inputs, 3);
    }

    #[tokio::test]
    async fn test_max_foods_cap() {
        let mut cfg = config(2);
        cfg.max_foods = Some(2);
        let orchestrator = BatchOrchestrator::new(embedded(broccoli_provider()), cfg);
        let run = orchestrator.run(["a", "b", "c", "d"]).await;
        assert_eq!(run.result.len(), 2);
        assert_eq!(run.result.foods()[1].name, "b");
    }

    #[tokio::test]
    async fn test_stop_flag_checked_before_each_food() {
        let provider = broccoli_provider();
        let orchestrator = BatchOrchestrator::new(embedded(provider.clone()), config(2));
        orchestrator
            .stop_handle()
            .store(true, std::sync::atomic::Ordering::SeqCst);

        let run = orchestrator.run(["broccoli", "kale"]).await;
        assert!(run.result.is_empty());
        assert_eq!(provider.call_count(), 0);
        assert!(!run.summary.is_success());
    }

    #[tokio::test]
    async fn test_delay_only_between_foods() {
        let mut cfg = config(2);
        cfg.inter_call_delay_secs = 1;

        let orchestrator = BatchOrchestrator::new(embedded(broccoli_provider()), cfg.clone());
        let start = Instant::now();
        orchestrator.run(["broccoli"]).await;
        assert!(start.elapsed() < Duration::from_secs(1));

        let orchestrator = BatchOrchestrator::new(embedded(broccoli_provider()), cfg);
        let start = Instant::now();
        orchestrator.run(["broccoli", "kale"]).await;
        assert!(start.elapsed() >= Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_run_result_persists() {
        let orchestrator = BatchOrchestrator::new(embedded(broccoli_provider()), config(2));
        let run = orchestrator.run(["broccoli", "kale"]).await;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("expert_interface_data.json");
        ResultStore::save(&path, &run.result).unwrap();

        let loaded = ResultStore::load(&path).unwrap();
        assert_eq!(loaded.metadata(), run.result.metadata());
        assert_eq!(loaded.foods()[1].name, "kale");
    }
}
