//! Run command implementation.

use crate::cli::RunArgs;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::input::load_foods;
use crate::output::Formatter;
use metabolink_extractor::{BatchOrchestrator, ResultStore};
use metabolink_llm::Backend;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

/// Execute the run command.
pub async fn execute_run(args: RunArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let foods = load_foods(&args.foods)?;

    let mut backend_config = config.backend.clone();
    if let Some(kind) = args.backend {
        backend_config.kind = kind.into();
    }

    let mut pipeline = config.pipeline_config();
    if let Some(max) = args.max_foods {
        pipeline.max_foods = Some(max);
    }
    if let Some(min) = args.min_correlations {
        pipeline.min_correlations_per_food = min;
    }
    if let Some(delay) = args.delay {
        pipeline.inter_call_delay_secs = delay;
    }
    pipeline.validate()?;

    let backend = Backend::from_config(&backend_config);
    info!("Using {} backend ({})", backend.kind(), backend.describe());

    let orchestrator = BatchOrchestrator::new(Arc::new(backend), pipeline);

    // Ctrl-C stops the batch before the next food; the current one finishes
    let stop = orchestrator.stop_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, finishing current food");
            stop.store(true, Ordering::SeqCst);
        }
    });

    let run = orchestrator.run(&foods).await;

    let output = args.output.unwrap_or_else(|| config.output.path.clone());
    ResultStore::save(&output, &run.result)?;

    println!("{}", formatter.foods_table(&run.result));
    println!("{}", formatter.run_summary(&run.summary));

    if !run.summary.is_success() {
        return Err(CliError::NothingProcessed);
    }

    println!(
        "{}",
        formatter.success(&format!("Results saved to {}", output.display()))
    );
    Ok(())
}
