//! Metabolink CLI - Food to blood-metabolite correlation pipeline.

use clap::Parser;
use metabolink_cli::commands;
use metabolink_cli::{Cli, Command, Config, Formatter};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> metabolink_cli::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize tracing (log to stderr, stdout carries command output)
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_ansi(!cli.no_color)
        .init();

    // Load config, falling back to defaults when no file exists
    let config_path = Config::resolve_path(cli.config.as_deref())?;
    let config = Config::load(&config_path)?;

    let formatter = Formatter::new(!cli.no_color);

    match cli.command {
        Command::Run(args) => commands::execute_run(args, &config, &formatter).await?,
        Command::Prompts(args) => commands::execute_prompts(args, &config, &formatter).await?,
        Command::Probe(args) => commands::execute_probe(args, &config, &formatter).await?,
        Command::Recount(args) => commands::execute_recount(args, &formatter).await?,
        Command::Config(args) => {
            commands::execute_config(args, &config, &config_path, &formatter).await?
        }
    }

    Ok(())
}
