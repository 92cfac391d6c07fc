//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use metabolink_llm::BackendKind;
use std::path::PathBuf;

/// Metabolink - Collect food/blood-metabolite correlations for expert review.
#[derive(Debug, Parser)]
#[command(name = "metabolink")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path (default: ~/.metabolink/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Backend options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum BackendArg {
    /// In-process model
    Embedded,
    /// Local Ollama-compatible HTTP service
    Http,
    /// External executable
    Process,
}

impl From<BackendArg> for BackendKind {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Embedded => BackendKind::Embedded,
            BackendArg::Http => BackendKind::Http,
            BackendArg::Process => BackendKind::Process,
        }
    }
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the correlation pipeline over a food list
    Run(RunArgs),

    /// Export prompts without calling a backend
    Prompts(PromptsArgs),

    /// Send one prompt to the backend and report what came back
    Probe(ProbeArgs),

    /// Rewrite a result file with freshly derived metadata
    Recount(RecountArgs),

    /// Manage the configuration file
    Config(ConfigArgs),
}

/// Arguments for the run command.
#[derive(Debug, Parser)]
pub struct RunArgs {
    /// Food list (comma or newline separated)
    #[arg(short, long)]
    pub foods: PathBuf,

    /// Result file (overrides output.path)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Process at most this many foods
    #[arg(long)]
    pub max_foods: Option<usize>,

    /// Backend to use (overrides backend.kind)
    #[arg(short, long, value_enum, env = "METABOLINK_BACKEND")]
    pub backend: Option<BackendArg>,

    /// Minimum parsed records before fallback kicks in
    #[arg(long)]
    pub min_correlations: Option<usize>,

    /// Seconds to wait between foods
    #[arg(long)]
    pub delay: Option<u64>,
}

/// Arguments for the prompts command.
#[derive(Debug, Parser)]
pub struct PromptsArgs {
    /// Food list (comma or newline separated)
    #[arg(short, long)]
    pub foods: PathBuf,

    /// Prompt file (overrides output.prompts_path)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the probe command.
#[derive(Debug, Parser)]
pub struct ProbeArgs {
    /// Food list; the first food is probed (default: broccoli)
    #[arg(short, long)]
    pub foods: Option<PathBuf>,

    /// Backend to use (overrides backend.kind)
    #[arg(short, long, value_enum, env = "METABOLINK_BACKEND")]
    pub backend: Option<BackendArg>,
}

/// Arguments for the recount command.
#[derive(Debug, Parser)]
pub struct RecountArgs {
    /// Result file to repair in place
    #[arg(short, long)]
    pub input: PathBuf,
}

/// Arguments for the config command.
#[derive(Debug, Parser)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,

    /// Write the default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_arguments() {
        let cli = Cli::try_parse_from([
            "metabolink",
            "run",
            "--foods",
            "foods.txt",
            "--max-foods",
            "5",
            "--backend",
            "process",
            "--min-correlations",
            "10",
            "--delay",
            "0",
        ])
        .unwrap();

        match cli.command {
            Command::Run(args) => {
                assert_eq!(args.foods, PathBuf::from("foods.txt"));
                assert_eq!(args.max_foods, Some(5));
                assert_eq!(args.backend, Some(BackendArg::Process));
                assert_eq!(args.min_correlations, Some(10));
                assert_eq!(args.delay, Some(0));
                assert!(args.output.is_none());
            }
            other => panic!("Expected run, got {:?}", other),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "metabolink",
            "recount",
            "--input",
            "out.json",
            "-v",
            "--no-color",
            "--config",
            "custom.toml",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert!(cli.no_color);
        assert_eq!(cli.config, Some(PathBuf::from("custom.toml")));
    }

    #[test]
    fn test_run_requires_foods() {
        assert!(Cli::try_parse_from(["metabolink", "run"]).is_err());
    }

    #[test]
    fn test_unknown_backend_rejected() {
        let result = Cli::try_parse_from(["metabolink", "probe", "--backend", "cloud"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_config_init_force() {
        let cli = Cli::try_parse_from(["metabolink", "config", "init", "--force"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Config(ConfigArgs {
                action: ConfigAction::Init { force: true }
            })
        ));
    }

    #[test]
    fn test_backend_arg_maps_to_kind() {
        assert_eq!(BackendKind::from(BackendArg::Http), BackendKind::Http);
        assert_eq!(BackendKind::from(BackendArg::Embedded), BackendKind::Embedded);
    }
}
