//! # fit-cli
//!
//! Command-line front end for the fit snapshot store.
//!
//! Parses the command line, resolves configuration, sets up logging and the
//! panic hook, then dispatches to a command handler. Errors are printed with
//! their cause chain and mapped onto the process exit code.

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use fit_config::merge::CLI_LOG_LEVEL;
use fit_config::{ConfigLayering, ConfigLoader, FitConfig};
use fit_core::error::{FitError, FitResult};
use std::collections::HashMap;
use std::process::ExitCode;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::CommandContext;
use output::errors::ErrorFormatter;
use output::OutputHandler;

/// Track files and keep snapshots of them in a single store file
#[derive(Parser)]
#[command(name = "fit", version, about = "Single-file snapshot store")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Read configuration from this file instead of searching for fit.toml
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<Utf8PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create an empty store file
    Create {
        /// Store name; the configured extension is appended
        name: Utf8PathBuf,
        /// Extension to append instead of the configured one
        #[arg(long)]
        extension: Option<String>,
    },
    /// Start tracking a file
    Track {
        store: Utf8PathBuf,
        /// Path relative to the directory holding the store
        path: String,
    },
    /// Stop tracking a file
    Untrack { store: Utf8PathBuf, path: String },
    /// Snapshot every tracked file
    Save { store: Utf8PathBuf },
    /// Restore a snapshot (the latest if no index is given)
    Load { store: Utf8PathBuf, index: Option<usize> },
    /// List snapshots and their files
    Snaps { store: Utf8PathBuf },
    /// List tracked files
    Tracklist { store: Utf8PathBuf },
    /// Re-hash all stored content and report mismatches
    Verify { store: Utf8PathBuf },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_panic_handler();

    let output = OutputHandler::new();
    let formatter = ErrorFormatter::new();
    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(err) => {
            setup_logging(&FitConfig::default().log_level);
            return ExitCode::from(report_failure(&output, &formatter, &err));
        },
    };

    setup_logging(&config.log_level);
    debug!(sources = ?config.sources, "Resolved configuration");

    match run_cli(cli, config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            debug!(kind = ?err.kind(), recoverable = err.is_recoverable(), "Command failed");
            ExitCode::from(report_failure(&output, &formatter, &err))
        },
    }
}

/// Print the error to stdout and return its exit code
fn report_failure(output: &OutputHandler, formatter: &ErrorFormatter, err: &FitError) -> u8 {
    output.block(&formatter.format_error(err));
    err.exit_code()
}

fn current_dir() -> FitResult<Utf8PathBuf> {
    let cwd = std::env::current_dir()
        .map_err(|e| FitError::io("Failed to get current directory", e))?;
    Utf8PathBuf::from_path_buf(cwd).map_err(|path| {
        FitError::invalid_path(
            path.to_string_lossy(),
            "the current directory is not valid UTF-8",
        )
    })
}

fn load_config(cli: &Cli) -> FitResult<FitConfig> {
    let mut cli_overrides = HashMap::new();
    if cli.verbose {
        cli_overrides.insert(CLI_LOG_LEVEL.to_string(), "debug".to_string());
    }
    if let Commands::Create {
        extension: Some(extension),
        ..
    } = &cli.command
    {
        cli_overrides.insert(
            fit_config::merge::CLI_EXTENSION.to_string(),
            extension.clone(),
        );
    }

    ConfigLoader::new(current_dir()?).load(
        cli.config.as_deref(),
        ConfigLayering::collect_env_overrides(),
        cli_overrides,
    )
}

fn run_cli(cli: Cli, config: FitConfig) -> FitResult<()> {
    let ctx = CommandContext::new(current_dir()?, config);
    commands::dispatch_command(cli.command, &ctx)
}

/// Turn a configured level into a filter directive.
///
/// A bare level such as `debug` applies to the fit crates only; anything
/// containing `=` or `,` is used as a full directive.
fn filter_directive(level: &str) -> String {
    if level.contains('=') || level.contains(',') {
        level.to_string()
    } else {
        format!(
            "fit={0},fit_core={0},fit_store={0},fit_config={0}",
            level
        )
    }
}

fn setup_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(filter_directive(level)))
        .unwrap_or_else(|_| EnvFilter::new(filter_directive("warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn setup_panic_handler() {
    std::panic::set_hook(Box::new(|panic_info| {
        error!("fit encountered an unexpected error: {}", panic_info);
        println!("fit crashed! This is a bug.");
        println!("Please report this at: https://github.com/fit-vcs/fit/issues");
        println!("Error: {}", panic_info);
    }));
}
