//! CLI argument parsing using clap.
//!
//! Contains the Cli struct and the Commands enum.

use clap::{
    Parser, Subcommand,
    builder::styling::{AnsiColor, Effects, Styles},
};
use std::path::PathBuf;

use crate::cli::commands::run::RunArgs;
use crate::io::OutputFormat;

fn clap_cargo_style() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .usage(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Green.on_default())
}

/// Parallel sum of squares
#[derive(Parser, Debug)]
#[command(
    name = "partsum",
    version = env!("CARGO_PKG_VERSION"),
    about = "Parallel sum of squares over a file of numbers",
    long_about = "Partition a file of numbers across worker threads, compute partial sums of \
                  squares, and combine them by message passing (pipe) or a locked shared \
                  accumulator (shm).",
    next_line_help = true,
    styles = clap_cargo_style()
)]
pub struct Cli {
    /// Path to custom settings.toml file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize project
    #[command(about = "Set up .partsum directory with default configuration")]
    Init {
        /// Force overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Compute the sum of squares of every number in a file
    #[command(
        about = "Compute the sum of squares with N workers",
        after_help = "Examples:\n  partsum run numbers.txt 4 pipe\n  partsum run numbers.txt 8 shm --json"
    )]
    Run {
        /// Whitespace-separated real numbers
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Number of workers (overrides config)
        #[arg(value_name = "WORKERS", allow_negative_numbers = true)]
        workers: Option<String>,

        /// Aggregation strategy: 'pipe' or 'shm' (overrides config)
        #[arg(value_name = "STRATEGY")]
        strategy: Option<String>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Display active settings
    #[command(about = "Display active settings")]
    Config,
}

impl Commands {
    /// Convert a `run` invocation into command arguments.
    pub fn into_run_args(self) -> Option<RunArgs> {
        match self {
            Commands::Run {
                file,
                workers,
                strategy,
                json,
            } => Some(RunArgs {
                file,
                workers,
                strategy,
                format: OutputFormat::from_json_flag(json),
            }),
            _ => None,
        }
    }
}
