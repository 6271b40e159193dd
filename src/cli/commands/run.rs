//! Run command.
//!
//! Validates the strategy selector and worker count, loads the numbers, and
//! hands the dataset to the reducer. Every configuration or input problem is
//! reported before any worker starts.

use std::path::PathBuf;
use thiserror::Error;

use crate::config::Settings;
use crate::io::{ExitCode, OutputFormat, render_reduction};
use crate::loader::{self, LoadError, MIN_INPUT_LEN};
use crate::reduce::{MAX_WORKERS, ReduceError, Reducer, Reduction, Strategy, StrategyParseError};

/// Arguments for the run command.
#[derive(Debug, Clone)]
pub struct RunArgs {
    pub file: PathBuf,
    /// Raw worker count; `None` falls back to `workers.count`
    pub workers: Option<String>,
    /// Raw strategy selector; `None` falls back to `reduce.strategy`
    pub strategy: Option<String>,
    pub format: OutputFormat,
}

#[derive(Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    Strategy(#[from] StrategyParseError),

    #[error(
        "The number of workers must be a positive integer within the range of 1 to {max} (got '{0}').",
        max = MAX_WORKERS
    )]
    InvalidWorkers(String),

    #[error("The file must contain at least {min} numbers (found {0}).", min = MIN_INPUT_LEN)]
    TooFewNumbers(usize),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Reduce(#[from] ReduceError),

    #[error("Failed to render output: {0}")]
    Output(#[from] serde_json::Error),
}

impl RunError {
    pub fn exit_code(&self) -> ExitCode {
        match self {
            RunError::Strategy(_) | RunError::InvalidWorkers(_) | RunError::TooFewNumbers(_) => {
                ExitCode::ConfigError
            }
            RunError::Load(e) => ExitCode::from(e),
            RunError::Reduce(e) => ExitCode::from(e),
            RunError::Output(_) => ExitCode::GeneralError,
        }
    }
}

/// Selector from the command line, else the configured default.
pub fn resolve_strategy(arg: Option<&str>, settings: &Settings) -> Result<Strategy, RunError> {
    match arg {
        Some(raw) => Ok(raw.parse()?),
        None => Ok(settings.reduce.strategy),
    }
}

/// Worker count from the command line, else the configured default.
///
/// Either source must lie in `1..=MAX_WORKERS`.
pub fn resolve_workers(arg: Option<&str>, settings: &Settings) -> Result<usize, RunError> {
    let count = match arg {
        Some(raw) => raw
            .trim()
            .parse::<i64>()
            .ok()
            .filter(|&n| n > 0)
            .and_then(|n| usize::try_from(n).ok())
            .ok_or_else(|| RunError::InvalidWorkers(raw.to_string()))?,
        None => settings.workers.count,
    };

    if count == 0 || count > MAX_WORKERS {
        return Err(RunError::InvalidWorkers(count.to_string()));
    }
    Ok(count)
}

/// Lower `workers` to half the input length when configured to.
///
/// Returns the count to use and whether it changed.
pub fn clamp_workers(workers: usize, elements: usize, settings: &Settings) -> (usize, bool) {
    let limit = (elements / 2).max(1);
    if settings.workers.clamp_to_half_input && workers > limit {
        (limit, true)
    } else {
        (workers, false)
    }
}

/// Validate, load and reduce.
pub fn execute(args: &RunArgs, settings: &Settings) -> Result<Reduction, RunError> {
    let strategy = resolve_strategy(args.strategy.as_deref(), settings)?;
    let workers = resolve_workers(args.workers.as_deref(), settings)?;

    let numbers = loader::load_numbers(&args.file)?;
    if numbers.len() < MIN_INPUT_LEN {
        return Err(RunError::TooFewNumbers(numbers.len()));
    }

    let (workers, clamped) = clamp_workers(workers, numbers.len(), settings);
    if clamped {
        tracing::warn!(target: "cli", "worker count clamped to {workers} for {} numbers", numbers.len());
        eprintln!(
            "Warning: Number of workers adjusted to {workers} to match input size constraints."
        );
    }

    let reducer = Reducer::with_settings(settings);
    Ok(reducer.run(strategy, &numbers, workers)?)
}

/// Run the command and print the result.
pub fn run(args: RunArgs, settings: &Settings) -> ExitCode {
    let result = execute(&args, settings)
        .and_then(|reduction| render_reduction(&reduction, args.format).map_err(RunError::from));

    match result {
        Ok(output) => {
            println!("{output}");
            ExitCode::Success
        }
        Err(e) => {
            tracing::error!(target: "cli", "run failed: {e}");
            eprintln!("Error: {e}");
            e.exit_code()
        }
    }
}
