//! Core types for the reduction strategies
//!
//! Strategy selection, the run result, and the error taxonomy shared by the
//! message-passing and shared-accumulator paths.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

// ═══════════════════════════════════════════════════════════════════════════
// Strategy selection
// ═══════════════════════════════════════════════════════════════════════════

/// How partial results are combined into the total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Workers send partials over a channel; the caller drains exactly N messages.
    #[default]
    Pipe,
    /// Workers add partials into one mutex-guarded accumulator; the caller joins all.
    Shm,
}

impl Strategy {
    /// Every recognised selector, in display order.
    pub const ALL: [Strategy; 2] = [Strategy::Pipe, Strategy::Shm];

    /// The selector string accepted on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Pipe => "pipe",
            Strategy::Shm => "shm",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = StrategyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pipe" => Ok(Strategy::Pipe),
            "shm" => Ok(Strategy::Shm),
            other => Err(StrategyParseError {
                value: other.to_string(),
            }),
        }
    }
}

/// Unrecognised strategy selector.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(
    "Invalid IPC method '{value}'. Please use 'shm' for shared memory or 'pipe' for pipes."
)]
pub struct StrategyParseError {
    pub value: String,
}

// ═══════════════════════════════════════════════════════════════════════════
// Run output
// ═══════════════════════════════════════════════════════════════════════════

/// Result of a completed reduction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reduction {
    pub strategy: Strategy,
    pub workers: usize,
    pub elements: usize,
    pub total: f64,
    #[serde(rename = "elapsed_ms", serialize_with = "serialize_millis")]
    pub elapsed: Duration,
}

fn serialize_millis<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(d.as_secs_f64() * 1000.0)
}

// ═══════════════════════════════════════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════════════════════════════════════

/// Failures raised while workers are running.
///
/// None of these are retried; a run either produces a total or fails.
#[derive(Debug, thiserror::Error)]
pub enum ReduceError {
    #[error("Worker {worker} panicked before contributing its partial sum")]
    WorkerPanicked { worker: usize },

    #[error("Result channel closed after {received} of {expected} partial sums")]
    WorkerLost { received: usize, expected: usize },

    #[error("Failed to spawn worker {worker}: {source}")]
    Spawn {
        worker: usize,
        source: std::io::Error,
    },
}

/// Result type for reduction operations.
pub type ReduceResult<T> = Result<T, ReduceError>;
