//! Partitioned parallel reduction
//!
//! Splits a dataset into contiguous ranges, computes one partial sum of squares
//! per worker thread, and combines the partials with one of two strategies.
//!
//! ## Architecture
//!
//! ```text
//!            PLAN              WORKERS (N threads)         COMBINE
//! [0, M) ──► ranges ──┬──► partial₀ ──┐
//!                     ├──► partial₁ ──┼──► pipe: N channel receives
//!                     └──► partialₙ ──┘    shm:  Mutex<f64> + join all
//! ```
//!
//! - **PLAN**: [`PartitionPlan`] gives the first `M mod N` workers one extra element.
//! - **WORKERS**: scoped threads borrow their slice of the read-only dataset.
//! - **COMBINE**: [`run_pipe`] or [`run_shared`]; both return the same total up to
//!   floating-point rounding.
//!
//! ## Usage
//!
//! ```
//! use partsum::reduce::{Reducer, ReduceConfig, Strategy};
//!
//! let reducer = Reducer::new(ReduceConfig::default());
//! let reduction = reducer.run(Strategy::Pipe, &[1.0, 2.0, 3.0, 4.0, 5.0], 2).unwrap();
//! assert_eq!(reduction.total, 55.0);
//! ```

pub mod config;
pub mod kernel;
pub mod partition;
pub mod pipe;
pub mod shared;
pub mod types;

pub use config::ReduceConfig;
pub use kernel::sum_of_squares;
pub use partition::{MAX_WORKERS, PartitionPlan};
pub use pipe::{run_pipe, run_pipe_with};
pub use shared::{run_shared, run_shared_with};
pub use types::{ReduceError, ReduceResult, Reduction, Strategy, StrategyParseError};

use crate::Settings;
use std::time::Instant;

/// Runs one reduction per call with a fixed configuration.
///
/// Holds no state between runs; every channel, lock and thread is scoped to
/// [`run`](Self::run).
#[derive(Debug, Clone, Default)]
pub struct Reducer {
    config: ReduceConfig,
}

impl Reducer {
    pub fn new(config: ReduceConfig) -> Self {
        Self { config }
    }

    /// Create a reducer with configuration derived from settings.
    pub fn with_settings(settings: &Settings) -> Self {
        Self::new(ReduceConfig::from_settings(settings))
    }

    pub fn config(&self) -> &ReduceConfig {
        &self.config
    }

    /// Plan `data` across `workers` threads and combine with `strategy`.
    ///
    /// `workers` must be at least one; inputs are validated by the caller.
    pub fn run(&self, strategy: Strategy, data: &[f64], workers: usize) -> ReduceResult<Reduction> {
        let start = Instant::now();
        let plan = PartitionPlan::new(data.len(), workers);

        tracing::debug!(
            target: "reduce",
            "[{strategy}] planned {} elements across {} workers",
            plan.total_len(),
            plan.len()
        );

        let total = match strategy {
            Strategy::Pipe => run_pipe_with(data, &plan, &self.config)?,
            Strategy::Shm => run_shared_with(data, &plan, &self.config)?,
        };

        let reduction = Reduction {
            strategy,
            workers: plan.len(),
            elements: plan.total_len(),
            total,
            elapsed: start.elapsed(),
        };

        tracing::info!(
            target: "reduce",
            "[{strategy}] reduced {} elements with {} workers: total={} in {:?}",
            reduction.elements,
            reduction.workers,
            reduction.total,
            reduction.elapsed
        );

        Ok(reduction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference(data: &[f64]) -> f64 {
        data.iter().map(|x| x * x).sum()
    }

    fn assert_close(actual: f64, expected: f64) {
        let tolerance = 1e-9 * expected.abs().max(1.0);
        assert!(
            (actual - expected).abs() <= tolerance,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_reducer_creation() {
        let settings = Settings::default();
        let reducer = Reducer::with_settings(&settings);
        assert!(reducer.config().channel_capacity.is_none());
    }

    #[test]
    fn test_reducer_reports_run_shape() {
        let reducer = Reducer::default();
        let reduction = reducer.run(Strategy::Shm, &[2.0, 2.0], 4).unwrap();

        assert_eq!(reduction.strategy, Strategy::Shm);
        assert_eq!(reduction.workers, 4);
        assert_eq!(reduction.elements, 2);
        assert_eq!(reduction.total, 8.0);
    }

    #[test]
    fn test_strategies_agree_with_reference() {
        let data: Vec<f64> = (0..5_000).map(|i| (i as f64 * 0.37).sin() * 1e3).collect();
        let expected = reference(&data);
        let reducer = Reducer::default();

        for workers in [1, 2, 3, 7, 16, 64] {
            for strategy in Strategy::ALL {
                let reduction = reducer.run(strategy, &data, workers).unwrap();
                assert_close(reduction.total, expected);
            }
        }
    }

    #[test]
    fn test_repeated_runs_are_stable() {
        let data: Vec<f64> = (1..=1_000).map(|i| 1.0 / i as f64).collect();
        let reducer = Reducer::default();
        let first = reducer.run(Strategy::Pipe, &data, 8).unwrap().total;

        for _ in 0..20 {
            for strategy in Strategy::ALL {
                assert_close(reducer.run(strategy, &data, 8).unwrap().total, first);
            }
        }
    }
}
