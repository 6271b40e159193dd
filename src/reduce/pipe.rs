//! Message-passing aggregation
//!
//! One worker per range sends its partial sum over a crossbeam channel. The
//! caller receives exactly `N` messages and adds them in arrival order; receiving
//! `N` values is itself proof that every worker finished.
//!
//! The caller drops its own sender before draining, so a worker that dies before
//! sending shows up as a disconnected channel once the others are done
//! ([`ReduceError::WorkerLost`]). A worker that never terminates still stalls the
//! run; there is no cancellation.

use super::config::ReduceConfig;
use super::kernel::{compute_partial, sum_of_squares};
use super::partition::PartitionPlan;
use super::types::{ReduceError, ReduceResult};
use crossbeam_channel::{Receiver, bounded, unbounded};
use std::thread;

/// Sum of squares over `data` using the message-passing strategy.
pub fn run_pipe(data: &[f64], plan: &PartitionPlan) -> ReduceResult<f64> {
    run_pipe_with(data, plan, &ReduceConfig::default())
}

/// [`run_pipe`] with explicit channel sizing and tracing.
pub fn run_pipe_with(data: &[f64], plan: &PartitionPlan, config: &ReduceConfig) -> ReduceResult<f64> {
    run_pipe_kernel(data, plan, config, &sum_of_squares)
}

pub(crate) fn run_pipe_kernel<K>(
    data: &[f64],
    plan: &PartitionPlan,
    config: &ReduceConfig,
    kernel: &K,
) -> ReduceResult<f64>
where
    K: Fn(&[f64]) -> f64 + Sync + ?Sized,
{
    let expected = plan.len();
    let trace = config.worker_tracing;

    thread::scope(|scope| -> ReduceResult<f64> {
        // Created inside the scope so an early return drops the receiver and
        // unblocks any worker waiting on a full bounded channel.
        let (tx, rx) = match config.channel_capacity {
            Some(capacity) => bounded(capacity),
            None => unbounded(),
        };

        let mut handles = Vec::with_capacity(expected);
        for (worker, range) in plan.iter().cloned().enumerate() {
            let tx = tx.clone();
            let handle = thread::Builder::new()
                .name(format!("partsum-pipe-{worker}"))
                .spawn_scoped(scope, move || {
                    let partial = compute_partial(worker, range, data, kernel, trace);
                    // Err only if the receiver is gone, i.e. the run already failed.
                    let _ = tx.send(partial);
                })
                .map_err(|source| ReduceError::Spawn { worker, source })?;
            handles.push(handle);
        }
        drop(tx);

        let collected = drain(&rx, expected);
        drop(rx);

        let mut panicked = None;
        for (worker, handle) in handles.into_iter().enumerate() {
            if handle.join().is_err() && panicked.is_none() {
                panicked = Some(worker);
            }
        }

        match (collected, panicked) {
            (Ok(total), _) => Ok(total),
            (Err(_), Some(worker)) => Err(ReduceError::WorkerPanicked { worker }),
            (Err(e), None) => Err(e),
        }
    })
}

/// Perform exactly `expected` blocking receives, summing in arrival order.
fn drain(rx: &Receiver<f64>, expected: usize) -> ReduceResult<f64> {
    let mut total = 0.0;
    for received in 0..expected {
        match rx.recv() {
            Ok(partial) => total += partial,
            Err(_) => {
                tracing::warn!(
                    target: "reduce",
                    "[pipe] channel disconnected after {received}/{expected} partial sums"
                );
                return Err(ReduceError::WorkerLost { received, expected });
            }
        }
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipe_concrete_scenario() {
        let data = [1.0, 2.0, 3.0, 4.0, 5.0];
        let plan = PartitionPlan::new(data.len(), 2);
        assert_eq!(run_pipe(&data, &plan).unwrap(), 55.0);
    }

    #[test]
    fn test_pipe_more_workers_than_elements() {
        let data = [2.0, 2.0];
        let plan = PartitionPlan::new(data.len(), 4);
        assert_eq!(run_pipe(&data, &plan).unwrap(), 8.0);
    }

    #[test]
    fn test_pipe_single_worker_is_exact() {
        let data = [0.1, 0.7];
        let plan = PartitionPlan::new(data.len(), 1);
        assert_eq!(run_pipe(&data, &plan).unwrap(), 0.1 * 0.1 + 0.7 * 0.7);
    }

    #[test]
    fn test_pipe_bounded_channel_smaller_than_worker_count() {
        let data: Vec<f64> = (1..=100).map(f64::from).collect();
        let plan = PartitionPlan::new(data.len(), 16);
        let config = ReduceConfig::default().with_channel_capacity(1);
        let total = run_pipe_with(&data, &plan, &config).unwrap();
        assert_eq!(total, 338_350.0);
    }

    #[test]
    fn test_pipe_reports_panicking_worker_instead_of_hanging() {
        let data = [1.0, 2.0, 3.0, 4.0];
        let plan = PartitionPlan::new(data.len(), 4);
        let kernel = |slice: &[f64]| {
            if slice == [3.0].as_slice() {
                panic!("simulated worker crash");
            }
            sum_of_squares(slice)
        };

        let err = run_pipe_kernel(&data, &plan, &ReduceConfig::default(), &kernel).unwrap_err();
        assert!(matches!(err, ReduceError::WorkerPanicked { worker: 2 }));
    }

    #[test]
    fn test_drain_detects_missing_messages() {
        let (tx, rx) = unbounded();
        tx.send(1.0).unwrap();
        drop(tx);

        let err = drain(&rx, 3).unwrap_err();
        assert!(matches!(
            err,
            ReduceError::WorkerLost {
                received: 1,
                expected: 3
            }
        ));
    }
}
