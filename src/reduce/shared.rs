//! Shared-accumulator aggregation
//!
//! Every worker folds its range outside the lock, then adds the partial into a
//! single `Mutex<f64>`. The caller joins all workers before reading the final
//! value. The lock only covers the read-modify-write of the accumulator; the
//! guard is released on every exit path and `parking_lot` locks never poison,
//! so a failed worker cannot block the rest.

use super::config::ReduceConfig;
use super::kernel::{compute_partial, sum_of_squares};
use super::partition::PartitionPlan;
use super::types::{ReduceError, ReduceResult};
use parking_lot::Mutex;
use std::thread;

/// Sum of squares over `data` using the shared-accumulator strategy.
pub fn run_shared(data: &[f64], plan: &PartitionPlan) -> ReduceResult<f64> {
    run_shared_with(data, plan, &ReduceConfig::default())
}

/// [`run_shared`] with explicit tracing configuration.
pub fn run_shared_with(
    data: &[f64],
    plan: &PartitionPlan,
    config: &ReduceConfig,
) -> ReduceResult<f64> {
    run_shared_kernel(data, plan, config, &sum_of_squares)
}

pub(crate) fn run_shared_kernel<K>(
    data: &[f64],
    plan: &PartitionPlan,
    config: &ReduceConfig,
    kernel: &K,
) -> ReduceResult<f64>
where
    K: Fn(&[f64]) -> f64 + Sync + ?Sized,
{
    let accumulator = Mutex::new(0.0_f64);
    let trace = config.worker_tracing;

    thread::scope(|scope| -> ReduceResult<()> {
        let accumulator = &accumulator;

        let mut handles = Vec::with_capacity(plan.len());
        for (worker, range) in plan.iter().cloned().enumerate() {
            let handle = thread::Builder::new()
                .name(format!("partsum-shm-{worker}"))
                .spawn_scoped(scope, move || {
                    let partial = compute_partial(worker, range, data, kernel, trace);
                    *accumulator.lock() += partial;
                })
                .map_err(|source| ReduceError::Spawn { worker, source })?;
            handles.push(handle);
        }

        // Join every worker before reporting the first failure.
        let mut panicked = None;
        for (worker, handle) in handles.into_iter().enumerate() {
            if handle.join().is_err() && panicked.is_none() {
                panicked = Some(worker);
            }
        }

        match panicked {
            Some(worker) => Err(ReduceError::WorkerPanicked { worker }),
            None => Ok(()),
        }
    })?;

    Ok(accumulator.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_shared_concrete_scenario() {
        let data = [1.0, 2.0, 3.0, 4.0, 5.0];
        let plan = PartitionPlan::new(data.len(), 2);
        assert_eq!(run_shared(&data, &plan).unwrap(), 55.0);
    }

    #[test]
    fn test_shared_more_workers_than_elements() {
        let data = [2.0, 2.0];
        let plan = PartitionPlan::new(data.len(), 4);
        assert_eq!(run_shared(&data, &plan).unwrap(), 8.0);
    }

    #[test]
    fn test_shared_single_worker_is_exact() {
        let data = [0.1, 0.7];
        let plan = PartitionPlan::new(data.len(), 1);
        assert_eq!(run_shared(&data, &plan).unwrap(), 0.1 * 0.1 + 0.7 * 0.7);
    }

    #[test]
    fn test_shared_failed_worker_does_not_block_others() {
        let data = [1.0, 2.0, 3.0, 4.0];
        let plan = PartitionPlan::new(data.len(), 4);
        let completed = AtomicUsize::new(0);
        let kernel = |slice: &[f64]| {
            if slice == [1.0].as_slice() {
                panic!("simulated worker crash");
            }
            completed.fetch_add(1, Ordering::SeqCst);
            sum_of_squares(slice)
        };

        let err =
            run_shared_kernel(&data, &plan, &ReduceConfig::default(), &kernel).unwrap_err();
        assert!(matches!(err, ReduceError::WorkerPanicked { worker: 0 }));
        assert_eq!(completed.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_shared_many_workers_contend_on_lock() {
        let data = vec![1.0; 10_000];
        let plan = PartitionPlan::new(data.len(), 64);
        let config = ReduceConfig::default().with_worker_tracing(true);
        assert_eq!(run_shared_with(&data, &plan, &config).unwrap(), 10_000.0);
    }
}
