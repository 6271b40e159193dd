//! Per-worker computation.

use std::ops::Range;
use std::time::Instant;

/// Sum of squares over one partition, folded in slice order.
pub fn sum_of_squares(values: &[f64]) -> f64 {
    values.iter().fold(0.0, |acc, &x| acc + x * x)
}

/// Run `kernel` over worker `worker`'s slice of `data`.
///
/// Emits a debug line with the range, partial and duration when `trace` is set.
pub(crate) fn compute_partial<K>(
    worker: usize,
    range: Range<usize>,
    data: &[f64],
    kernel: &K,
    trace: bool,
) -> f64
where
    K: Fn(&[f64]) -> f64 + ?Sized,
{
    let start = Instant::now();
    let partial = kernel(&data[range.clone()]);

    if trace {
        tracing::debug!(
            target: "reduce",
            "[worker {worker}] range={}..{} partial={partial} in {:?}",
            range.start,
            range.end,
            start.elapsed()
        );
    }

    partial
}
