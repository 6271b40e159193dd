//! Partition planning
//!
//! Splits `M` elements into `N` contiguous, non-overlapping index ranges.
//! The first `M mod N` workers receive one extra element; when `N > M` the
//! trailing ranges are empty.

use std::ops::Range;

/// Largest worker count accepted from the command line or settings.
///
/// Every worker is an OS thread and owns one range in the plan.
pub const MAX_WORKERS: usize = 4096;

/// Ordered set of half-open index ranges, one per worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionPlan {
    ranges: Vec<Range<usize>>,
    total_len: usize,
}

impl PartitionPlan {
    /// Plan `total_len` elements across `workers` ranges.
    ///
    /// Sizes follow the base-plus-remainder rule: `base = M / N`, and worker `i`
    /// gets `base + 1` when `i < M % N`, otherwise `base`. Ranges are the prefix
    /// sums of those sizes.
    pub fn new(total_len: usize, workers: usize) -> Self {
        debug_assert!(workers >= 1, "partition plan needs at least one worker");
        let workers = workers.max(1);

        let base = total_len / workers;
        let remainder = total_len % workers;

        let mut ranges = Vec::with_capacity(workers);
        let mut start = 0;
        for i in 0..workers {
            let size = if i < remainder { base + 1 } else { base };
            ranges.push(start..start + size);
            start += size;
        }

        Self { ranges, total_len }
    }

    /// All ranges in worker order.
    pub fn ranges(&self) -> &[Range<usize>] {
        &self.ranges
    }

    /// Range assigned to worker `index`.
    pub fn range(&self, index: usize) -> Option<Range<usize>> {
        self.ranges.get(index).cloned()
    }

    /// Number of workers (ranges), including empty ones.
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Number of elements the plan covers.
    pub fn total_len(&self) -> usize {
        self.total_len
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = &Range<usize>> {
        self.ranges.iter()
    }

    /// Borrow each worker's sub-slice of `data`.
    ///
    /// `data` must have exactly [`total_len`](Self::total_len) elements.
    pub fn slices<'a, T>(&'a self, data: &'a [T]) -> impl ExactSizeIterator<Item = &'a [T]> + 'a {
        debug_assert_eq!(data.len(), self.total_len);
        self.ranges.iter().map(move |range| &data[range.clone()])
    }
}
