//! Reduction configuration
//!
//! Controls result-channel sizing and per-worker tracing.
//! Reads from Settings (.partsum/settings.toml).

use crate::Settings;

/// Runtime knobs shared by both strategies.
#[derive(Debug, Clone, Default)]
pub struct ReduceConfig {
    /// Capacity of the result channel. `None` means unbounded, so workers
    /// never block on send.
    pub channel_capacity: Option<usize>,

    /// Log range, partial and duration for every worker at debug level
    pub worker_tracing: bool,
}

impl ReduceConfig {
    /// Create config from Settings.
    ///
    /// Reads from .partsum/settings.toml:
    /// - `reduce.channel_capacity` -> channel_capacity (0 means unbounded)
    /// - `reduce.worker_tracing` -> worker_tracing
    pub fn from_settings(settings: &Settings) -> Self {
        let reduce = &settings.reduce;

        Self {
            channel_capacity: (reduce.channel_capacity > 0).then_some(reduce.channel_capacity),
            worker_tracing: reduce.worker_tracing,
        }
    }

    /// Use a bounded result channel
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = Some(capacity.max(1));
        self
    }

    pub fn with_worker_tracing(mut self, enabled: bool) -> Self {
        self.worker_tracing = enabled;
        self
    }
}
