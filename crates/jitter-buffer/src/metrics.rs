//! Point-in-time snapshot of the instance's lifetime counters.

/// A snapshot of the ring's lifetime counters, taken under the instance
/// mutex. Grounded on the ring crate's own `Metrics` — a plain `Copy`
/// struct of counters, no aggregation logic of its own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Metrics {
    pub total_written: u64,
    pub total_read: u64,
    pub overrun_count: u64,
    pub underrun_count: u64,
}
