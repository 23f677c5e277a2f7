//! Error types for jitter buffer operations.

use jitter_ring::ConfigError;
use thiserror::Error;

/// Errors surfaced to callers of the jitter buffer's control/data API.
///
/// Overrun and malformed-frame conditions are deliberately *not* modeled
/// here — they are recovered locally (drop + counter bump + log) because
/// the contract is best-effort smoothing that never blocks the producer.
/// `write` still returns `Ok` when an overrun occurred.
#[derive(Debug, Error)]
pub enum JitterError {
    /// The supplied configuration was invalid.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// An argument was invalid for reasons outside of `Config` (e.g. a
    /// `write` payload whose length doesn't match the framing policy).
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// Acquiring the instance mutex (or waiting for a worker
    /// acknowledgement, where the caller explicitly surfaces that) exceeded
    /// its bound.
    #[error("operation timed out")]
    Timeout,

    /// The consumer worker thread could not be spawned at construction
    /// time. Any ring/scratch allocation made before this point is simply
    /// dropped as `create` returns `Err` — Rust's destructors give us the
    /// "unwind all earlier allocations" behavior spec.md asks for, for
    /// free.
    #[error("failed to spawn consumer worker thread: {0}")]
    WorkerSpawn(#[from] std::io::Error),
}
