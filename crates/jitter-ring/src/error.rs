//! Error types for ring/framer/state construction.

use thiserror::Error;

/// Errors raised while validating a [`crate::config::Config`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// `frame_interval` was zero; the consumer loop cannot schedule on a
    /// zero-length tick.
    #[error("frame_interval must be greater than zero")]
    ZeroFrameInterval,

    /// `frame_size` was zero; both framer variants need a positive frame
    /// length (fixed length, or payload cap).
    #[error("frame_size must be greater than zero")]
    ZeroFrameSize,

    /// `buffer_size` was zero; there is nowhere to store a frame.
    #[error("buffer_size must be greater than zero")]
    ZeroBufferSize,

    /// `low_water` exceeded `high_water`, which would remove the hysteresis
    /// the state machine relies on to avoid flapping between PLAYING and
    /// UNDERRUN.
    #[error("low_water ({low}) must not exceed high_water ({high})")]
    WaterMarkOrder { low: usize, high: usize },
}
