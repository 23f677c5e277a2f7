//! Configuration for the ring/framer/state core.
//!
//! Grounded on the teacher's `Config` (plain `Copy` value type, validated at
//! construction rather than scattered across call sites).

use crate::error::ConfigError;

/// Reference default buffer size (11 KiB).
pub const DEFAULT_BUFFER_SIZE: usize = 11 * 1024;
/// Reference default frame size (fixed length, or payload cap when
/// `with_header` is set).
pub const DEFAULT_FRAME_SIZE: usize = 512;
/// Reference default consumer tick interval.
pub const DEFAULT_FRAME_INTERVAL_MS: u64 = 20;
/// Reference default pre-roll threshold, in frames.
pub const DEFAULT_HIGH_WATER: usize = 20;
/// Reference default underrun threshold, in frames.
pub const DEFAULT_LOW_WATER: usize = 10;

/// Immutable configuration for a jitter buffer's ring, framer, and state
/// machine. Copied into the instance at construction; the instance never
/// mutates it afterward.
#[derive(Debug, Clone, Copy)]
pub struct Config {
    /// Ring capacity in bytes.
    pub buffer_size: usize,
    /// Fixed frame length (`with_header == false`), or the maximum accepted
    /// payload length (`with_header == true`).
    pub frame_size: usize,
    /// Consumer tick period, in milliseconds.
    pub frame_interval_ms: u64,
    /// Frame count at/above which BUFFERING/UNDERRUN promotes to PLAYING.
    pub high_water: usize,
    /// Frame count below which PLAYING demotes to UNDERRUN.
    pub low_water: usize,
    /// Whether frames are length-prefixed (`true`) or fixed-length (`false`).
    pub with_header: bool,
    /// Whether the consumer emits a zeroed frame instead of nothing when it
    /// is not PLAYING.
    pub output_silence_on_empty: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
            frame_size: DEFAULT_FRAME_SIZE,
            frame_interval_ms: DEFAULT_FRAME_INTERVAL_MS,
            high_water: DEFAULT_HIGH_WATER,
            low_water: DEFAULT_LOW_WATER,
            with_header: false,
            output_silence_on_empty: false,
        }
    }
}

impl Config {
    /// Validates the configuration, silently raising `buffer_size` when
    /// `with_header` needs more room than configured to hold `high_water`
    /// frames worth of pre-roll.
    ///
    /// The upward adjustment is intentional and logged, not an error: the
    /// source this was distilled from adjusts silently, and behavioral
    /// compatibility with that is preserved here.
    pub fn build(mut self) -> Result<Self, ConfigError> {
        if self.frame_interval_ms == 0 {
            return Err(ConfigError::ZeroFrameInterval);
        }
        if self.frame_size == 0 {
            return Err(ConfigError::ZeroFrameSize);
        }
        if self.buffer_size == 0 {
            return Err(ConfigError::ZeroBufferSize);
        }
        if self.low_water > self.high_water {
            return Err(ConfigError::WaterMarkOrder {
                low: self.low_water,
                high: self.high_water,
            });
        }
        if self.with_header {
            let required = self.high_water.saturating_mul(2 + self.frame_size);
            if self.buffer_size < required {
                tracing::warn!(
                    configured_buffer_size = self.buffer_size,
                    required_buffer_size = required,
                    high_water = self.high_water,
                    frame_size = self.frame_size,
                    "buffer_size too small to hold high_water frames with headers; raising silently"
                );
                self.buffer_size = required;
            }
        }
        Ok(self)
    }

    /// Builder: set `buffer_size`.
    #[must_use]
    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    /// Builder: set `frame_size`.
    #[must_use]
    pub fn with_frame_size(mut self, frame_size: usize) -> Self {
        self.frame_size = frame_size;
        self
    }

    /// Builder: set `frame_interval_ms`.
    #[must_use]
    pub fn with_frame_interval_ms(mut self, frame_interval_ms: u64) -> Self {
        self.frame_interval_ms = frame_interval_ms;
        self
    }

    /// Builder: set `high_water`/`low_water` together (the common case — the
    /// two only make sense relative to each other).
    #[must_use]
    pub fn with_water_marks(mut self, low_water: usize, high_water: usize) -> Self {
        self.low_water = low_water;
        self.high_water = high_water;
        self
    }

    /// Builder: enable length-prefixed framing.
    #[must_use]
    pub fn with_header(mut self, with_header: bool) -> Self {
        self.with_header = with_header;
        self
    }

    /// Builder: enable silence-fill when not PLAYING.
    #[must_use]
    pub fn with_silence_on_empty(mut self, output_silence_on_empty: bool) -> Self {
        self.output_silence_on_empty = output_silence_on_empty;
        self
    }
}
