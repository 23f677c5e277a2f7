//! Ring buffer, framer, and state machine core for a jitter buffer.
//!
//! This crate has no threads and no callbacks — it is the pure data
//! structure and transition logic that `jitter-buffer` wires up to a mutex,
//! a worker thread, and a pair of sink traits. Keeping it free of runtime
//! concerns is what makes the frame-alignment and hysteresis invariants
//! property-testable in isolation.
//!
//! # Example
//!
//! ```
//! use jitter_ring::{Config, Framer, Ring, StateMachine};
//!
//! let config = Config::default().with_header(true).build().unwrap();
//! let mut ring = Ring::new(config.buffer_size);
//! let framer = Framer::from_config(&config);
//! let mut state = StateMachine::new(&config);
//!
//! state.start();
//! framer.write_frame(&mut ring, b"hello");
//! assert_eq!(framer.frame_count(&ring), 1);
//! ```

mod config;
mod error;
mod framer;
mod invariants;
mod ring;
mod state;

pub use config::{
    Config, DEFAULT_BUFFER_SIZE, DEFAULT_FRAME_INTERVAL_MS, DEFAULT_FRAME_SIZE, DEFAULT_HIGH_WATER,
    DEFAULT_LOW_WATER,
};
pub use error::ConfigError;
pub use framer::{FrameWrite, Framer};
pub use ring::Ring;
pub use state::{Event, State, StateMachine};
