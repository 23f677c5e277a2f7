//! A bounded jitter buffer: a ring of bytes fronted by a BUFFERING/PLAYING/
//! UNDERRUN state machine, drained by a dedicated consumer thread on a fixed
//! cadence.
//!
//! The pure ring/framer/state logic lives in [`jitter_ring`]; this crate
//! wires it to a single mutex, a start/stop/exit control handshake, and the
//! consumer worker thread, and exposes the host-facing lifecycle API.
//!
//! # Example
//!
//! ```
//! use jitter_buffer::JitterBuffer;
//! use jitter_ring::Config;
//! use std::sync::{Arc, Mutex};
//!
//! let received = Arc::new(Mutex::new(Vec::<Vec<u8>>::new()));
//! let received_in_sink = Arc::clone(&received);
//!
//! let config = Config::default()
//!     .with_frame_size(4)
//!     .with_water_marks(1, 1);
//!
//! let buffer = JitterBuffer::create(config, move |frame: &[u8]| {
//!     received_in_sink.lock().unwrap().push(frame.to_vec());
//! })
//! .unwrap();
//!
//! buffer.start().unwrap();
//! buffer.write(&[1, 2, 3, 4]).unwrap();
//! std::thread::sleep(std::time::Duration::from_millis(100));
//! buffer.destroy();
//!
//! assert!(!received.lock().unwrap().is_empty());
//! ```

mod backoff;
mod control;
mod shared;
mod error;
mod lock;
mod metrics;
mod sink;
mod worker;

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use jitter_ring::{Config, Event};

use control::{ControlState, Request};
use shared::Core;
use lock::lock_with_timeout;
use sink::post_event;

pub use error::JitterError;
pub use metrics::Metrics;
pub use sink::{EventSink, OutputSink};
// Re-exported so callers can build a `Config` without depending on
// `jitter-ring` directly, mirroring how the teacher's workspace crates
// re-export their shared core types.
pub use jitter_ring::{ConfigError, Event as BufferEvent, State};

/// How long `start`/`stop`/`destroy` wait for the worker's acknowledgement
/// before giving up and treating the handshake as eventually consistent.
const ACK_TIMEOUT: Duration = Duration::from_millis(500);
/// How long `write` waits to acquire the instance mutex.
const WRITE_LOCK_TIMEOUT: Duration = Duration::from_millis(50);
/// How long `reset` waits to acquire the instance mutex.
const RESET_LOCK_TIMEOUT: Duration = Duration::from_millis(500);

/// A bounded jitter buffer instance.
///
/// Owns the ring bytes, the scratch output buffer (held inside the worker
/// thread), the control handshake, and the worker's `JoinHandle`. The
/// output sink and event sink are borrowed capabilities: invoked, never
/// owned beyond what's needed to call them.
pub struct JitterBuffer {
    core: Arc<Mutex<Core>>,
    control: Arc<ControlState>,
    event_sink: Option<Arc<dyn EventSink>>,
    worker: Option<thread::JoinHandle<()>>,
    config: Config,
}

impl JitterBuffer {
    /// Builds and validates `config`, allocates the ring and scratch
    /// buffers, and spawns the consumer worker parked in its outer wait.
    /// The instance starts in [`State::Idle`].
    pub fn create<S>(config: Config, output_sink: S) -> Result<Self, JitterError>
    where
        S: FnMut(&[u8]) + Send + 'static,
    {
        Self::create_with_event_sink(config, output_sink, None)
    }

    /// Like [`JitterBuffer::create`], additionally posting state transitions
    /// to `event_sink`.
    pub fn create_with_event_sink<S>(
        config: Config,
        output_sink: S,
        event_sink: Option<Arc<dyn EventSink>>,
    ) -> Result<Self, JitterError>
    where
        S: FnMut(&[u8]) + Send + 'static,
    {
        let config = config.build()?;
        let core = Arc::new(Mutex::new(Core::new(&config)));
        let control = Arc::new(ControlState::new());

        let worker_core = Arc::clone(&core);
        let worker_control = Arc::clone(&control);
        let worker_config = config;
        let worker_event_sink = event_sink.clone();
        let output_sink: OutputSink = Box::new(output_sink);

        let worker = thread::Builder::new()
            .name("jitter-buffer-consumer".into())
            .spawn(move || {
                worker::run(worker_core, worker_control, worker_config, worker_event_sink, output_sink);
            })?;

        tracing::info!(
            buffer_size = config.buffer_size,
            frame_size = config.frame_size,
            frame_interval_ms = config.frame_interval_ms,
            high_water = config.high_water,
            low_water = config.low_water,
            with_header = config.with_header,
            "jitter buffer created"
        );

        Ok(Self {
            core,
            control,
            event_sink,
            worker: Some(worker),
            config,
        })
    }

    /// `IDLE -> BUFFERING`, signals the worker to begin its tick cadence,
    /// and waits (bounded) for acknowledgement. Idempotent: calling this
    /// while already running re-acks without disrupting cadence.
    pub fn start(&self) -> Result<(), JitterError> {
        self.transition_and_signal(Request::Start, |state| state.start())
    }

    /// Returns the worker to its outer idle wait. `IDLE`/other state is
    /// unaffected by the wait itself, but the state machine always lands in
    /// `IDLE` per the transition table.
    pub fn stop(&self) -> Result<(), JitterError> {
        self.transition_and_signal(Request::Stop, |state| state.stop())
    }

    fn transition_and_signal(
        &self,
        request: Request,
        apply: impl FnOnce(&mut jitter_ring::StateMachine) -> Option<Event>,
    ) -> Result<(), JitterError> {
        let event = {
            let mut core = lock_with_timeout(&self.core, ACK_TIMEOUT)?;
            apply(&mut core.state)
        };
        if let (Some(sink), Some(event)) = (&self.event_sink, event) {
            post_event(sink.as_ref(), event);
        }
        let acked = self.control.post_and_wait_ack(request, ACK_TIMEOUT);
        if !acked {
            tracing::warn!(?request, "worker acknowledgement timed out; treating as eventually consistent");
        }
        // The handshake is eventually consistent by design: an ACK timeout
        // is still a successful call from the caller's point of view.
        Ok(())
    }

    /// Clears the ring and returns to `BUFFERING`. Lifetime counters
    /// (`total_written`, `total_read`, `overrun_count`, `underrun_count`)
    /// are untouched.
    pub fn reset(&self) -> Result<(), JitterError> {
        let event = {
            let mut core = lock_with_timeout(&self.core, RESET_LOCK_TIMEOUT)?;
            core.ring.reset();
            core.state.reset()
        };
        if let (Some(sink), Some(event)) = (&self.event_sink, event) {
            post_event(sink.as_ref(), event);
        }
        tracing::debug!("jitter buffer reset");
        Ok(())
    }

    /// Enqueues one frame. With `with_header`, `data` is the payload and the
    /// 2-byte length header is added internally; without it, `data` must be
    /// exactly `frame_size` bytes.
    ///
    /// Never blocks the producer on overrun: if free space is insufficient,
    /// whole frames are dropped from the head (a byte-level fallback only
    /// as a last resort for length-prefixed framing) and `overrun_count` is
    /// bumped — `write` still returns `Ok`.
    pub fn write(&self, data: &[u8]) -> Result<(), JitterError> {
        if self.config.with_header {
            if data.len() > self.config.frame_size {
                return Err(JitterError::InvalidArgument(
                    "payload length exceeds configured frame_size",
                ));
            }
        } else if data.len() != self.config.frame_size {
            return Err(JitterError::InvalidArgument(
                "payload length must equal frame_size when with_header is disabled",
            ));
        }

        let event = {
            let mut core = lock_with_timeout(&self.core, WRITE_LOCK_TIMEOUT)?;
            let result = core.framer.write_frame(&mut core.ring, data);
            if result.overran {
                tracing::warn!(
                    alignment_lost = result.alignment_lost,
                    overrun_count = core.ring.overrun_count,
                    "producer overran consumer; dropped frame(s) from the head"
                );
            }
            let frame_count = core.framer.frame_count(&core.ring);
            core.state.apply_producer_check(frame_count)
        };

        if let (Some(sink), Some(event)) = (&self.event_sink, event) {
            post_event(sink.as_ref(), event);
        }
        Ok(())
    }

    /// Returns a snapshot of the lifetime counters.
    pub fn metrics(&self) -> Result<Metrics, JitterError> {
        let core = lock_with_timeout(&self.core, WRITE_LOCK_TIMEOUT)?;
        Ok(Metrics {
            total_written: core.ring.total_written,
            total_read: core.ring.total_read,
            overrun_count: core.ring.overrun_count,
            underrun_count: core.ring.underrun_count,
        })
    }

    /// Returns the current playback state.
    pub fn state(&self) -> Result<State, JitterError> {
        let core = lock_with_timeout(&self.core, WRITE_LOCK_TIMEOUT)?;
        Ok(core.state.current())
    }

    /// Signals EXIT, waits (bounded) for acknowledgement, and joins the
    /// worker thread. Returns regardless of whether the ACK arrived in
    /// time — the worker is never kept alive past `destroy`: on an ACK
    /// timeout the thread is detached rather than joined, since joining
    /// without a bound could block the caller indefinitely.
    pub fn destroy(mut self) {
        self.shutdown_and_join();
    }

    fn shutdown_and_join(&mut self) {
        if self.worker.is_none() {
            return;
        }
        let acked = self.control.post_and_wait_ack(Request::Exit, ACK_TIMEOUT);
        if acked {
            if let Some(handle) = self.worker.take() {
                let _ = handle.join();
            }
        } else {
            tracing::warn!("destroy: EXIT acknowledgement timed out; detaching worker thread");
            self.worker.take();
        }
    }
}

impl Drop for JitterBuffer {
    fn drop(&mut self) {
        self.shutdown_and_join();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;
    use std::time::Duration;

    fn fixed_config() -> Config {
        Config::default()
            .with_frame_size(8)
            .with_frame_interval_ms(5)
            .with_water_marks(2, 4)
    }

    #[test]
    fn pre_roll_then_playing() {
        let frames: Arc<StdMutex<Vec<Vec<u8>>>> = Arc::new(StdMutex::new(Vec::new()));
        let sink_frames = Arc::clone(&frames);
        let config = fixed_config();
        let buffer = JitterBuffer::create(config, move |f: &[u8]| {
            sink_frames.lock().unwrap().push(f.to_vec());
        })
        .unwrap();
        buffer.start().unwrap();

        for _ in 0..3 {
            buffer.write(&[0u8; 8]).unwrap();
        }
        thread::sleep(Duration::from_millis(60));
        assert!(frames.lock().unwrap().is_empty(), "must not emit before high_water");
        assert_eq!(buffer.state().unwrap(), State::Buffering);

        buffer.write(&[0u8; 8]).unwrap(); // 4th frame reaches high_water
        thread::sleep(Duration::from_millis(60));
        assert!(!frames.lock().unwrap().is_empty());

        buffer.destroy();
    }

    #[test]
    fn write_rejects_wrong_length_without_header() {
        let config = fixed_config();
        let buffer = JitterBuffer::create(config, |_f: &[u8]| {}).unwrap();
        let err = buffer.write(&[0u8; 4]).unwrap_err();
        assert!(matches!(err, JitterError::InvalidArgument(_)));
        buffer.destroy();
    }

    #[test]
    fn reset_preserves_lifetime_counters() {
        let config = fixed_config();
        let buffer = JitterBuffer::create(config, |_f: &[u8]| {}).unwrap();
        buffer.write(&[0u8; 8]).unwrap();
        buffer.write(&[0u8; 8]).unwrap();
        let before = buffer.metrics().unwrap();
        buffer.reset().unwrap();
        let after = buffer.metrics().unwrap();
        assert_eq!(before.total_written, after.total_written);
        assert_eq!(before.total_read, after.total_read);
        assert_eq!(buffer.state().unwrap(), State::Buffering);
        buffer.destroy();
    }

    #[test]
    fn idempotent_start_reacks() {
        let config = fixed_config();
        let buffer = JitterBuffer::create(config, |_f: &[u8]| {}).unwrap();
        buffer.start().unwrap();
        buffer.start().unwrap();
        buffer.destroy();
    }

    #[test]
    fn destroy_joins_promptly() {
        let config = fixed_config();
        let buffer = JitterBuffer::create(config, |_f: &[u8]| {}).unwrap();
        buffer.start().unwrap();
        for _ in 0..10 {
            buffer.write(&[0u8; 8]).unwrap();
        }
        let started = std::time::Instant::now();
        buffer.destroy();
        assert!(started.elapsed() < Duration::from_millis(600));
    }

    #[test]
    fn drop_without_explicit_destroy_does_not_leak() {
        let config = fixed_config();
        let buffer = JitterBuffer::create(config, |_f: &[u8]| {}).unwrap();
        buffer.start().unwrap();
        drop(buffer);
    }
}
