//! The consumer worker thread body.
//!
//! One long-lived `std::thread`, parked on the outer START/EXIT wait until
//! started, then ticking on an absolute-deadline schedule so a slow sink on
//! one tick never drags the long-run rate away from `frame_interval`.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use jitter_ring::Config;

use crate::control::{ControlState, Request};
use crate::shared::Core;
use crate::lock::lock_with_timeout;
use crate::sink::{post_event, EventSink, OutputSink};

/// Bound on how long a single tick waits to acquire the instance mutex.
/// Chosen to match the write/read acquisition bound in spec.md §5 — the
/// worker is just another caller of the same single lock.
const TICK_LOCK_TIMEOUT: Duration = Duration::from_millis(50);

pub(crate) fn run(
    core: Arc<Mutex<Core>>,
    control: Arc<ControlState>,
    config: Config,
    event_sink: Option<Arc<dyn EventSink>>,
    mut output_sink: OutputSink,
) {
    let interval = Duration::from_millis(config.frame_interval_ms);
    let mut scratch = vec![0u8; config.frame_size];
    let mut seen_generation = 0u64;

    loop {
        match control.wait_for_request(&mut seen_generation) {
            Request::Start => {
                control.ack();
                let outcome = run_playing(
                    &core,
                    control.as_ref(),
                    &config,
                    &event_sink,
                    &mut output_sink,
                    &mut scratch,
                    &mut seen_generation,
                    interval,
                );
                if outcome == Outcome::Exited {
                    break;
                }
            }
            Request::Exit => {
                control.ack();
                break;
            }
            Request::Stop => {
                // Already idle; nothing to stop. Ack and keep waiting.
                control.ack();
            }
        }
    }
    tracing::debug!("consumer worker exiting");
}

/// How the inner tick loop was asked to end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Stopped,
    Exited,
}

/// The inner loop: tick every `interval` by absolute deadline until STOP or
/// EXIT is observed.
#[allow(clippy::too_many_arguments)]
fn run_playing(
    core: &Arc<Mutex<Core>>,
    control: &ControlState,
    config: &Config,
    event_sink: &Option<Arc<dyn EventSink>>,
    output_sink: &mut OutputSink,
    scratch: &mut [u8],
    seen_generation: &mut u64,
    interval: Duration,
) -> Outcome {
    let mut deadline = Instant::now() + interval;
    loop {
        match control.wait_until(deadline, seen_generation) {
            Some(Request::Stop) => {
                control.ack();
                return Outcome::Stopped;
            }
            Some(Request::Exit) => {
                control.ack();
                return Outcome::Exited;
            }
            Some(Request::Start) => {
                // Idempotent re-start: ack without resetting cadence.
                control.ack();
            }
            None => {
                // Deadline reached with no intervening request.
                process_once(core, config, event_sink, output_sink, scratch);
                deadline += interval;
            }
        }
    }
}

fn process_once(
    core: &Arc<Mutex<Core>>,
    config: &Config,
    event_sink: &Option<Arc<dyn EventSink>>,
    output_sink: &mut OutputSink,
    scratch: &mut [u8],
) {
    let mut core = match lock_with_timeout(core, TICK_LOCK_TIMEOUT) {
        Ok(guard) => guard,
        Err(_) => {
            tracing::warn!("consumer tick: instance mutex acquisition timed out");
            return;
        }
    };

    let frame_count = core.framer.frame_count(&core.ring);
    let event = core.state.apply_consumer_check(frame_count);
    if event == Some(jitter_ring::Event::Underrun) {
        core.ring.underrun_count += 1;
    }
    let frame = if core.state.is_playing() {
        core.framer.read_frame(&mut core.ring, scratch)
    } else {
        None
    };
    drop(core);

    if let (Some(sink), Some(event)) = (event_sink, event) {
        post_event(sink.as_ref(), event);
    }

    match frame {
        Some(len) => output_sink(&scratch[..len]),
        None if config.output_silence_on_empty => {
            for b in scratch.iter_mut() {
                *b = 0;
            }
            output_sink(scratch);
        }
        None => {}
    }
}
