//! START/STOP/EXIT control-signal handshake between host and worker.
//!
//! Grounded on the shape of the ring crate's own async shutdown handshake
//! (a shared flag word plus a wake primitive, with an idempotent external
//! trigger), re-expressed with `std::sync::{Mutex, Condvar}` in place of
//! `tokio::sync::{Notify, oneshot}` since the worker here is a plain OS
//! thread, not an async task — see SPEC_FULL.md's Consumer Loop section for
//! why. Two generation counters stand in for the "request set" / "ack set"
//! bitsets described for this handshake: a request is a monotonically
//! increasing generation the worker catches up to, and an ack is the
//! worker publishing that it has caught up.

use std::sync::{Condvar, Mutex};
use std::time::{Duration, Instant};

/// A control signal the host can post to the worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Request {
    Start,
    Stop,
    Exit,
}

struct Inner {
    request: Option<Request>,
    request_generation: u64,
    ack_generation: u64,
}

/// Shared handshake state between the host-facing API and the consumer
/// worker thread.
pub(crate) struct ControlState {
    inner: Mutex<Inner>,
    request_posted: Condvar,
    ack_posted: Condvar,
}

impl ControlState {
    pub(crate) fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                request: None,
                request_generation: 0,
                ack_generation: 0,
            }),
            request_posted: Condvar::new(),
            ack_posted: Condvar::new(),
        }
    }

    /// Host side: posts `request`, then blocks up to `timeout` for the
    /// worker's acknowledgement. Returns `true` if acked in time.
    ///
    /// START is idempotent: posting it while the worker is already running
    /// simply bumps the generation and the worker re-acks without resetting
    /// its tick cadence.
    pub(crate) fn post_and_wait_ack(&self, request: Request, timeout: Duration) -> bool {
        let mut inner = self.inner.lock().unwrap();
        inner.request = Some(request);
        inner.request_generation += 1;
        let target = inner.request_generation;
        self.request_posted.notify_all();

        let deadline = Instant::now() + timeout;
        while inner.ack_generation < target {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return false;
            }
            let (guard, result) = self.ack_posted.wait_timeout(inner, remaining).unwrap();
            inner = guard;
            if result.timed_out() && inner.ack_generation < target {
                return false;
            }
        }
        true
    }

    /// Worker side: blocks (no bound — this is the outer idle wait) until a
    /// new request is posted, then returns it.
    pub(crate) fn wait_for_request(&self, seen_generation: &mut u64) -> Request {
        let mut inner = self.inner.lock().unwrap();
        while inner.request_generation == *seen_generation {
            inner = self.request_posted.wait(inner).unwrap();
        }
        *seen_generation = inner.request_generation;
        inner.request.expect("request_generation advanced without a request")
    }

    /// Worker side: blocks until either `deadline` elapses or a new request
    /// is posted, whichever comes first. Used for the absolute-deadline tick
    /// sleep so STOP/EXIT are observed promptly instead of only at the next
    /// tick boundary.
    pub(crate) fn wait_until(&self, deadline: Instant, seen_generation: &mut u64) -> Option<Request> {
        let mut inner = self.inner.lock().unwrap();
        loop {
            if inner.request_generation != *seen_generation {
                *seen_generation = inner.request_generation;
                return inner.request;
            }
            let now = Instant::now();
            if now >= deadline {
                return None;
            }
            let (guard, _timed_out) = self.request_posted.wait_timeout(inner, deadline - now).unwrap();
            inner = guard;
        }
    }

    /// Worker side: acknowledges the most recently observed request.
    pub(crate) fn ack(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.ack_generation = inner.request_generation;
        drop(inner);
        self.ack_posted.notify_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn post_and_wait_ack_round_trips() {
        let control = Arc::new(ControlState::new());
        let worker_control = Arc::clone(&control);
        let handle = thread::spawn(move || {
            let mut seen = 0u64;
            let req = worker_control.wait_for_request(&mut seen);
            assert_eq!(req, Request::Start);
            worker_control.ack();
        });
        assert!(control.post_and_wait_ack(Request::Start, Duration::from_millis(500)));
        handle.join().unwrap();
    }

    #[test]
    fn ack_timeout_reports_false_without_blocking_forever() {
        let control = ControlState::new();
        // Nobody ever acks.
        assert!(!control.post_and_wait_ack(Request::Exit, Duration::from_millis(20)));
    }

    #[test]
    fn wait_until_wakes_early_on_new_request() {
        let control = Arc::new(ControlState::new());
        let worker_control = Arc::clone(&control);
        let handle = thread::spawn(move || {
            let mut seen = 0u64;
            let far_future = Instant::now() + Duration::from_secs(10);
            let req = worker_control.wait_until(far_future, &mut seen);
            assert_eq!(req, Some(Request::Stop));
            worker_control.ack();
        });
        thread::sleep(Duration::from_millis(20));
        assert!(control.post_and_wait_ack(Request::Stop, Duration::from_millis(500)));
        handle.join().unwrap();
    }
}
