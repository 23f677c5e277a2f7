//! Output and event sink capability points.
//!
//! Both are set once at construction and never swapped — they are the two
//! dynamic-dispatch seams this crate has, matching spec.md's "Dynamic
//! dispatch" design note. The output sink is a plain boxed closure since
//! exactly one call shape exists (`&[u8]` in, nothing out) and it is owned
//! solely by the consumer worker, never shared; the event sink is a small
//! trait object behind an `Arc` since both the producer path (`write`) and
//! the consumer path (the worker) post through it.

use jitter_ring::Event;

/// The callback invoked once per tick with the next frame's bytes (or a
/// zeroed frame, if silence-fill is enabled). Owned exclusively by the
/// consumer worker thread and invoked outside the instance mutex.
///
/// Implementations must not call back into the owning `JitterBuffer` from
/// within the callback — that contract is documented, not mechanically
/// enforced, the same way the rest of this crate documents (rather than
/// types-enforces) reentrancy contracts at its capability seams.
pub type OutputSink = Box<dyn FnMut(&[u8]) + Send>;

/// Optional sink for state-transition notifications.
///
/// Posting is best-effort: a `false` return, or a panic unwinding out of
/// `post`, is logged and otherwise ignored — it never propagates to the
/// caller that triggered the transition.
pub trait EventSink: Send + Sync {
    /// Attempts to post `event`. Implementations should return promptly;
    /// this is called both from the producer path (`write`) and from the
    /// consumer worker, always outside the instance mutex.
    fn post(&self, event: Event) -> bool;
}

/// Dispatches `event` to `sink`, treating a panic the same as a declined
/// post: logged and swallowed so a misbehaving sink can never take down
/// the caller (producer thread or consumer worker) that triggered it.
pub(crate) fn post_event(sink: &dyn EventSink, event: Event) {
    let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| sink.post(event)));
    match outcome {
        Ok(true) => tracing::debug!(?event, "posted state transition"),
        Ok(false) => tracing::warn!(?event, "event sink declined post"),
        Err(_) => tracing::warn!(?event, "event sink panicked during post"),
    }
}
