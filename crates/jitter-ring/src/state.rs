//! BUFFERING/PLAYING/UNDERRUN state machine.
//!
//! The high-water check is duplicated on both the producer and consumer
//! paths to avoid a one-tick lag between "buffer just filled" and "playback
//! resumes" — [`StateMachine::apply_producer_check`] and
//! [`StateMachine::apply_consumer_check`] are kept as two distinct entry
//! points rather than one generic recheck so a caller can't accidentally
//! apply the low-water (UNDERRUN) rule from the producer side, which would
//! let a transient burst cause a spurious UNDERRUN.

use crate::config::Config;

/// Playback state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Before the first start, or after a stop.
    Idle,
    /// Accumulating pre-roll toward `high_water`.
    Buffering,
    /// Steady-state output.
    Playing,
    /// Stalled; reaccumulating toward `high_water`.
    Underrun,
}

/// A state transition, posted to the optional event sink. Exactly one is
/// emitted per actual transition; no-op transitions (including `stop`,
/// which never emits) post nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Buffering,
    Playing,
    Underrun,
}

/// Tracks the current [`State`] against the configured water marks.
pub struct StateMachine {
    state: State,
    high_water: usize,
    low_water: usize,
}

impl StateMachine {
    pub fn new(config: &Config) -> Self {
        Self {
            state: State::Idle,
            high_water: config.high_water,
            low_water: config.low_water,
        }
    }

    #[inline]
    pub fn current(&self) -> State {
        self.state
    }

    #[inline]
    pub fn is_playing(&self) -> bool {
        self.state == State::Playing
    }

    /// `IDLE --start()--> BUFFERING`. A no-op (and thus idempotent, emitting
    /// nothing) from any other state — repeating `start` while already
    /// running must not interrupt cadence by forcing a re-buffer.
    pub fn start(&mut self) -> Option<Event> {
        if self.state == State::Idle {
            self.transition_to(State::Buffering)
        } else {
            None
        }
    }

    /// `any --reset()--> BUFFERING`, unconditionally.
    pub fn reset(&mut self) -> Option<Event> {
        self.transition_to(State::Buffering)
    }

    /// `any --stop()--> IDLE`. Never emits, per the transition table — stop
    /// is a control-plane signal, not a playback-state milestone.
    pub fn stop(&mut self) -> Option<Event> {
        self.state = State::Idle;
        None
    }

    /// Producer-path recheck, applied right after a successful `write` while
    /// still holding the instance mutex. May only raise BUFFERING/UNDERRUN
    /// toward PLAYING; never drops toward UNDERRUN.
    pub fn apply_producer_check(&mut self, frame_count: usize) -> Option<Event> {
        if matches!(self.state, State::Buffering | State::Underrun) && frame_count >= self.high_water {
            self.transition_to(State::Playing)
        } else {
            None
        }
    }

    /// Consumer-path recheck, applied before each read attempt. Carries the
    /// same promote-to-PLAYING rule as the producer path (so a burst that
    /// crosses `high_water` resumes output on the very next tick rather than
    /// lagging by one), plus the sole PLAYING -> UNDERRUN rule.
    pub fn apply_consumer_check(&mut self, frame_count: usize) -> Option<Event> {
        match self.state {
            State::Buffering | State::Underrun if frame_count >= self.high_water => {
                self.transition_to(State::Playing)
            }
            State::Playing if frame_count < self.low_water => self.transition_to(State::Underrun),
            _ => None,
        }
    }

    fn transition_to(&mut self, to: State) -> Option<Event> {
        if self.state == to {
            return None;
        }
        self.state = to;
        match to {
            State::Buffering => Some(Event::Buffering),
            State::Playing => Some(Event::Playing),
            State::Underrun => Some(Event::Underrun),
            State::Idle => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sm(high: usize, low: usize) -> StateMachine {
        let config = Config::default().with_water_marks(low, high);
        StateMachine::new(&config)
    }

    #[test]
    fn start_from_idle_buffers() {
        let mut m = sm(20, 10);
        assert_eq!(m.start(), Some(Event::Buffering));
        assert_eq!(m.current(), State::Buffering);
    }

    #[test]
    fn idempotent_start_emits_once() {
        let mut m = sm(20, 10);
        assert_eq!(m.start(), Some(Event::Buffering));
        assert_eq!(m.start(), None);
        assert_eq!(m.current(), State::Buffering);
    }

    #[test]
    fn producer_path_never_demotes() {
        let mut m = sm(20, 10);
        m.start();
        m.apply_producer_check(20);
        assert_eq!(m.current(), State::Playing);
        // Producer path has no rule that can drop PLAYING, regardless of count.
        assert_eq!(m.apply_producer_check(0), None);
        assert_eq!(m.current(), State::Playing);
    }

    #[test]
    fn consumer_path_demotes_on_low_water() {
        let mut m = sm(20, 10);
        m.start();
        m.apply_consumer_check(20);
        assert_eq!(m.current(), State::Playing);
        assert_eq!(m.apply_consumer_check(9), Some(Event::Underrun));
        assert_eq!(m.current(), State::Underrun);
    }

    #[test]
    fn hysteresis_prevents_flapping_at_the_boundary() {
        let mut m = sm(20, 10);
        m.start();
        m.apply_consumer_check(20);
        assert_eq!(m.current(), State::Playing);
        // A dip that stays within [low_water, high_water) keeps PLAYING.
        assert_eq!(m.apply_consumer_check(15), None);
        assert_eq!(m.current(), State::Playing);
    }

    #[test]
    fn stop_never_emits() {
        let mut m = sm(20, 10);
        m.start();
        m.apply_consumer_check(20);
        assert_eq!(m.stop(), None);
        assert_eq!(m.current(), State::Idle);
    }

    #[test]
    fn reset_always_buffers() {
        let mut m = sm(20, 10);
        m.start();
        m.apply_consumer_check(20);
        assert_eq!(m.reset(), Some(Event::Buffering));
        assert_eq!(m.current(), State::Buffering);
    }
}
