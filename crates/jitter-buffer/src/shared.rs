//! The mutex-guarded triple: ring, framer, state machine.

use jitter_ring::{Config, Framer, Ring, StateMachine};

/// Everything guarded by the instance's single mutex. Deliberately just a
/// plain struct with no synchronization of its own — see `jitter-ring`'s
/// `Ring` doc comment for why that's correct here.
pub(crate) struct Core {
    pub(crate) ring: Ring,
    pub(crate) framer: Framer,
    pub(crate) state: StateMachine,
}

impl Core {
    pub(crate) fn new(config: &Config) -> Self {
        Self {
            ring: Ring::new(config.buffer_size),
            framer: Framer::from_config(config),
            state: StateMachine::new(config),
        }
    }
}
