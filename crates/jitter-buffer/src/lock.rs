//! Bounded-timeout acquisition of the single instance mutex.
//!
//! `std::sync::Mutex` has no native timed lock, so this polls `try_lock`
//! behind a [`Backoff`], bounded by a wall-clock deadline. This is the one
//! lock in the whole instance (per spec: "lock order is trivial — only one
//! lock exists"), so a short poll loop costs nothing measurable against the
//! `O(frame_size)` critical sections it guards.

use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use crate::backoff::Backoff;
use crate::error::JitterError;

pub(crate) fn lock_with_timeout<T>(
    mutex: &Mutex<T>,
    timeout: Duration,
) -> Result<MutexGuard<'_, T>, JitterError> {
    let deadline = Instant::now() + timeout;
    let mut backoff = Backoff::new();
    loop {
        match mutex.try_lock() {
            Ok(guard) => return Ok(guard),
            Err(std::sync::TryLockError::WouldBlock) => {}
            Err(std::sync::TryLockError::Poisoned(poisoned)) => {
                // A panic inside another holder left the mutex poisoned.
                // No operation on the guarded state can observe a torn
                // write (every mutation completes before the lock is
                // released), so recover the guard rather than propagate
                // the poison forever.
                return Ok(poisoned.into_inner());
            }
        }
        if Instant::now() >= deadline {
            return Err(JitterError::Timeout);
        }
        backoff.snooze();
    }
}
