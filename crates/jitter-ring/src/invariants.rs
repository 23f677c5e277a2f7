//! Debug assertion macros for ring/framer invariants.
//!
//! Active only under `debug_assertions`, so there is zero overhead in
//! release builds. Mirrors the teacher's `invariants.rs`: one macro per
//! named invariant, referenced from the call site that can violate it.

/// `0 <= data_size <= capacity` at all times.
macro_rules! debug_assert_occupancy_invariant {
    ($data_size:expr, $capacity:expr) => {
        debug_assert!(
            $data_size <= $capacity,
            "INV-RING-01 violated: data_size {} exceeds capacity {}",
            $data_size,
            $capacity
        )
    };
}

/// `read_pos` and `write_pos` stay within `[0, capacity)`.
macro_rules! debug_assert_positions_in_range {
    ($read_pos:expr, $write_pos:expr, $capacity:expr) => {
        debug_assert!(
            $capacity == 0 || ($read_pos < $capacity && $write_pos <= $capacity),
            "INV-RING-02 violated: read_pos {} / write_pos {} outside [0, {})",
            $read_pos,
            $write_pos,
            $capacity
        )
    };
}

/// A parsed length-prefix never exceeds the enumeration bound
/// `buffer_size / 2`, nor (on decode) the configured frame cap.
macro_rules! debug_assert_frame_aligned {
    ($len:expr, $max:expr) => {
        debug_assert!(
            $len <= $max,
            "INV-FRAME-01 violated: parsed length {} exceeds bound {}",
            $len,
            $max
        )
    };
}

pub(crate) use debug_assert_frame_aligned;
pub(crate) use debug_assert_occupancy_invariant;
pub(crate) use debug_assert_positions_in_range;
