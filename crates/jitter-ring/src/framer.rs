//! Frame-aware interpretation of ring contents.
//!
//! Two policies, selected by `Config::with_header`: fixed-length frames, and
//! length-prefixed frames (`[len_hi, len_lo, payload...]`, big-endian). Both
//! variants are read-only with respect to enumeration (`frame_count`) and
//! only ever discard whole frames from the head when reclaiming space, so a
//! payload byte is never later misread as a length prefix.

use crate::invariants::debug_assert_frame_aligned;
use crate::ring::Ring;

/// Outcome of writing one frame, for callers that want to log or assert on
/// overrun behavior beyond the counter bump `Framer` already performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameWrite {
    /// Whether free space was insufficient and frames were discarded to
    /// admit this write.
    pub overran: bool,
    /// Whether the whole-frame discard could not reclaim enough space and a
    /// byte-level fallback was used, losing frame alignment at the time of
    /// the drop (length-prefixed only; never happens for fixed framing).
    pub alignment_lost: bool,
}

/// Framing policy applied to a [`Ring`]'s contents.
#[derive(Debug, Clone, Copy)]
pub enum Framer {
    /// Every frame is exactly `frame_size` bytes.
    Fixed { frame_size: usize },
    /// Every frame is a 2-byte big-endian length followed by that many
    /// payload bytes. `frame_size` here is the maximum accepted payload
    /// length — a header claiming more is malformed.
    LengthPrefixed { frame_size: usize },
}

impl Framer {
    pub fn from_config(config: &crate::config::Config) -> Self {
        if config.with_header {
            Framer::LengthPrefixed {
                frame_size: config.frame_size,
            }
        } else {
            Framer::Fixed {
                frame_size: config.frame_size,
            }
        }
    }

    #[inline]
    pub fn is_length_prefixed(&self) -> bool {
        matches!(self, Framer::LengthPrefixed { .. })
    }

    /// Maximum payload length this framer will decode (fixed frame length,
    /// or the configured payload cap).
    #[inline]
    pub fn frame_cap(&self) -> usize {
        match self {
            Framer::Fixed { frame_size } | Framer::LengthPrefixed { frame_size } => *frame_size,
        }
    }

    /// Number of complete frames currently available to read. Read-only —
    /// never mutates `ring`.
    pub fn frame_count(&self, ring: &Ring) -> usize {
        match self {
            Framer::Fixed { frame_size } => ring.occupied() / frame_size,
            Framer::LengthPrefixed { .. } => self.walk(ring),
        }
    }

    /// Read-only walk from the head, counting fully-verified frames. Stops
    /// at the first length prefix that can't be verified (either it claims
    /// more than `buffer_size / 2`, or there isn't enough data yet for its
    /// payload).
    fn walk(&self, ring: &Ring) -> usize {
        let max_len = ring.capacity() / 2;
        let mut offset = 0usize;
        let mut count = 0usize;
        let mut hdr = [0u8; 2];
        loop {
            let remaining = ring.occupied().saturating_sub(offset);
            if remaining < 2 {
                break;
            }
            if ring.peek_at(offset, &mut hdr) < 2 {
                break;
            }
            let len = u16::from_be_bytes(hdr) as usize;
            if len > max_len || remaining < 2 + len {
                break;
            }
            offset += 2 + len;
            count += 1;
        }
        count
    }

    /// Encodes and writes one frame, discarding whole frames from the head
    /// first if free space is insufficient.
    pub fn write_frame(&self, ring: &mut Ring, payload: &[u8]) -> FrameWrite {
        let encoded_len = match self {
            Framer::Fixed { .. } => payload.len(),
            Framer::LengthPrefixed { .. } => 2 + payload.len(),
        };

        let mut result = FrameWrite::default();
        if encoded_len > ring.free_space() {
            result.overran = true;
            result.alignment_lost = self.discard_for_overflow(ring, encoded_len);
            ring.overrun_count += 1;
        }

        match self {
            Framer::Fixed { .. } => ring.write(payload),
            Framer::LengthPrefixed { .. } => {
                let header = (payload.len() as u16).to_be_bytes();
                ring.write(&header);
                ring.write(payload);
            }
        }

        result
    }

    /// Reclaims `needed` bytes of free space by discarding whole frames from
    /// the head. Returns `true` if a byte-level fallback was needed (only
    /// possible for length-prefixed framing).
    fn discard_for_overflow(&self, ring: &mut Ring, needed: usize) -> bool {
        match self {
            Framer::Fixed { .. } => {
                // Every frame_size boundary is a valid frame boundary, so a
                // byte-granular discard of exactly the shortfall is safe and
                // never loses alignment.
                let shortfall = needed.saturating_sub(ring.free_space());
                ring.discard(shortfall);
                false
            }
            Framer::LengthPrefixed { .. } => {
                let max_len = ring.capacity() / 2;
                let mut hdr = [0u8; 2];
                while needed > ring.free_space() {
                    if ring.occupied() < 2 {
                        break;
                    }
                    if ring.peek(&mut hdr) < 2 {
                        break;
                    }
                    let len = u16::from_be_bytes(hdr) as usize;
                    if len > max_len || ring.occupied() < 2 + len {
                        break;
                    }
                    ring.discard(2 + len);
                }
                if needed > ring.free_space() {
                    let shortfall = needed - ring.free_space();
                    ring.discard(shortfall);
                    tracing::warn!(
                        shortfall,
                        "frame alignment lost during overrun byte-level fallback"
                    );
                    return true;
                }
                false
            }
        }
    }

    /// Reads one frame into `scratch` (must be at least `frame_cap()`
    /// bytes). Returns `Some(payload_len)` if a frame was consumed;
    /// `None` if no complete frame is available this tick, or a malformed
    /// oversize frame was dropped.
    pub fn read_frame(&self, ring: &mut Ring, scratch: &mut [u8]) -> Option<usize> {
        match self {
            Framer::Fixed { frame_size } => {
                if ring.occupied() < *frame_size {
                    return None;
                }
                let n = ring.read(&mut scratch[..*frame_size]);
                debug_assert_eq!(n, *frame_size);
                Some(n)
            }
            Framer::LengthPrefixed { frame_size } => {
                let mut hdr = [0u8; 2];
                if ring.peek(&mut hdr) < 2 {
                    return None;
                }
                let len = u16::from_be_bytes(hdr) as usize;
                if len > *frame_size {
                    let to_drop = (2 + len).min(ring.occupied());
                    ring.discard(to_drop);
                    tracing::warn!(
                        len,
                        cap = frame_size,
                        "dropped malformed frame exceeding frame_size"
                    );
                    return None;
                }
                if ring.occupied() < 2 + len {
                    return None;
                }
                debug_assert_frame_aligned!(len, ring.capacity() / 2);
                ring.discard(2);
                let n = ring.read(&mut scratch[..len]);
                Some(n)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn fixed_frame_count_is_floor_division() {
        let mut ring = Ring::new(64);
        let framer = Framer::Fixed { frame_size: 10 };
        ring.write(&[0u8; 25]);
        assert_eq!(framer.frame_count(&ring), 2);
    }

    #[test]
    fn length_prefixed_round_trip() {
        let config = Config::default().with_header(true).with_frame_size(512);
        let mut ring = Ring::new(4096);
        let framer = Framer::from_config(&config);
        let payloads: [&[u8]; 5] = [&[0u8; 100], &[1u8; 250], &[2u8; 512], &[3u8; 1], &[4u8; 333]];
        for p in &payloads {
            framer.write_frame(&mut ring, p);
        }
        assert_eq!(framer.frame_count(&ring), 5);
        let mut scratch = vec![0u8; 512];
        for p in &payloads {
            let n = framer.read_frame(&mut ring, &mut scratch).unwrap();
            assert_eq!(n, p.len());
            assert_eq!(&scratch[..n], *p);
        }
        assert_eq!(framer.frame_count(&ring), 0);
    }

    #[test]
    fn aligned_overrun_drops_whole_frames() {
        // buffer_size=2048, frame_size=500, with_header: 5 * (2+500) = 2510 > 2048
        let mut ring = Ring::new(2048);
        let framer = Framer::LengthPrefixed { frame_size: 500 };
        for _ in 0..5 {
            framer.write_frame(&mut ring, &[7u8; 500]);
        }
        assert!(ring.overrun_count >= 1);
        let mut hdr = [0u8; 2];
        assert_eq!(ring.peek(&mut hdr), 2);
        assert_eq!(u16::from_be_bytes(hdr) as usize, 500);
    }

    #[test]
    fn malformed_length_is_discarded_without_reading_payload() {
        let mut ring = Ring::new(2048);
        // Craft a header claiming the whole buffer as length.
        ring.write(&(2048u16).to_be_bytes());
        let framer = Framer::LengthPrefixed { frame_size: 512 };
        let mut scratch = vec![0u8; 512];
        assert_eq!(framer.read_frame(&mut ring, &mut scratch), None);
        assert!(ring.is_empty());
    }
}
