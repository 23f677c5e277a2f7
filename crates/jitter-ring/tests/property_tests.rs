//! Property-based invariants for the ring and length-prefixed framer.

use jitter_ring::{Config, Framer, Ring};
use proptest::prelude::*;

fn payload_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..400)
}

proptest! {
    /// Byte conservation: total_written = total_read + occupied + bytes
    /// dropped by overrun, for the fixed framer under arbitrary write/read
    /// interleavings.
    #[test]
    fn byte_conservation_fixed_framer(
        frame_size in 1usize..64,
        writes in prop::collection::vec(1usize..10, 1..30),
    ) {
        let buffer_size = frame_size * 8;
        let mut ring = Ring::new(buffer_size);
        let framer = Framer::Fixed { frame_size };

        for frames in writes {
            let payload = vec![0xAB; frame_size];
            for _ in 0..frames {
                framer.write_frame(&mut ring, &payload);
            }
            // Drain roughly half of what's available to exercise both paths.
            let to_read = framer.frame_count(&ring) / 2;
            let mut scratch = vec![0u8; frame_size];
            for _ in 0..to_read {
                framer.read_frame(&mut ring, &mut scratch);
            }
        }

        // Overrun discards are folded into total_read by Ring::discard, so
        // byte conservation holds with no separate "dropped" term.
        prop_assert_eq!(ring.total_written, ring.total_read + ring.occupied() as u64);
    }

    /// Frame alignment: after any sequence of writes/reads, the head always
    /// points at the first byte of either a header or an empty ring — i.e.
    /// `frame_count` never observes an unparsable length at the head once
    /// at least 2 bytes are available.
    #[test]
    fn length_prefixed_stays_aligned(
        payloads in prop::collection::vec(payload_strategy(), 1..20),
        reads_per_round in 0usize..5,
    ) {
        let frame_size = 400;
        let buffer_size = 2048;
        let mut ring = Ring::new(buffer_size);
        let framer = Framer::LengthPrefixed { frame_size };
        let mut scratch = vec![0u8; frame_size];

        for payload in payloads {
            let payload = if payload.len() > frame_size { payload[..frame_size].to_vec() } else { payload };
            framer.write_frame(&mut ring, &payload);

            for _ in 0..reads_per_round {
                framer.read_frame(&mut ring, &mut scratch);
            }

            // The walk must always terminate having found only frames whose
            // length is within bounds; it never panics or reads OOB, and if
            // at least a header's worth of bytes remain and frame_count() is
            // zero, that must be because the header truly isn't verifiable
            // yet (not because of misalignment into payload bytes).
            let count = framer.frame_count(&ring);
            prop_assert!(count <= ring.occupied());
        }
    }

    /// Ring write/read never panics and never reports more occupied bytes
    /// than capacity, across arbitrary interleavings within capacity.
    #[test]
    fn ring_never_exceeds_capacity(
        ops in prop::collection::vec((0u8..2, 1usize..20), 1..50),
    ) {
        let mut ring = Ring::new(64);
        for (kind, n) in ops {
            if kind == 0 {
                let n = n.min(ring.free_space());
                let data = vec![0xCD; n];
                ring.write(&data);
            } else {
                let mut dst = vec![0u8; n];
                ring.read(&mut dst);
            }
            prop_assert!(ring.occupied() <= ring.capacity());
        }
    }
}

#[test]
fn fixed_framer_overflow_discards_exact_shortfall() {
    let mut ring = Ring::new(20);
    let framer = Framer::Fixed { frame_size: 5 };
    for _ in 0..4 {
        framer.write_frame(&mut ring, &[1, 2, 3, 4, 5]);
    }
    assert_eq!(ring.occupied(), 20);
    let result = framer.write_frame(&mut ring, &[9, 9, 9, 9, 9]);
    assert!(result.overran);
    assert!(!result.alignment_lost);
    assert_eq!(ring.occupied(), 20);
    assert_eq!(ring.overrun_count, 1);
}

#[test]
fn config_build_raises_buffer_size_for_with_header() {
    let config = Config::default()
        .with_header(true)
        .with_buffer_size(1)
        .with_water_marks(10, 20)
        .with_frame_size(512)
        .build()
        .unwrap();
    assert!(config.buffer_size >= 20 * (2 + 512));
}
