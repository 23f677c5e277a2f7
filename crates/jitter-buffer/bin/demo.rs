//! Demonstration of jitter-buffer features.
//!
//! Run with: `cargo run -p jitter-buffer --bin demo`

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use jitter_ring::{Config, Event};
use jitter_buffer::{EventSink, JitterBuffer};

fn main() {
    tracing_subscriber::fmt::init();
    println!("=== jitter-buffer Demo ===\n");

    demo_fixed_frame_playback();
    demo_length_prefixed_playback();
    demo_overrun_drops_whole_frames();
    demo_underrun_and_recover();

    println!("\n=== All demos completed successfully! ===");
}

/// Demo 1: Fixed-size frames, pre-roll, then steady playback.
fn demo_fixed_frame_playback() {
    println!("--- Demo 1: Fixed-frame Playback ---");

    let config = Config::default()
        .with_frame_size(160)
        .with_buffer_size(160 * 20)
        .with_frame_interval_ms(20)
        .with_water_marks(4, 8);

    let received = Arc::new(AtomicU64::new(0));
    let received_for_sink = Arc::clone(&received);
    let jb = JitterBuffer::create(config, move |frame: &[u8]| {
        received_for_sink.fetch_add(frame.len() as u64, Ordering::Relaxed);
    })
    .expect("valid configuration");

    jb.start().expect("worker starts");
    for _ in 0..10 {
        jb.write(&vec![0xAB; 160]).expect("write accepted");
    }

    std::thread::sleep(Duration::from_millis(250));
    println!(
        "  Consumer has received {} bytes so far",
        received.load(Ordering::Relaxed)
    );
    jb.destroy();
    println!("  ✓ Fixed-frame playback complete\n");
}

/// Demo 2: Length-prefixed frames of varying size.
fn demo_length_prefixed_playback() {
    println!("--- Demo 2: Length-prefixed Playback ---");

    let config = Config::default()
        .with_frame_size(256)
        .with_header(true)
        .with_frame_interval_ms(20)
        .with_water_marks(2, 4);

    let jb = JitterBuffer::create(config, |frame: &[u8]| {
        println!("  Consumer got a {}-byte frame", frame.len());
    })
    .expect("valid configuration");

    jb.start().expect("worker starts");
    jb.write(b"short").expect("write accepted");
    jb.write(&vec![0x7F; 200]).expect("write accepted");

    std::thread::sleep(Duration::from_millis(100));
    jb.destroy();
    println!("  ✓ Length-prefixed playback complete\n");
}

/// Demo 3: Overrun on a full ring discards whole frames, never partial ones.
fn demo_overrun_drops_whole_frames() {
    println!("--- Demo 3: Overrun Handling ---");

    let config = Config::default()
        .with_frame_size(160)
        .with_buffer_size(160 * 4)
        .with_frame_interval_ms(20)
        .with_water_marks(2, 3);

    let jb = JitterBuffer::create(config, |_frame: &[u8]| {}).expect("valid configuration");

    // Never started: nothing drains, so the ring fills and later writes overrun.
    for _ in 0..10 {
        jb.write(&vec![0x11; 160]).ok();
    }
    let metrics = jb.metrics().expect("metrics available");
    println!(
        "  total_written={} overrun_count={}",
        metrics.total_written, metrics.overrun_count
    );
    jb.destroy();
    println!("  ✓ Overrun handling complete\n");
}

/// Demo 4: An `EventSink` observes the underrun/recovery transitions.
struct LoggingSink;

impl EventSink for LoggingSink {
    fn post(&self, event: Event) -> bool {
        println!("  event: {event:?}");
        true
    }
}

fn demo_underrun_and_recover() {
    println!("--- Demo 4: Underrun and Recover ---");

    let config = Config::default()
        .with_frame_size(160)
        .with_buffer_size(160 * 20)
        .with_frame_interval_ms(10)
        .with_water_marks(2, 4);

    let jb = JitterBuffer::create_with_event_sink(config, |_: &[u8]| {}, Some(Arc::new(LoggingSink)))
        .expect("valid configuration");

    jb.start().expect("worker starts");
    // Starve the consumer deliberately, then feed it again.
    std::thread::sleep(Duration::from_millis(60));
    for _ in 0..8 {
        jb.write(&vec![0x22; 160]).expect("write accepted");
    }
    std::thread::sleep(Duration::from_millis(60));
    jb.destroy();
    println!("  ✓ Underrun and recover complete\n");
}
