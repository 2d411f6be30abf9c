//! Allocation-free tick path tests.
//!
//! These tests verify that `Bridge::tick()` does not allocate once startup
//! staging is done, whether the link is idle or delivering session and
//! MIDI batch frames.
//!
//! Runs under plain `cargo test`; no feature flags needed.

use assert_no_alloc::{assert_no_alloc, AllocDisabler};

#[cfg(debug_assertions)]
#[global_allocator]
static A: AllocDisabler = AllocDisabler;

use sb_formats::{encode_midi_batch, encode_session_start};
use sb_ir::{Frame, MidiMessage, MAX_BATCH_EVENTS};
use sb_master::{
    loopback, Bridge, BridgeConfig, HostEnd, LoopbackLink, ManualClock, MemoryStorage, NoPause,
    RecordingPlayer, RomImage,
};

type TestBridge = Bridge<RecordingPlayer, MemoryStorage, LoopbackLink, ManualClock, NoPause>;

fn assets() -> (Vec<u8>, Vec<u8>) {
    let mut ctl = Vec::new();
    ctl.extend(b"B1");
    ctl.extend(&1i16.to_be_bytes());
    ctl.extend(&8i32.to_be_bytes());

    let mut sbk = Vec::new();
    sbk.extend(b"S1");
    sbk.extend(&1i16.to_be_bytes());
    sbk.extend(&12u32.to_be_bytes());
    sbk.extend(&14i32.to_be_bytes());
    sbk.extend(b"MThd");
    sbk.extend(&6u32.to_be_bytes());
    sbk.extend(&[0, 0, 0, 1, 0, 96]);
    (ctl, sbk)
}

fn bridge() -> (TestBridge, HostEnd) {
    let (ctl, sbk) = assets();
    let (storage, layout) = RomImage::assemble(&ctl, &[0; 16], &sbk).into_storage();
    let (host, link) = loopback(4);
    let config = BridgeConfig { heap_bytes: 4096, body_slot_bytes: 64, ..BridgeConfig::default() };
    let bridge = Bridge::with_pacer(
        &config,
        layout,
        storage,
        RecordingPlayer::new(),
        link,
        ManualClock::new(0),
        NoPause::default(),
    )
    .unwrap();
    (bridge, host)
}

/// A full batch cycling through note, controller and program events.
fn full_batch(start_us: u32) -> Frame {
    let events: Vec<MidiMessage> = (0..MAX_BATCH_EVENTS as u32)
        .map(|i| {
            let (status, d1, d2) = match i % 4 {
                0 => (0x90, 60, 100),
                1 => (0x80, 60, 0),
                2 => (0xb1, 7, 90),
                _ => (0xc1, 3, 0),
            };
            MidiMessage::new(start_us + i * 5_000, status, d1, d2)
        })
        .collect();
    encode_midi_batch(&events).unwrap().0
}

#[test]
fn idle_ticks_alloc_free() {
    let (mut bridge, _host) = bridge();
    assert_no_alloc(|| {
        for _ in 0..600 {
            bridge.device_clock_mut().advance(16_667);
            bridge.tick();
        }
    });
    assert_eq!(bridge.ticks(), 600);
}

#[test]
fn batch_ticks_alloc_free() {
    let (mut bridge, mut host) = bridge();
    let start = encode_session_start();
    let batches: Vec<Frame> = (0..8).map(|i| full_batch(i * 400_000)).collect();

    assert!(host.send_frame(&start));
    assert_no_alloc(|| {
        bridge.tick();
    });

    for frame in &batches {
        assert!(host.send_frame(frame));
        assert_no_alloc(|| {
            bridge.device_clock_mut().advance(16_667);
            bridge.tick();
        });
    }

    assert_eq!(bridge.decoder_stats().batches, 8);
    assert_eq!(bridge.decoder_stats().events_sent, 8 * MAX_BATCH_EVENTS as u64);
}
