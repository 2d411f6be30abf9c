//! Integration tests: link frames -> decoder -> clock -> engine -> player.

use sb_engine::{
    AssetHeap, AssetStager, ClockReconciler, FrameOutcome, MemoryStorage, PlayerCall,
    RecordingPlayer, RemoteEventDecoder, SequenceEngine,
};
use sb_formats::{encode_midi_batch, encode_session_start, FormatError, SeqBankFile};
use sb_ir::{BankDirectory, Frame, MidiMessage, Tag, Tempo, CC_CHANNEL_VOLUME};

type Engine = SequenceEngine<RecordingPlayer, MemoryStorage>;

/// One-sequence bank whose body is a type-0 SMF header at 96 ticks/quarter.
fn single_sequence_image() -> Vec<u8> {
    let mut body: Vec<u8> = Vec::new();
    body.extend(b"MThd");
    body.extend(&6u32.to_be_bytes());
    body.extend(&[0, 0, 0, 1, 0, 96]);

    let mut image = Vec::new();
    image.extend(b"S1");
    image.extend(&1i16.to_be_bytes());
    image.extend(&12u32.to_be_bytes());
    image.extend(&(body.len() as i32).to_be_bytes());
    image.extend(body);
    image
}

fn engine() -> Engine {
    let mut stager = AssetStager::new(
        MemoryStorage::new(single_sequence_image()),
        AssetHeap::with_capacity(1024),
    );
    let sequences = stager.load_directory::<SeqBankFile>(0).unwrap();
    let slot = stager.reserve_slot(64).unwrap();
    let mut engine = SequenceEngine::new(
        RecordingPlayer::new(),
        stager,
        BankDirectory::default(),
        sequences,
        slot,
        0x3fff,
    )
    .unwrap();
    engine.play();
    engine.player_mut().clear_calls();
    engine
}

struct Rig {
    decoder: RemoteEventDecoder,
    clock: ClockReconciler,
    engine: Engine,
}

impl Rig {
    fn new() -> Self {
        Self { decoder: RemoteEventDecoder::new(), clock: ClockReconciler::new(), engine: engine() }
    }

    fn feed(&mut self, frame: &Frame, now_us: u64) -> FrameOutcome {
        self.decoder.process(frame, now_us, &mut self.clock, &mut self.engine)
    }

    fn sent(&self) -> Vec<(u32, u8, u8, u8)> {
        self.engine.player().sent().collect()
    }
}

fn batch(events: &[MidiMessage]) -> Frame {
    encode_midi_batch(events).unwrap().0
}

#[test]
fn session_start_uses_device_clock() {
    let mut rig = Rig::new();
    let outcome = rig.feed(&encode_session_start(), 42_000);
    assert_eq!(outcome, FrameOutcome::SessionStarted { epoch_us: 42_000 });
    assert_eq!(rig.clock.epoch(), Some(42_000));
    assert!(rig.engine.player().calls().is_empty());
}

#[test]
fn batch_of_three_sends_three_events_in_order() {
    let mut rig = Rig::new();
    rig.feed(&encode_session_start(), 0);

    let frame = batch(&[
        MidiMessage::new(0, 0x90, 60, 100),
        MidiMessage::new(250_000, 0x90, 64, 100),
        MidiMessage::new(500_000, 0x80, 60, 0),
    ]);
    assert_eq!(rig.feed(&frame, 0), FrameOutcome::Batch { sent: 3, raised: 0 });

    let sent = rig.sent();
    assert_eq!(sent, vec![(0, 0x90, 60, 100), (48, 0x90, 64, 100), (96, 0x80, 60, 0)]);
    assert!(sent.windows(2).all(|w| w[0].0 <= w[1].0));
}

#[test]
fn out_of_order_timestamps_are_raised_not_reordered() {
    let mut rig = Rig::new();
    rig.feed(&encode_session_start(), 0);

    let frame = batch(&[
        MidiMessage::new(500_000, 0x90, 60, 100),
        MidiMessage::new(250_000, 0x90, 62, 100),
        MidiMessage::new(750_000, 0x90, 64, 100),
    ]);
    assert_eq!(rig.feed(&frame, 0), FrameOutcome::Batch { sent: 3, raised: 1 });
    let ticks: Vec<_> = rig.sent().iter().map(|s| s.0).collect();
    assert_eq!(ticks, vec![96, 96, 144]);
    assert_eq!(rig.sent()[1].2, 62);
}

#[test]
fn leads_are_scheduled_from_player_position() {
    let mut rig = Rig::new();
    rig.feed(&encode_session_start(), 0);
    rig.engine.player_mut().advance(500);

    rig.feed(&batch(&[MidiMessage::new(0, 0x90, 60, 1), MidiMessage::new(500_000, 0x80, 60, 0)]), 0);
    assert_eq!(rig.sent(), vec![(500, 0x90, 60, 1), (596, 0x80, 60, 0)]);
}

#[test]
fn host_offsets_are_independent_of_device_uptime() {
    let mut rig = Rig::new();
    rig.feed(&encode_session_start(), 30_000_000);

    let frame = batch(&[
        MidiMessage::new(0, 0x90, 60, 100),
        MidiMessage::new(500_000, 0x90, 64, 100),
        MidiMessage::new(1_000_000, 0x80, 60, 0),
    ]);
    rig.feed(&frame, 30_000_000);
    let ticks: Vec<_> = rig.sent().iter().map(|s| s.0).collect();
    assert_eq!(ticks, vec![0, 96, 192]);
    assert_eq!(rig.clock.clamped(), 0);
}

#[test]
fn batch_arriving_mid_session_shortens_leads() {
    let mut rig = Rig::new();
    rig.feed(&encode_session_start(), 30_000_000);

    let frame = batch(&[
        MidiMessage::new(200_000, 0x90, 60, 100),
        MidiMessage::new(750_000, 0x80, 60, 0),
    ]);
    rig.feed(&frame, 30_250_000);
    assert_eq!(rig.sent(), vec![(0, 0x90, 60, 100), (96, 0x80, 60, 0)]);
    assert_eq!(rig.clock.clamped(), 1);
}

#[test]
fn program_change_is_followed_by_volume_restore() {
    let mut rig = Rig::new();
    rig.feed(&encode_session_start(), 0);

    let frame = batch(&[
        MidiMessage::new(0, 0xb5, CC_CHANNEL_VOLUME, 33),
        MidiMessage::new(500_000, 0xc5, 17, 0),
    ]);
    rig.feed(&frame, 0);

    assert_eq!(
        rig.sent(),
        vec![
            (0, 0xb5, CC_CHANNEL_VOLUME, 33),
            (96, 0xc5, 17, 0),
            (96, 0xb5, CC_CHANNEL_VOLUME, 33),
        ]
    );
}

#[test]
fn batch_before_session_is_dropped() {
    let mut rig = Rig::new();
    let outcome = rig.feed(&batch(&[MidiMessage::new(0, 0x90, 60, 1)]), 0);
    assert_eq!(outcome, FrameOutcome::NoSession { dropped: 1 });
    assert!(rig.engine.player().calls().is_empty());
    assert_eq!(rig.decoder.stats().events_dropped, 1);
}

#[test]
fn unknown_tag_touches_neither_clock_nor_engine() {
    let mut rig = Rig::new();
    let outcome = rig.feed(&Frame::from_packet(b"XXXX\x00\x00\x00\x01"), 99);
    assert_eq!(outcome, FrameOutcome::Ignored(Tag(*b"XXXX")));
    assert_eq!(rig.clock.epoch(), None);
    assert!(rig.engine.player().calls().is_empty());
    assert_eq!(rig.decoder.stats().ignored, 1);
}

#[test]
fn oversize_batch_is_rejected_whole() {
    let mut rig = Rig::new();
    rig.feed(&encode_session_start(), 0);

    let mut packet = Vec::new();
    packet.extend(b"MMID");
    packet.extend(&64u32.to_be_bytes());
    let outcome = rig.feed(&Frame::from_packet(&packet), 0);

    assert_eq!(outcome, FrameOutcome::Rejected(FormatError::BatchOverflow(64)));
    assert!(rig.engine.player().calls().is_empty());
    assert_eq!(rig.decoder.stats().rejected, 1);
}

#[test]
fn late_event_lands_on_current_position() {
    let mut rig = Rig::new();
    rig.feed(&encode_session_start(), 1_000_000);
    rig.engine.player_mut().advance(40);
    rig.feed(&batch(&[MidiMessage::new(10, 0x90, 60, 1)]), 1_000_100);
    assert_eq!(rig.sent(), vec![(40, 0x90, 60, 1)]);
    assert_eq!(rig.clock.clamped(), 1);
}

#[test]
fn tempo_change_between_batches_is_observed() {
    let mut rig = Rig::new();
    rig.feed(&encode_session_start(), 0);
    rig.engine.set_tempo(Tempo::from_bpm(60));
    rig.engine.player_mut().clear_calls();

    rig.feed(&batch(&[MidiMessage::new(1_000_000, 0x90, 60, 1)]), 0);
    assert_eq!(rig.sent(), vec![(96, 0x90, 60, 1)]);
}

#[test]
fn stats_accumulate() {
    let mut rig = Rig::new();
    rig.feed(&encode_session_start(), 0);
    rig.feed(&batch(&[MidiMessage::new(0, 0x90, 1, 1), MidiMessage::new(0, 0x80, 1, 0)]), 0);
    rig.feed(&Frame::from_packet(b"PING"), 0);

    let stats = *rig.decoder.stats();
    assert_eq!(stats.sessions, 1);
    assert_eq!(stats.batches, 1);
    assert_eq!(stats.events_sent, 2);
    assert_eq!(stats.ignored, 1);
    assert!(!rig.engine.player().calls().contains(&PlayerCall::Stop));
}
