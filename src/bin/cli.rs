//! seqbridge CLI: stage a sound bank and replay captured link frames.
//!
//! Usage:
//!   sb-cli bank.ctl bank.tbl seq.sbk
//!   sb-cli bank.ctl bank.tbl seq.sbk --frames capture.bin --ticks 600
//!   sb-cli bank.ctl bank.tbl seq.sbk --config bridge.ron
//!
//! The capture is a flat file of 512-byte frames. Each application tick
//! queues the next frame on a loopback link and advances a 60 Hz device
//! clock, so replay timing is reproducible.

use sb_ir::{BankDirectory, Channel, Tempo, Tick};
use sb_master::{
    loopback, Bridge, BridgeConfig, Frame, FrameOutcome, ManualClock, PlayerCall,
    RecordingPlayer, RomImage, SeqPlayer,
};
use std::{env, fs};

const FRAME_US: u64 = 16_667;
const FRAME_BYTES: usize = 512;

/// Prints every event it is handed and models channel state.
struct ConsolePlayer {
    inner: RecordingPlayer,
}

impl ConsolePlayer {
    fn new() -> Self {
        Self { inner: RecordingPlayer::new() }
    }

    fn report(&mut self) {
        for call in self.inner.calls() {
            match call {
                PlayerCall::SendMidi { tick, status, data1, data2 } => {
                    println!("  @{:6}  {:02x} {:02x} {:02x}", tick, status, data1, data2)
                }
                other => println!("  {:?}", other),
            }
        }
        self.inner.clear_calls();
    }
}

impl SeqPlayer for ConsolePlayer {
    fn attach_bank(&mut self, banks: &BankDirectory, control: &[u8], sample_table: u32) {
        self.inner.attach_bank(banks, control, sample_table);
        self.report();
    }
    fn set_sequence(&mut self, body: &[u8]) {
        self.inner.set_sequence(body);
        self.report();
    }
    fn play(&mut self) {
        self.inner.play();
        self.report();
    }
    fn stop(&mut self) {
        self.inner.stop();
        self.report();
    }
    fn position(&self) -> Tick {
        self.inner.position()
    }
    fn send_midi(&mut self, tick: Tick, status: u8, data1: u8, data2: u8) {
        self.inner.send_midi(tick, status, data1, data2);
        self.report();
    }
    fn tempo(&self) -> Tempo {
        self.inner.tempo()
    }
    fn set_tempo(&mut self, tempo: Tempo) {
        self.inner.set_tempo(tempo);
        self.report();
    }
    fn set_volume(&mut self, volume: u16) {
        self.inner.set_volume(volume);
        self.report();
    }
    fn channel_volume(&self, channel: Channel) -> u8 {
        self.inner.channel_volume(channel)
    }
    fn channel_program(&self, channel: Channel) -> u8 {
        self.inner.channel_program(channel)
    }
    fn fade_out(&mut self, duration_ms: u32) {
        self.inner.fade_out(duration_ms);
        self.report();
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 4 {
        eprintln!(
            "Usage: sb-cli <bank.ctl> <bank.tbl> <seq.sbk> [--frames capture.bin] [--config bridge.ron] [--ticks N]"
        );
        std::process::exit(1);
    }
    let option = |name: &str| {
        args.iter()
            .position(|a| a == name)
            .and_then(|i| args.get(i + 1))
            .cloned()
    };

    let config = match option("--config") {
        Some(path) => BridgeConfig::load(&path).unwrap_or_else(|e| {
            eprintln!("Failed to load {}: {}", path, e);
            std::process::exit(1);
        }),
        None => BridgeConfig::default(),
    };

    let ctl = read(&args[1]);
    let tbl = read(&args[2]);
    let sbk = read(&args[3]);
    let frames: Vec<Frame> = option("--frames")
        .map(|path| read(&path).chunks(FRAME_BYTES).map(Frame::from_packet).collect())
        .unwrap_or_default();

    let ticks: u64 = match option("--ticks") {
        Some(n) => n.parse().unwrap_or_else(|_| {
            eprintln!("--ticks expects a number, got {}", n);
            std::process::exit(1);
        }),
        None => frames.len() as u64 + 60,
    };

    let (storage, layout) = RomImage::assemble(&ctl, &tbl, &sbk).into_storage();
    let (mut host, link) = loopback(4);
    let mut bridge = Bridge::new(&config, layout, storage, ConsolePlayer::new(), link, ManualClock::new(0))
        .unwrap_or_else(|e| {
            eprintln!("Startup failed: {}", e);
            std::process::exit(1);
        });

    let sequences = bridge.engine().sequences();
    println!("Banks:     {}", bridge.engine().banks().count());
    println!("Sequences: {}", sequences.count());
    for (i, entry) in sequences.entries.iter().enumerate() {
        println!("  {:3}  offset {:#08x}  {:6} bytes", i, sequences.base + entry.offset, entry.len);
    }
    println!();

    let mut pending = frames.iter();
    let mut next = pending.next();
    for _ in 0..ticks {
        if let Some(frame) = next {
            if host.send_frame(frame) {
                next = pending.next();
            }
        }

        let advance = {
            let engine = bridge.engine();
            engine.tempo().seconds_to_ticks(FRAME_US as f64 / 1_000_000.0, engine.active().division)
        };
        bridge.engine_mut().player_mut().inner.advance(advance);
        bridge.device_clock_mut().advance(FRAME_US);

        match bridge.tick() {
            Some(FrameOutcome::Rejected(e)) => eprintln!("frame rejected: {}", e),
            Some(outcome) => log::debug!("{:?}", outcome),
            None => {}
        }
    }

    let stats = bridge.decoder_stats();
    println!();
    println!(
        "Frames: {} sessions, {} batches, {} events, {} ignored, {} rejected",
        stats.sessions, stats.batches, stats.events_sent, stats.ignored, stats.rejected
    );
    for (i, ch) in bridge.channels().iter().enumerate() {
        println!("ch{:2} v{:3} p{:3}", i, ch.volume, ch.program);
    }
}

fn read(path: &str) -> Vec<u8> {
    fs::read(path).unwrap_or_else(|e| {
        eprintln!("Failed to read {}: {}", path, e);
        std::process::exit(1);
    })
}
