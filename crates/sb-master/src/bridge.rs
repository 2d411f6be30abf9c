//! The process-wide bridge context.

use sb_engine::{
    AssetHeap, AssetStager, BulkStorage, ClockReconciler, DecoderStats, FrameOutcome, PlayState,
    RemoteEventDecoder, SeqPlayer, SequenceEngine,
};
use sb_formats::{BankFile, SeqBankFile};
use sb_ir::{wrap_next, wrap_prev, Channel, ChannelSnapshot, Tempo, NUM_CHANNELS};
use sb_link::{Link, Pause, SessionStats, ThreadPause, TransportSession};

use crate::clock::DeviceClock;
use crate::config::BridgeConfig;
use crate::error::BridgeError;
use crate::rom::AssetLayout;

/// Direction of a tempo nudge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TempoNudge {
    /// 80% of the current tempo
    Slower,
    /// 120% of the current tempo
    Faster,
}

/// Owns every piece of device state and runs the per-frame control path.
///
/// There is exactly one of these per process. `tick()` is the only entry
/// point the host's main loop needs; the remaining methods are the user
/// controls.
pub struct Bridge<P, S, L, C, Z = ThreadPause> {
    engine: SequenceEngine<P, S>,
    clock: ClockReconciler,
    decoder: RemoteEventDecoder,
    transport: TransportSession<L, Z>,
    device_clock: C,
    channels: [ChannelSnapshot; NUM_CHANNELS],
    fade_out_ms: u32,
    ticks: u64,
}

impl<P, S, L, C> Bridge<P, S, L, C, ThreadPause>
where
    P: SeqPlayer,
    S: BulkStorage,
    L: Link,
    C: DeviceClock,
{
    /// Stage assets and build the bridge, sleeping between link retries.
    pub fn new(
        config: &BridgeConfig,
        layout: AssetLayout,
        storage: S,
        player: P,
        link: L,
        device_clock: C,
    ) -> Result<Self, BridgeError> {
        Self::with_pacer(config, layout, storage, player, link, device_clock, ThreadPause)
    }
}

impl<P, S, L, C, Z> Bridge<P, S, L, C, Z>
where
    P: SeqPlayer,
    S: BulkStorage,
    L: Link,
    C: DeviceClock,
    Z: Pause,
{
    /// Stage assets and build the bridge.
    ///
    /// Loads the bank control directory and file, attaches them to the
    /// player, loads the sequence directory, reserves the body slot and
    /// stages sequence 0. Any failure here means the asset set does not fit
    /// the configured budget.
    pub fn with_pacer(
        config: &BridgeConfig,
        layout: AssetLayout,
        storage: S,
        mut player: P,
        link: L,
        device_clock: C,
        pacer: Z,
    ) -> Result<Self, BridgeError> {
        let mut stager = AssetStager::new(storage, AssetHeap::with_capacity(config.heap_bytes));

        let banks = stager.load_directory::<BankFile>(layout.bank_ctl_offset)?;
        let control = stager.load_body(layout.bank_ctl_offset, layout.bank_ctl_len)?;
        player.attach_bank(&banks, stager.bytes(control), layout.bank_table_offset);
        log::info!("attached {} instrument banks ({} byte control file)", banks.count(), control.len());

        let sequences = stager.load_directory::<SeqBankFile>(layout.seq_bank_offset)?;
        let oversized = sequences
            .entries
            .iter()
            .enumerate()
            .find(|(_, e)| e.transfer_len() as usize > config.body_slot_bytes);
        if let Some((index, entry)) = oversized {
            return Err(BridgeError::SlotTooSmall {
                index,
                required: entry.transfer_len() as usize,
                capacity: config.body_slot_bytes,
            });
        }
        let slot = stager.reserve_slot(config.body_slot_bytes)?;
        log::info!(
            "{} sequences, body slot {} bytes, heap {}/{} bytes used",
            sequences.count(),
            config.body_slot_bytes,
            stager.heap().used(),
            stager.heap().capacity()
        );

        let mut engine =
            SequenceEngine::new(player, stager, banks, sequences, slot, config.initial_volume)?;
        if config.autoplay {
            engine.play();
        }

        let mut bridge = Self {
            engine,
            clock: ClockReconciler::new(),
            decoder: RemoteEventDecoder::new(),
            transport: TransportSession::with_pacer(link, config.link.retry_policy(), pacer),
            device_clock,
            channels: [ChannelSnapshot::default(); NUM_CHANNELS],
            fade_out_ms: config.fade_out_ms,
            ticks: 0,
        };
        bridge.refresh_channels();
        Ok(bridge)
    }

    /// One application frame: poll the link, apply at most one frame, then
    /// refresh the channel cache.
    ///
    /// Never blocks beyond the link retry ceiling and never allocates.
    pub fn tick(&mut self) -> Option<FrameOutcome> {
        let outcome = match self.transport.poll_frame() {
            Some(frame) => {
                let now_us = self.device_clock.now_us();
                Some(self.decoder.process(&frame, now_us, &mut self.clock, &mut self.engine))
            }
            None => None,
        };
        self.refresh_channels();
        self.ticks += 1;
        outcome
    }

    fn refresh_channels(&mut self) {
        for ch in Channel::all() {
            self.channels[ch.index()] = ChannelSnapshot {
                volume: self.engine.channel_volume(ch),
                program: self.engine.channel_program(ch),
            };
        }
    }

    // --- User controls ---

    /// Stop, stage the next sequence (wrapping) and play it.
    pub fn next_sequence(&mut self) -> Result<usize, BridgeError> {
        let index = wrap_next(self.engine.active().index, self.engine.sequences().count());
        self.switch_to(index)
    }

    /// Stop, stage the previous sequence (wrapping) and play it.
    pub fn previous_sequence(&mut self) -> Result<usize, BridgeError> {
        let index = wrap_prev(self.engine.active().index, self.engine.sequences().count());
        self.switch_to(index)
    }

    fn switch_to(&mut self, index: usize) -> Result<usize, BridgeError> {
        self.engine.select_sequence(index)?;
        self.engine.play();
        Ok(index)
    }

    pub fn play(&mut self) {
        self.engine.play();
    }

    pub fn stop(&mut self) {
        self.engine.stop();
    }

    /// Stop then play, silencing hung notes.
    pub fn restart(&mut self) {
        log::info!("restart");
        self.engine.stop();
        self.engine.play();
    }

    pub fn nudge_tempo(&mut self, nudge: TempoNudge) -> Tempo {
        let tempo = match nudge {
            TempoNudge::Slower => self.engine.tempo().scaled_tenths(8),
            TempoNudge::Faster => self.engine.tempo().scaled_tenths(12),
        };
        self.engine.set_tempo(tempo);
        log::info!("tempo {:.2} bpm", tempo.bpm());
        tempo
    }

    pub fn fade_out(&mut self) {
        self.engine.fade_out(self.fade_out_ms);
    }

    // --- Observers ---

    /// Channel state as of the last `tick()`.
    pub fn channels(&self) -> &[ChannelSnapshot; NUM_CHANNELS] {
        &self.channels
    }

    pub fn state(&self) -> PlayState {
        self.engine.state()
    }

    pub fn active_index(&self) -> usize {
        self.engine.active().index
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn decoder_stats(&self) -> &DecoderStats {
        self.decoder.stats()
    }

    pub fn link_stats(&self) -> &SessionStats {
        self.transport.stats()
    }

    pub fn session_clock(&self) -> &ClockReconciler {
        &self.clock
    }

    pub fn engine(&self) -> &SequenceEngine<P, S> {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut SequenceEngine<P, S> {
        &mut self.engine
    }

    pub fn transport(&self) -> &TransportSession<L, Z> {
        &self.transport
    }

    pub fn device_clock(&self) -> &C {
        &self.device_clock
    }

    pub fn device_clock_mut(&mut self) -> &mut C {
        &mut self.device_clock
    }
}
