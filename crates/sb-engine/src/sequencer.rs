//! The active sequence and its player.

use sb_formats::{read_smf_header, DEFAULT_DIVISION};
use sb_ir::{
    classify, BankDirectory, Channel, MidiEventKind, SequenceDirectory, Tempo, Tick,
    CC_CHANNEL_VOLUME,
};

use crate::clock::TickMapper;
use crate::heap::HeapHandle;
use crate::player::SeqPlayer;
use crate::stager::{AssetStager, BodySlot, StageError};
use crate::storage::BulkStorage;

/// Transport state of the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayState {
    Stopped,
    Playing,
}

/// The currently staged sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActiveSequence {
    /// Index into the sequence directory
    pub index: usize,
    /// Staged body bytes (inside the body slot)
    pub body: HeapHandle,
    /// Ticks per quarter note
    pub division: u16,
}

/// Owns the directories, the single active sequence and the player.
///
/// All operations are synchronous on the one control path.
pub struct SequenceEngine<P, S> {
    player: P,
    stager: AssetStager<S>,
    banks: BankDirectory,
    sequences: SequenceDirectory,
    slot: BodySlot,
    active: ActiveSequence,
    state: PlayState,
    initial_volume: u16,
}

impl<P: SeqPlayer, S: BulkStorage> SequenceEngine<P, S> {
    /// Take ownership of staged assets and load sequence 0 (stopped).
    pub fn new(
        player: P,
        stager: AssetStager<S>,
        banks: BankDirectory,
        sequences: SequenceDirectory,
        slot: BodySlot,
        initial_volume: u16,
    ) -> Result<Self, StageError> {
        if sequences.is_empty() {
            return Err(StageError::EmptyDirectory);
        }
        let mut engine = Self {
            player,
            stager,
            banks,
            sequences,
            slot,
            active: ActiveSequence { index: 0, body: HeapHandle::default(), division: DEFAULT_DIVISION },
            state: PlayState::Stopped,
            initial_volume,
        };
        engine.select_sequence(0)?;
        Ok(engine)
    }

    // --- Sequence selection ---

    /// Stop, stage sequence `index` into the body slot and rewind. Leaves
    /// playback stopped.
    ///
    /// Callers wrap the index first; an out-of-range index is a bug.
    pub fn select_sequence(&mut self, index: usize) -> Result<(), StageError> {
        assert!(
            index < self.sequences.count(),
            "sequence index {} out of range (count {})",
            index,
            self.sequences.count()
        );
        self.stop();

        let Some((offset, len)) = self.sequences.location(index) else {
            return Err(StageError::EmptyDirectory);
        };
        let body = self.stager.load_into_slot(&mut self.slot, offset, len)?;
        let bytes = self.stager.bytes(body);
        let division = match read_smf_header(bytes) {
            Ok(header) => header.division,
            Err(e) => {
                log::warn!(
                    "sequence {}: no usable MThd header ({}), assuming division {}",
                    index, e, DEFAULT_DIVISION
                );
                DEFAULT_DIVISION
            }
        };

        self.player.set_sequence(bytes);
        self.player.set_volume(self.initial_volume);
        self.active = ActiveSequence { index, body, division };
        log::info!("selected sequence {} ({} bytes, division {})", index, len, division);
        Ok(())
    }

    pub fn active(&self) -> &ActiveSequence {
        &self.active
    }

    pub fn sequences(&self) -> &SequenceDirectory {
        &self.sequences
    }

    pub fn banks(&self) -> &BankDirectory {
        &self.banks
    }

    /// Bytes of the active sequence body.
    pub fn body(&self) -> &[u8] {
        self.stager.bytes(self.active.body)
    }

    pub fn stager(&self) -> &AssetStager<S> {
        &self.stager
    }

    // --- Transport ---

    pub fn play(&mut self) {
        if self.state == PlayState::Stopped {
            self.player.play();
            self.state = PlayState::Playing;
        }
    }

    pub fn stop(&mut self) {
        if self.state == PlayState::Playing {
            self.player.stop();
            self.state = PlayState::Stopped;
        }
    }

    pub fn state(&self) -> PlayState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlayState::Playing
    }

    pub fn position(&self) -> Tick {
        self.player.position()
    }

    // --- Events ---

    /// Forward one event at `tick`.
    ///
    /// A program change resets channel volume inside the player, so it is
    /// followed at the same tick by a volume controller restoring the
    /// volume observed before the change.
    pub fn send_event(&mut self, tick: Tick, status: u8, data1: u8, data2: u8) {
        if classify(status) != MidiEventKind::ProgramChange {
            self.player.send_midi(tick, status, data1, data2);
            return;
        }
        let channel = Channel::from_status(status);
        let volume = self.player.channel_volume(channel);
        self.player.send_midi(tick, status, data1, data2);
        self.player.send_midi(tick, 0xb0 | channel.as_u8(), CC_CHANNEL_VOLUME, volume);
    }

    // --- Live state ---

    pub fn tempo(&self) -> Tempo {
        self.player.tempo()
    }

    pub fn set_tempo(&mut self, tempo: Tempo) {
        self.player.set_tempo(tempo);
    }

    pub fn channel_volume(&self, channel: Channel) -> u8 {
        self.player.channel_volume(channel)
    }

    pub fn channel_program(&self, channel: Channel) -> u8 {
        self.player.channel_program(channel)
    }

    /// Fire-and-forget fade to silence.
    pub fn fade_out(&mut self, duration_ms: u32) {
        self.player.fade_out(duration_ms);
    }

    pub fn player(&self) -> &P {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut P {
        &mut self.player
    }
}

impl<P: SeqPlayer, S: BulkStorage> TickMapper for SequenceEngine<P, S> {
    /// Uses the live tempo and the active sequence's division.
    fn seconds_to_ticks(&self, seconds: f64) -> Tick {
        self.player.tempo().seconds_to_ticks(seconds, self.active.division)
    }
}
