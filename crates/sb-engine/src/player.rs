//! The playback engine seam.

use sb_ir::{classify, BankDirectory, Channel, MidiEventKind, Tempo, Tick, CC_CHANNEL_VOLUME, NUM_CHANNELS};

/// Operations the underlying sequence player provides.
///
/// The player renders events in non-decreasing tick order per channel and
/// never reorders submissions; callers only submit ticks at or after
/// [`SeqPlayer::position`].
pub trait SeqPlayer {
    /// Attach instrument banks. `control` is the staged bank control file.
    fn attach_bank(&mut self, banks: &BankDirectory, control: &[u8], sample_table: u32);
    /// Replace the sequence body and rewind to tick 0.
    fn set_sequence(&mut self, body: &[u8]);
    fn play(&mut self);
    fn stop(&mut self);
    /// Current transport position.
    fn position(&self) -> Tick;
    /// Schedule one event at `tick`.
    fn send_midi(&mut self, tick: Tick, status: u8, data1: u8, data2: u8);
    fn tempo(&self) -> Tempo;
    fn set_tempo(&mut self, tempo: Tempo);
    /// Master output volume (0..=0x7fff).
    fn set_volume(&mut self, volume: u16);
    fn channel_volume(&self, channel: Channel) -> u8;
    fn channel_program(&self, channel: Channel) -> u8;
    /// Ramp output to silence over `duration_ms`.
    fn fade_out(&mut self, duration_ms: u32);
}

/// Calls retained by [`RecordingPlayer`].
pub const RECORDING_CAPACITY: usize = 256;

/// One call observed by [`RecordingPlayer`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayerCall {
    AttachBank { banks: usize, control_len: usize, sample_table: u32 },
    SetSequence { len: usize },
    Play,
    Stop,
    SendMidi { tick: Tick, status: u8, data1: u8, data2: u8 },
    SetTempo(Tempo),
    SetVolume(u16),
    FadeOut(u32),
}

/// Channel volume after a program change in the modelled player.
const PROGRAM_CHANGE_VOLUME: u8 = 127;

/// A player that records calls and models channel state.
///
/// Event effects apply immediately on submission. A program change resets
/// the channel volume, as the hardware player does. Calls beyond
/// [`RECORDING_CAPACITY`] are counted but not retained; recording never
/// allocates.
#[derive(Debug)]
pub struct RecordingPlayer {
    calls: heapless::Vec<PlayerCall, RECORDING_CAPACITY>,
    overflowed: usize,
    playing: bool,
    position: Tick,
    tempo: Tempo,
    volumes: [u8; NUM_CHANNELS],
    programs: [u8; NUM_CHANNELS],
}

impl RecordingPlayer {
    pub fn new() -> Self {
        Self {
            calls: heapless::Vec::new(),
            overflowed: 0,
            playing: false,
            position: 0,
            tempo: Tempo::DEFAULT,
            volumes: [PROGRAM_CHANGE_VOLUME; NUM_CHANNELS],
            programs: [0; NUM_CHANNELS],
        }
    }

    pub fn calls(&self) -> &[PlayerCall] {
        &self.calls
    }

    /// Only the `SendMidi` calls, as `(tick, status, data1, data2)`.
    pub fn sent(&self) -> impl Iterator<Item = (Tick, u8, u8, u8)> + '_ {
        self.calls.iter().filter_map(|c| match *c {
            PlayerCall::SendMidi { tick, status, data1, data2 } => Some((tick, status, data1, data2)),
            _ => None,
        })
    }

    pub fn overflowed(&self) -> usize {
        self.overflowed
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
        self.overflowed = 0;
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Move the transport forward while playing.
    pub fn advance(&mut self, ticks: Tick) {
        if self.playing {
            self.position = self.position.saturating_add(ticks);
        }
    }

    fn record(&mut self, call: PlayerCall) {
        if self.calls.push(call).is_err() {
            self.overflowed += 1;
        }
    }
}

impl Default for RecordingPlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl SeqPlayer for RecordingPlayer {
    fn attach_bank(&mut self, banks: &BankDirectory, control: &[u8], sample_table: u32) {
        self.record(PlayerCall::AttachBank {
            banks: banks.count(),
            control_len: control.len(),
            sample_table,
        });
    }

    fn set_sequence(&mut self, body: &[u8]) {
        self.position = 0;
        self.record(PlayerCall::SetSequence { len: body.len() });
    }

    fn play(&mut self) {
        self.playing = true;
        self.record(PlayerCall::Play);
    }

    fn stop(&mut self) {
        self.playing = false;
        self.record(PlayerCall::Stop);
    }

    fn position(&self) -> Tick {
        self.position
    }

    fn send_midi(&mut self, tick: Tick, status: u8, data1: u8, data2: u8) {
        let ch = Channel::from_status(status).index();
        match classify(status) {
            MidiEventKind::ProgramChange => {
                self.programs[ch] = data1;
                self.volumes[ch] = PROGRAM_CHANGE_VOLUME;
            }
            MidiEventKind::ControlChange if data1 == CC_CHANNEL_VOLUME => {
                self.volumes[ch] = data2;
            }
            _ => {}
        }
        self.record(PlayerCall::SendMidi { tick, status, data1, data2 });
    }

    fn tempo(&self) -> Tempo {
        self.tempo
    }

    fn set_tempo(&mut self, tempo: Tempo) {
        self.tempo = tempo;
        self.record(PlayerCall::SetTempo(tempo));
    }

    fn set_volume(&mut self, volume: u16) {
        self.record(PlayerCall::SetVolume(volume));
    }

    fn channel_volume(&self, channel: Channel) -> u8 {
        self.volumes[channel.index()]
    }

    fn channel_program(&self, channel: Channel) -> u8 {
        self.programs[channel.index()]
    }

    fn fade_out(&mut self, duration_ms: u32) {
        self.record(PlayerCall::FadeOut(duration_ms));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn program_change_resets_volume() {
        let mut p = RecordingPlayer::new();
        let ch = Channel::new(3).unwrap();
        p.send_midi(0, 0xb3, CC_CHANNEL_VOLUME, 40);
        assert_eq!(p.channel_volume(ch), 40);
        p.send_midi(0, 0xc3, 9, 0);
        assert_eq!(p.channel_program(ch), 9);
        assert_eq!(p.channel_volume(ch), PROGRAM_CHANGE_VOLUME);
    }

    #[test]
    fn recording_is_bounded() {
        let mut p = RecordingPlayer::new();
        for _ in 0..RECORDING_CAPACITY + 5 {
            p.play();
        }
        assert_eq!(p.calls().len(), RECORDING_CAPACITY);
        assert_eq!(p.overflowed(), 5);
    }

    #[test]
    fn advance_only_while_playing() {
        let mut p = RecordingPlayer::new();
        p.advance(10);
        assert_eq!(p.position(), 0);
        p.play();
        p.advance(10);
        assert_eq!(p.position(), 10);
        p.set_sequence(&[]);
        assert_eq!(p.position(), 0);
    }
}
