//! MIDI event records and status-byte classification.

use arrayvec::ArrayVec;

use crate::channel::Channel;
use crate::frame::MAX_BATCH_EVENTS;

/// Controller number for channel volume.
pub const CC_CHANNEL_VOLUME: u8 = 7;

/// One timestamped event from a MIDI batch frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MidiMessage {
    /// Host microseconds since the host started the session
    pub time_us: u32,
    pub status: u8,
    pub data1: u8,
    pub data2: u8,
}

impl MidiMessage {
    pub const fn new(time_us: u32, status: u8, data1: u8, data2: u8) -> Self {
        Self { time_us, status, data1, data2 }
    }

    /// The event's classification by status high nibble.
    pub fn kind(&self) -> MidiEventKind {
        classify(self.status)
    }

    /// Channel from the status low nibble.
    pub fn channel(&self) -> Channel {
        Channel::from_status(self.status)
    }
}

/// Records of one batch frame, in array order.
pub type MidiBatch = ArrayVec<MidiMessage, MAX_BATCH_EVENTS>;

/// Closed set of event kinds the decoder distinguishes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MidiEventKind {
    ControlChange,
    ProgramChange,
    NoteOn,
    NoteOff,
    Other,
}

impl MidiEventKind {
    /// Short fixed-width label for event traces.
    pub fn label(self) -> &'static str {
        match self {
            MidiEventKind::ControlChange => "cc     ",
            MidiEventKind::ProgramChange => "progch ",
            MidiEventKind::NoteOn => "noteon ",
            MidiEventKind::NoteOff => "noteoff",
            MidiEventKind::Other => "other  ",
        }
    }
}

/// Classify a status byte by its high nibble.
pub fn classify(status: u8) -> MidiEventKind {
    match status >> 4 {
        0xb => MidiEventKind::ControlChange,
        0xc => MidiEventKind::ProgramChange,
        0x9 => MidiEventKind::NoteOn,
        0x8 => MidiEventKind::NoteOff,
        _ => MidiEventKind::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_by_high_nibble() {
        assert_eq!(classify(0xb3), MidiEventKind::ControlChange);
        assert_eq!(classify(0xc0), MidiEventKind::ProgramChange);
        assert_eq!(classify(0x9f), MidiEventKind::NoteOn);
        assert_eq!(classify(0x81), MidiEventKind::NoteOff);
        assert_eq!(classify(0xe0), MidiEventKind::Other);
        assert_eq!(classify(0xf8), MidiEventKind::Other);
        assert_eq!(classify(0x40), MidiEventKind::Other);
    }

    #[test]
    fn channel_from_low_nibble() {
        let msg = MidiMessage::new(0, 0xc5, 12, 0);
        assert_eq!(msg.channel().index(), 5);
        assert_eq!(msg.kind(), MidiEventKind::ProgramChange);
    }
}
