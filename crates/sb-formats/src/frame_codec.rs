//! Link frame decoding and host-side encoding.

use binrw::{binrw, BinReaderExt, BinWriterExt};
use sb_ir::{
    Frame, MidiBatch, MidiMessage, Tag, BATCH_HEADER_SIZE, MAX_BATCH_EVENTS, RECORD_STRIDE,
};
use std::io::Cursor;

use crate::FormatError;

/// One MIDI record as laid out on the wire (8-byte stride).
#[binrw]
#[brw(big)]
#[derive(Debug, Clone, Copy)]
struct WireRecord {
    time_us: u32,
    status: u8,
    data1: u8,
    #[brw(pad_after = 1)]
    data2: u8,
}

impl From<WireRecord> for MidiMessage {
    fn from(r: WireRecord) -> Self {
        MidiMessage::new(r.time_us, r.status, r.data1, r.data2)
    }
}

impl From<&MidiMessage> for WireRecord {
    fn from(m: &MidiMessage) -> Self {
        Self { time_us: m.time_us, status: m.status, data1: m.data1, data2: m.data2 }
    }
}

/// A decoded link command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Zero the session clock at arrival time
    SessionStart,
    /// Timestamped events, in frame order
    MidiBatch(MidiBatch),
    /// Any other tag; ignored by the receiver
    Unknown(Tag),
}

/// Decode one frame.
///
/// A batch whose count exceeds `MAX_BATCH_EVENTS` is rejected whole;
/// no partial batch is ever returned.
pub fn decode_frame(frame: &Frame) -> Result<Command, FormatError> {
    match frame.tag() {
        Tag::SESSION_START => Ok(Command::SessionStart),
        Tag::MIDI_BATCH => decode_batch(frame).map(Command::MidiBatch),
        other => Ok(Command::Unknown(other)),
    }
}

fn decode_batch(frame: &Frame) -> Result<MidiBatch, FormatError> {
    let mut cur = Cursor::new(&frame.as_bytes()[4..]);
    let count: u32 = cur.read_be()?;
    if count as usize > MAX_BATCH_EVENTS {
        return Err(FormatError::BatchOverflow(count));
    }

    let mut batch = MidiBatch::new();
    for _ in 0..count {
        let rec: WireRecord = cur.read_be()?;
        batch.push(rec.into());
    }
    Ok(batch)
}

/// A session start frame.
pub fn encode_session_start() -> Frame {
    Frame::from_packet(&Tag::SESSION_START.0)
}

/// Pack as many events as fit into one batch frame.
///
/// Returns the frame and how many leading events it carries; the caller
/// resends the remainder in a later frame.
pub fn encode_midi_batch(events: &[MidiMessage]) -> Result<(Frame, usize), FormatError> {
    let n = events.len().min(MAX_BATCH_EVENTS);
    let mut frame = Frame::zeroed();
    {
        let mut cur = Cursor::new(&mut frame.as_bytes_mut()[..]);
        cur.write_be(&Tag::MIDI_BATCH.0)?;
        cur.write_be(&(n as u32))?;
        for event in &events[..n] {
            cur.write_be(&WireRecord::from(event))?;
        }
        debug_assert_eq!(cur.position() as usize, BATCH_HEADER_SIZE + n * RECORD_STRIDE);
    }
    Ok((frame, n))
}
