//! Fixed-size link frames.

use core::fmt;

/// Bytes per link frame (128 32-bit words).
pub const FRAME_SIZE: usize = 512;

/// Tag plus the `u32` event count that precede MIDI batch records.
pub const BATCH_HEADER_SIZE: usize = 8;

/// Bytes per MIDI record in a batch (timestamp, status, two data bytes, pad).
pub const RECORD_STRIDE: usize = 8;

/// Most records a single batch frame can carry.
pub const MAX_BATCH_EVENTS: usize = (FRAME_SIZE - BATCH_HEADER_SIZE) / RECORD_STRIDE;

/// A 4-byte command code at frame offset 0.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tag(pub [u8; 4]);

impl Tag {
    /// Session start: zero the clock at frame arrival.
    pub const SESSION_START: Tag = Tag(*b"MSTA");
    /// A batch of timestamped MIDI events.
    pub const MIDI_BATCH: Tag = Tag(*b"MMID");
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.0 {
            let c = if (32..127).contains(&b) { b as char } else { '_' };
            write!(f, "{}", c)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tag({})", self)
    }
}

/// One fixed-size unit read from the remote link.
#[derive(Clone, PartialEq, Eq)]
pub struct Frame {
    bytes: [u8; FRAME_SIZE],
}

impl Frame {
    /// An all-zero frame.
    pub const fn zeroed() -> Self {
        Self { bytes: [0; FRAME_SIZE] }
    }

    /// Build a frame from a packet, zero-padding short input.
    ///
    /// Input longer than `FRAME_SIZE` is truncated.
    pub fn from_packet(packet: &[u8]) -> Self {
        let mut frame = Self::zeroed();
        let n = packet.len().min(FRAME_SIZE);
        frame.bytes[..n].copy_from_slice(&packet[..n]);
        frame
    }

    pub fn as_bytes(&self) -> &[u8; FRAME_SIZE] {
        &self.bytes
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8; FRAME_SIZE] {
        &mut self.bytes
    }

    /// The command code at offset 0.
    pub fn tag(&self) -> Tag {
        Tag([self.bytes[0], self.bytes[1], self.bytes[2], self.bytes[3]])
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::zeroed()
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame").field("tag", &self.tag()).finish_non_exhaustive()
    }
}
