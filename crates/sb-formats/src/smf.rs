//! Standard MIDI File header of a staged sequence body.

use binrw::{BinRead, BinReaderExt};
use std::io::Cursor;

use crate::FormatError;

/// Ticks per quarter note assumed when a body carries no usable header.
pub const DEFAULT_DIVISION: u16 = 96;

/// The `MThd` chunk.
#[derive(BinRead, Debug, Clone, Copy, PartialEq, Eq)]
#[br(big, magic = b"MThd")]
pub struct SmfHeader {
    pub len: u32,
    pub format: u16,
    pub tracks: u16,
    pub division: u16,
}

/// Read the header and validate the division is metrical (ticks per quarter).
pub fn read_smf_header(body: &[u8]) -> Result<SmfHeader, FormatError> {
    let mut cur = Cursor::new(body);
    let header: SmfHeader = cur.read_be()?;
    if header.len < 6 || header.division == 0 || header.division & 0x8000 != 0 {
        return Err(FormatError::InvalidHeader);
    }
    Ok(header)
}
