//! Container and frame codecs for seqbridge.
//!
//! Parses the sequence bank and bank control directories staged from
//! bulk storage, the Standard MIDI File header of sequence bodies, and the
//! fixed-size frames exchanged over the remote link. All layouts are
//! big-endian and must match the producing tools byte for byte.

mod container;
mod frame_codec;
mod smf;

pub use container::{BankFile, Container, SeqBankFile, DIRECTORY_PREFIX_SIZE};
pub use frame_codec::{decode_frame, encode_midi_batch, encode_session_start, Command};
pub use smf::{read_smf_header, SmfHeader, DEFAULT_DIVISION};

use core::fmt;

/// Error type for format parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// Invalid header fields
    InvalidHeader,
    /// Unexpected end of data
    UnexpectedEof,
    /// Unsupported format revision
    UnsupportedVersion([u8; 2]),
    /// A count field was negative
    NegativeCount(i32),
    /// A batch frame claims more records than a frame can hold
    BatchOverflow(u32),
    /// I/O error
    Io(String),
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatError::InvalidHeader => write!(f, "invalid header"),
            FormatError::UnexpectedEof => write!(f, "unexpected end of data"),
            FormatError::UnsupportedVersion(rev) => write!(
                f,
                "unsupported revision {:?}",
                String::from_utf8_lossy(rev)
            ),
            FormatError::NegativeCount(n) => write!(f, "negative count {}", n),
            FormatError::BatchOverflow(n) => {
                write!(f, "batch count {} exceeds frame capacity", n)
            }
            FormatError::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for FormatError {}

impl From<binrw::Error> for FormatError {
    fn from(err: binrw::Error) -> Self {
        if err.is_eof() {
            return FormatError::UnexpectedEof;
        }
        match err {
            binrw::Error::Io(e) => FormatError::Io(e.to_string()),
            _ => FormatError::InvalidHeader,
        }
    }
}
