//! Sequence bank (`.sbk`) and bank control (`.ctl`) directory layouts.
//!
//! Both files open with a 2-byte revision and a signed 16-bit count,
//! followed by `count` fixed-size records. The full header size is only
//! known once the count has been read, which is why staging happens in
//! two reads.

use binrw::{BinRead, BinReaderExt};
use sb_ir::{BankDirectory, SeqEntry, SequenceDirectory};
use std::io::Cursor;

use crate::FormatError;

/// Revision plus count.
pub const DIRECTORY_PREFIX_SIZE: usize = 4;

#[derive(BinRead, Debug, Clone, Copy)]
#[br(big)]
struct DirectoryPrefix {
    revision: [u8; 2],
    count: i16,
}

#[derive(BinRead, Debug, Clone, Copy)]
#[br(big)]
struct SeqRecord {
    offset: u32,
    len: i32,
}

/// A directory container whose size depends on its count field.
pub trait Container {
    /// Parsed directory type.
    type Directory;

    /// Short name for diagnostics.
    const NAME: &'static str;
    /// Expected revision bytes.
    const REVISION: [u8; 2];
    /// Bytes before the first record.
    const PREFIX_SIZE: usize = DIRECTORY_PREFIX_SIZE;
    /// Bytes per record.
    const RECORD_SIZE: usize;

    /// Exact header size for `count` records.
    fn header_size(count: usize) -> usize {
        Self::PREFIX_SIZE + count * Self::RECORD_SIZE
    }

    /// Validate the revision and read the record count from the prefix.
    fn read_count(prefix: &[u8]) -> Result<usize, FormatError> {
        let mut cur = Cursor::new(prefix);
        let p: DirectoryPrefix = cur.read_be()?;
        if p.revision != Self::REVISION {
            return Err(FormatError::UnsupportedVersion(p.revision));
        }
        if p.count < 0 {
            return Err(FormatError::NegativeCount(p.count as i32));
        }
        Ok(p.count as usize)
    }

    /// Parse a complete header staged from storage offset `base`.
    fn parse(header: &[u8], base: u32) -> Result<Self::Directory, FormatError>;
}

/// Sequence bank file: `"S1"`, count, then `{u32 offset, i32 len}` records.
pub struct SeqBankFile;

impl Container for SeqBankFile {
    type Directory = SequenceDirectory;

    const NAME: &'static str = "sequence bank";
    const REVISION: [u8; 2] = *b"S1";
    const RECORD_SIZE: usize = 8;

    fn parse(header: &[u8], base: u32) -> Result<SequenceDirectory, FormatError> {
        let count = Self::read_count(header)?;
        if header.len() < Self::header_size(count) {
            return Err(FormatError::UnexpectedEof);
        }
        let mut cur = Cursor::new(&header[Self::PREFIX_SIZE..]);
        let mut entries = Vec::with_capacity(count);
        for _ in 0..count {
            let rec = SeqRecord::read_be(&mut cur)?;
            if rec.len < 0 {
                return Err(FormatError::NegativeCount(rec.len));
            }
            entries.push(SeqEntry { offset: rec.offset, len: rec.len as u32 });
        }
        Ok(SequenceDirectory::new(base, entries))
    }
}

/// Bank control file: `"B1"`, count, then `i32` bank offsets.
pub struct BankFile;

impl Container for BankFile {
    type Directory = BankDirectory;

    const NAME: &'static str = "bank control";
    const REVISION: [u8; 2] = *b"B1";
    const RECORD_SIZE: usize = 4;

    fn parse(header: &[u8], base: u32) -> Result<BankDirectory, FormatError> {
        let count = Self::read_count(header)?;
        if header.len() < Self::header_size(count) {
            return Err(FormatError::UnexpectedEof);
        }
        let mut cur = Cursor::new(&header[Self::PREFIX_SIZE..]);
        let mut offsets = Vec::with_capacity(count);
        for _ in 0..count {
            let offset: i32 = cur.read_be()?;
            if offset < 0 {
                return Err(FormatError::InvalidHeader);
            }
            offsets.push(offset as u32);
        }
        Ok(BankDirectory::new(base, offsets))
    }
}
