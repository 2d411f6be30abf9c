//! Asset directories staged from bulk storage.

use alloc::vec::Vec;

/// Location of one sequence body in the sequence bank.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SeqEntry {
    /// Offset from the start of the sequence bank file
    pub offset: u32,
    /// Body length in bytes (may be odd)
    pub len: u32,
}

impl SeqEntry {
    /// Length rounded up to whole 16-bit transfer units.
    pub const fn transfer_len(&self) -> u32 {
        self.len + (self.len & 1)
    }
}

/// Header of a sequence bank: where each sequence lives.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SequenceDirectory {
    /// Storage offset of the sequence bank file
    pub base: u32,
    pub entries: Vec<SeqEntry>,
}

impl SequenceDirectory {
    pub fn new(base: u32, entries: Vec<SeqEntry>) -> Self {
        Self { base, entries }
    }

    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&SeqEntry> {
        self.entries.get(index)
    }

    /// Absolute storage offset and length of sequence `index`.
    pub fn location(&self, index: usize) -> Option<(u32, u32)> {
        self.entries
            .get(index)
            .map(|e| (self.base.wrapping_add(e.offset), e.len))
    }

    /// Largest transfer length of any entry (the body slot must hold this).
    pub fn max_transfer_len(&self) -> u32 {
        self.entries.iter().map(SeqEntry::transfer_len).max().unwrap_or(0)
    }
}

/// Index of instrument banks in a bank control file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BankDirectory {
    /// Storage offset of the bank control file
    pub base: u32,
    /// Per-bank offsets, relative to `base`
    pub offsets: Vec<u32>,
}

impl BankDirectory {
    pub fn new(base: u32, offsets: Vec<u32>) -> Self {
        Self { base, offsets }
    }

    pub fn count(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }
}

/// Advance `index` by one, wrapping to 0 past `count - 1`.
pub fn wrap_next(index: usize, count: usize) -> usize {
    if count == 0 {
        return 0;
    }
    (index + 1) % count
}

/// Step `index` back by one, wrapping to `count - 1` below 0.
pub fn wrap_prev(index: usize, count: usize) -> usize {
    if count == 0 {
        return 0;
    }
    if index == 0 { count - 1 } else { (index - 1).min(count - 1) }
}
