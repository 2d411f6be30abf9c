//! Bulk storage access.

use core::fmt;

/// Storage read errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// The read extends past the end of the medium
    OutOfRange { offset: u32, len: usize, size: usize },
    /// Underlying device error
    Io(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::OutOfRange { offset, len, size } => write!(
                f,
                "read of {} bytes at {:#x} exceeds storage size {:#x}",
                len, offset, size
            ),
            StorageError::Io(msg) => write!(f, "storage I/O error: {}", msg),
        }
    }
}

impl std::error::Error for StorageError {}

/// Synchronous, coarse-grained reads from the asset medium.
pub trait BulkStorage {
    /// Fill `buf` with the bytes at `offset`.
    fn read(&mut self, offset: u32, buf: &mut [u8]) -> Result<(), StorageError>;
}

impl<T: BulkStorage + ?Sized> BulkStorage for &mut T {
    fn read(&mut self, offset: u32, buf: &mut [u8]) -> Result<(), StorageError> {
        (**self).read(offset, buf)
    }
}

/// Reads retained by [`MemoryStorage`].
pub const READ_LOG_CAPACITY: usize = 64;

/// One recorded read against [`MemoryStorage`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StorageRead {
    pub offset: u32,
    pub len: usize,
}

/// Storage backed by an in-memory image.
///
/// The first [`READ_LOG_CAPACITY`] reads are recorded; later ones are only
/// counted, so the log never grows after startup.
#[derive(Clone, Debug, Default)]
pub struct MemoryStorage {
    data: Vec<u8>,
    reads: heapless::Vec<StorageRead, READ_LOG_CAPACITY>,
    unlogged: usize,
}

impl MemoryStorage {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data, reads: heapless::Vec::new(), unlogged: 0 }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Reads issued so far, oldest first.
    pub fn reads(&self) -> &[StorageRead] {
        &self.reads
    }

    /// Reads made after the log filled up.
    pub fn unlogged_reads(&self) -> usize {
        self.unlogged
    }

    pub fn clear_reads(&mut self) {
        self.reads.clear();
        self.unlogged = 0;
    }
}

impl BulkStorage for MemoryStorage {
    fn read(&mut self, offset: u32, buf: &mut [u8]) -> Result<(), StorageError> {
        let start = offset as usize;
        let end = start.checked_add(buf.len()).filter(|&e| e <= self.data.len());
        let Some(end) = end else {
            return Err(StorageError::OutOfRange { offset, len: buf.len(), size: self.data.len() });
        };
        buf.copy_from_slice(&self.data[start..end]);
        if self.reads.push(StorageRead { offset, len: buf.len() }).is_err() {
            self.unlogged += 1;
        }
        Ok(())
    }
}
