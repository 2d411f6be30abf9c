//! Two-phase staging of asset containers into the working heap.
//!
//! Directory headers are sized by a count field, so they are staged by
//! reading the fixed prefix first ([`AssetStager::probe`]) and then
//! allocating and reading exactly the header the count implies
//! ([`AssetStager::materialize`]). Sequence bodies go into one reserved
//! [`BodySlot`], the only heap region that is ever overwritten.

use core::fmt;
use core::marker::PhantomData;

use sb_formats::{Container, FormatError};

use crate::heap::{AssetHeap, HeapError, HeapHandle};
use crate::storage::{BulkStorage, StorageError};

/// Largest fixed prefix any container may declare.
const MAX_PREFIX_SIZE: usize = 16;

/// Staging errors. All of them are fatal at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageError {
    /// Heap capacity exceeded
    Heap(HeapError),
    /// Bulk storage read failed
    Storage(StorageError),
    /// A container header did not parse
    Format { container: &'static str, error: FormatError },
    /// A body does not fit the reserved sequence slot
    SlotOverflow { requested: usize, capacity: usize },
    /// The sequence bank lists no sequences
    EmptyDirectory,
}

impl fmt::Display for StageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageError::Heap(e) => write!(f, "{}", e),
            StageError::Storage(e) => write!(f, "{}", e),
            StageError::Format { container, error } => {
                write!(f, "{} header: {}", container, error)
            }
            StageError::SlotOverflow { requested, capacity } => write!(
                f,
                "sequence body of {} bytes exceeds slot capacity {}",
                requested, capacity
            ),
            StageError::EmptyDirectory => write!(f, "sequence bank has no sequences"),
        }
    }
}

impl std::error::Error for StageError {}

impl From<HeapError> for StageError {
    fn from(e: HeapError) -> Self {
        StageError::Heap(e)
    }
}

impl From<StorageError> for StageError {
    fn from(e: StorageError) -> Self {
        StageError::Storage(e)
    }
}

/// Result of reading a container's fixed prefix.
///
/// Carries the record count that [`AssetStager::materialize`] sizes its
/// allocation from.
#[derive(Debug)]
pub struct Probe<C: Container> {
    offset: u32,
    count: usize,
    _kind: PhantomData<C>,
}

impl<C: Container> Probe<C> {
    pub fn offset(&self) -> u32 {
        self.offset
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Exact number of bytes the full header occupies.
    pub fn header_size(&self) -> usize {
        C::header_size(self.count)
    }
}

/// The reusable heap region that holds the active sequence body.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BodySlot {
    region: HeapHandle,
    loaded: usize,
}

impl BodySlot {
    pub fn capacity(&self) -> usize {
        self.region.len()
    }

    /// The currently loaded body.
    pub fn loaded(&self) -> HeapHandle {
        self.region.prefix(self.loaded)
    }
}

/// Pulls containers from bulk storage into the asset heap.
pub struct AssetStager<S> {
    storage: S,
    heap: AssetHeap,
}

impl<S: BulkStorage> AssetStager<S> {
    pub fn new(storage: S, heap: AssetHeap) -> Self {
        Self { storage, heap }
    }

    pub fn heap(&self) -> &AssetHeap {
        &self.heap
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    pub fn bytes(&self, handle: HeapHandle) -> &[u8] {
        self.heap.bytes(handle)
    }

    /// Read only the fixed prefix at `offset` to learn the record count.
    pub fn probe<C: Container>(&mut self, offset: u32) -> Result<Probe<C>, StageError> {
        let format_err = |error| StageError::Format { container: C::NAME, error };
        if C::PREFIX_SIZE > MAX_PREFIX_SIZE {
            return Err(format_err(FormatError::InvalidHeader));
        }
        let mut buf = [0u8; MAX_PREFIX_SIZE];
        let prefix = &mut buf[..C::PREFIX_SIZE];
        self.storage.read(offset, prefix)?;
        let count = C::read_count(prefix).map_err(format_err)?;
        log::debug!("{} at {:#x}: {} records", C::NAME, offset, count);
        Ok(Probe { offset, count, _kind: PhantomData })
    }

    /// Allocate exactly the probed header size and read the full header.
    pub fn materialize<C: Container>(
        &mut self,
        probe: Probe<C>,
    ) -> Result<(C::Directory, HeapHandle), StageError> {
        let handle = self.heap.allocate(probe.header_size())?;
        self.storage.read(probe.offset, self.heap.bytes_mut(handle))?;
        let directory = C::parse(self.heap.bytes(handle), probe.offset)
            .map_err(|error| StageError::Format { container: C::NAME, error })?;
        Ok((directory, handle))
    }

    /// Stage a directory container: probe, then materialize.
    pub fn load_directory<C: Container>(&mut self, offset: u32) -> Result<C::Directory, StageError> {
        let probe = self.probe::<C>(offset)?;
        let size = probe.header_size();
        let (directory, _) = self.materialize(probe)?;
        log::info!("staged {} header ({} bytes) from {:#x}", C::NAME, size, offset);
        Ok(directory)
    }

    /// Allocate and read a body of `len` bytes, rounded up to even.
    pub fn load_body(&mut self, offset: u32, len: u32) -> Result<HeapHandle, StageError> {
        let size = transfer_len(len);
        let handle = self.heap.allocate(size)?;
        self.storage.read(offset, self.heap.bytes_mut(handle))?;
        log::info!("staged body ({} bytes) from {:#x}", size, offset);
        Ok(handle)
    }

    /// Reserve the replaceable sequence body region.
    pub fn reserve_slot(&mut self, capacity: usize) -> Result<BodySlot, StageError> {
        let region = self.heap.allocate(capacity)?;
        Ok(BodySlot { region, loaded: 0 })
    }

    /// Overwrite `slot` with the body at `offset`, rounded up to even.
    pub fn load_into_slot(
        &mut self,
        slot: &mut BodySlot,
        offset: u32,
        len: u32,
    ) -> Result<HeapHandle, StageError> {
        let size = transfer_len(len);
        if size > slot.capacity() {
            return Err(StageError::SlotOverflow { requested: size, capacity: slot.capacity() });
        }
        let target = slot.region.prefix(size);
        self.storage.read(offset, self.heap.bytes_mut(target))?;
        slot.loaded = size;
        Ok(target)
    }
}

/// Storage transfers move whole 16-bit units.
fn transfer_len(len: u32) -> usize {
    (len as usize + 1) & !1
}
