//! Bump-allocated working heap for staged assets.

use core::fmt;

/// A region handed out by [`AssetHeap::allocate`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HeapHandle {
    offset: usize,
    len: usize,
}

impl HeapHandle {
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The first `len` bytes of this region (clamped to its size).
    pub fn prefix(self, len: usize) -> HeapHandle {
        HeapHandle { offset: self.offset, len: len.min(self.len) }
    }
}

/// Heap allocation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeapError {
    /// The request does not fit in the remaining capacity
    Exhausted { requested: usize, remaining: usize },
}

impl fmt::Display for HeapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeapError::Exhausted { requested, remaining } => write!(
                f,
                "asset heap exhausted: requested {} bytes, {} remaining",
                requested, remaining
            ),
        }
    }
}

impl std::error::Error for HeapError {}

/// Fixed-capacity arena. Allocations only grow forward and are never freed.
pub struct AssetHeap {
    mem: Vec<u8>,
    used: usize,
}

impl AssetHeap {
    /// Reserve the whole region up front.
    pub fn with_capacity(capacity: usize) -> Self {
        Self { mem: vec![0; capacity], used: 0 }
    }

    pub fn capacity(&self) -> usize {
        self.mem.len()
    }

    pub fn used(&self) -> usize {
        self.used
    }

    pub fn remaining(&self) -> usize {
        self.mem.len() - self.used
    }

    /// Bump-allocate exactly `size` bytes.
    pub fn allocate(&mut self, size: usize) -> Result<HeapHandle, HeapError> {
        if size > self.remaining() {
            return Err(HeapError::Exhausted { requested: size, remaining: self.remaining() });
        }
        let handle = HeapHandle { offset: self.used, len: size };
        self.used += size;
        log::debug!("heap: +{} bytes ({}/{})", size, self.used, self.capacity());
        Ok(handle)
    }

    pub fn bytes(&self, handle: HeapHandle) -> &[u8] {
        &self.mem[handle.offset..handle.offset + handle.len]
    }

    pub fn bytes_mut(&mut self, handle: HeapHandle) -> &mut [u8] {
        &mut self.mem[handle.offset..handle.offset + handle.len]
    }
}

impl fmt::Debug for AssetHeap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetHeap")
            .field("used", &self.used)
            .field("capacity", &self.capacity())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocations_are_contiguous() {
        let mut heap = AssetHeap::with_capacity(64);
        let a = heap.allocate(10).unwrap();
        let b = heap.allocate(6).unwrap();
        assert_eq!(a.offset(), 0);
        assert_eq!(b.offset(), 10);
        assert_eq!(heap.used(), 16);
        assert_eq!(heap.remaining(), 48);
    }

    #[test]
    fn exact_fit_succeeds() {
        let mut heap = AssetHeap::with_capacity(32);
        heap.allocate(32).unwrap();
        assert_eq!(heap.remaining(), 0);
        assert!(heap.allocate(0).is_ok());
    }

    #[test]
    fn overflow_is_reported_and_leaves_heap_untouched() {
        let mut heap = AssetHeap::with_capacity(16);
        heap.allocate(10).unwrap();
        assert_eq!(
            heap.allocate(7),
            Err(HeapError::Exhausted { requested: 7, remaining: 6 })
        );
        assert_eq!(heap.used(), 10);
    }

    #[test]
    fn regions_do_not_alias() {
        let mut heap = AssetHeap::with_capacity(8);
        let a = heap.allocate(4).unwrap();
        let b = heap.allocate(4).unwrap();
        heap.bytes_mut(a).fill(0xaa);
        heap.bytes_mut(b).fill(0x55);
        assert_eq!(heap.bytes(a), &[0xaa; 4]);
        assert_eq!(heap.bytes(b), &[0x55; 4]);
    }

    #[test]
    fn prefix_clamps_to_region() {
        let mut heap = AssetHeap::with_capacity(8);
        let a = heap.allocate(8).unwrap();
        assert_eq!(a.prefix(3).len(), 3);
        assert_eq!(a.prefix(100).len(), 8);
    }
}
