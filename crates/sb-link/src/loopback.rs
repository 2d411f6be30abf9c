//! In-process link pair for the host side of the bridge.
//!
//! Host packets are padded to a full frame and pushed through a lock-free
//! byte ring, so the device side sees exactly what a USB bulk pipe would
//! deliver.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use ringbuf::traits::{Consumer, Observer, Producer, Split};
use ringbuf::{HeapCons, HeapProd, HeapRb};
use sb_ir::{Frame, FRAME_SIZE};

use crate::traits::{Link, LinkError};

/// Create a connected host/device pair holding up to `frames` whole frames.
pub fn loopback(frames: usize) -> (HostEnd, LoopbackLink) {
    let rb = HeapRb::<u8>::new(frames.max(1) * FRAME_SIZE);
    let (producer, consumer) = rb.split();
    let closed = Arc::new(AtomicBool::new(false));
    (
        HostEnd { producer, closed: Arc::clone(&closed) },
        LoopbackLink { consumer, closed, chunk: FRAME_SIZE },
    )
}

/// The host (sending) side.
pub struct HostEnd {
    producer: HeapProd<u8>,
    closed: Arc<AtomicBool>,
}

impl HostEnd {
    /// Queue one packet, zero-padded or truncated to a frame.
    ///
    /// Returns false without writing anything if the ring lacks room.
    pub fn send_packet(&mut self, packet: &[u8]) -> bool {
        self.send_frame(&Frame::from_packet(packet))
    }

    pub fn send_frame(&mut self, frame: &Frame) -> bool {
        if self.producer.vacant_len() < FRAME_SIZE {
            return false;
        }
        self.producer.push_slice(frame.as_bytes());
        true
    }

    /// Queue raw bytes with no framing; returns how many fit.
    pub fn send_raw(&mut self, bytes: &[u8]) -> usize {
        self.producer.push_slice(bytes)
    }

    pub fn pending(&self) -> usize {
        self.producer.occupied_len()
    }
}

impl Drop for HostEnd {
    fn drop(&mut self) {
        self.closed.store(true, Ordering::Release);
    }
}

/// The device (receiving) side.
pub struct LoopbackLink {
    consumer: HeapCons<u8>,
    closed: Arc<AtomicBool>,
    chunk: usize,
}

impl LoopbackLink {
    /// Cap each read at `chunk` bytes to exercise partial-frame assembly.
    pub fn with_chunk_limit(mut self, chunk: usize) -> Self {
        self.chunk = chunk.max(1);
        self
    }

    pub fn available(&self) -> usize {
        self.consumer.occupied_len()
    }
}

impl Link for LoopbackLink {
    fn data_ready(&mut self) -> bool {
        !self.consumer.is_empty()
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, LinkError> {
        if self.consumer.is_empty() {
            if self.closed.load(Ordering::Acquire) {
                return Err(LinkError::Disconnected);
            }
            return Err(LinkError::Timeout);
        }
        let n = buf.len().min(self.chunk);
        Ok(self.consumer.pop_slice(&mut buf[..n]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packet_is_padded_to_frame() {
        let (mut host, mut dev) = loopback(2);
        assert!(!dev.data_ready());
        assert!(host.send_packet(b"MSTA"));
        assert_eq!(host.pending(), FRAME_SIZE);
        assert!(dev.data_ready());

        let mut buf = [0xffu8; FRAME_SIZE];
        assert_eq!(dev.read(&mut buf), Ok(FRAME_SIZE));
        assert_eq!(&buf[..4], b"MSTA");
        assert!(buf[4..].iter().all(|&b| b == 0));
    }

    #[test]
    fn full_ring_rejects_whole_frame() {
        let (mut host, _dev) = loopback(1);
        assert!(host.send_packet(b"MSTA"));
        assert!(!host.send_packet(b"MSTA"));
        assert_eq!(host.pending(), FRAME_SIZE);
    }

    #[test]
    fn chunk_limit_caps_reads() {
        let (mut host, dev) = loopback(1);
        let mut dev = dev.with_chunk_limit(100);
        host.send_packet(b"MMID");
        let mut buf = [0u8; FRAME_SIZE];
        assert_eq!(dev.read(&mut buf), Ok(100));
        assert_eq!(dev.available(), FRAME_SIZE - 100);
    }

    #[test]
    fn empty_read_times_out_then_disconnects() {
        let (host, mut dev) = loopback(1);
        let mut buf = [0u8; 4];
        assert_eq!(dev.read(&mut buf), Err(LinkError::Timeout));
        drop(host);
        assert_eq!(dev.read(&mut buf), Err(LinkError::Disconnected));
    }
}
