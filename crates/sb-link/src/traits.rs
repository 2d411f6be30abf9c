//! Link and pacing traits.

use std::time::Duration;

/// Error type for link reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkError {
    /// The read did not complete in time; try again
    Timeout,
    /// The other side went away
    Disconnected,
}

impl std::fmt::Display for LinkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LinkError::Timeout => write!(f, "link read timed out"),
            LinkError::Disconnected => write!(f, "link disconnected"),
        }
    }
}

impl std::error::Error for LinkError {}

/// The physical link primitives.
pub trait Link {
    /// Non-blocking check for pending receive data.
    fn data_ready(&mut self) -> bool;

    /// Read up to `buf.len()` bytes, returning how many arrived.
    ///
    /// May return fewer bytes than requested; `Err(Timeout)` means nothing
    /// arrived within the link's own read timeout.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, LinkError>;
}

impl<T: Link + ?Sized> Link for &mut T {
    fn data_ready(&mut self) -> bool {
        (**self).data_ready()
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, LinkError> {
        (**self).read(buf)
    }
}

/// Cooperative yield between read retries.
pub trait Pause {
    fn pause(&mut self, interval: Duration);
}

/// Yields by sleeping the current thread.
#[derive(Clone, Copy, Debug, Default)]
pub struct ThreadPause;

impl Pause for ThreadPause {
    fn pause(&mut self, interval: Duration) {
        std::thread::sleep(interval);
    }
}

/// Counts pauses without waiting (tests, offline replay).
#[derive(Clone, Copy, Debug, Default)]
pub struct NoPause {
    pub count: u32,
}

impl Pause for NoPause {
    fn pause(&mut self, _interval: Duration) {
        self.count += 1;
    }
}
