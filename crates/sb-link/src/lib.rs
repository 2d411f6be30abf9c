//! Link transport for seqbridge.
//!
//! Polls a half-duplex link once per application frame and assembles
//! fixed-size frames with a bounded retry loop.

mod loopback;
mod session;
mod traits;

pub use loopback::{loopback, HostEnd, LoopbackLink};
pub use session::{RetryPolicy, SessionStats, TransportSession};
pub use traits::{Link, LinkError, NoPause, Pause, ThreadPause};
