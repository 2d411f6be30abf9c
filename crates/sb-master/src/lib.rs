//! Device-side bridge context for seqbridge.
//!
//! Wires asset staging, the sequence engine, the session clock and the
//! link transport into one per-frame `tick()` plus the user controls, so
//! the CLI and tests drive the exact same path.

mod bridge;
mod clock;
mod config;
mod error;
mod rom;

pub use bridge::{Bridge, TempoNudge};
pub use clock::{DeviceClock, ManualClock, SystemClock};
pub use config::{BridgeConfig, LinkConfig};
pub use error::BridgeError;
pub use rom::{AssetLayout, RomImage};

// Re-export common types so callers don't need the lower crates directly.
pub use sb_engine::{
    DecoderStats, FrameOutcome, MemoryStorage, PlayState, PlayerCall, RecordingPlayer, SeqPlayer,
};
pub use sb_ir::{Channel, ChannelSnapshot, Frame, Tempo, Tick, NUM_CHANNELS};
pub use sb_link::{loopback, HostEnd, Link, LoopbackLink, NoPause, SessionStats, ThreadPause};
