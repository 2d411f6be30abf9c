//! Channel indices and the observed per-channel state.

/// MIDI channels per player.
pub const NUM_CHANNELS: usize = 16;

/// A channel index in `0..NUM_CHANNELS`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Channel(u8);

impl Channel {
    /// Returns `None` for indices outside `0..16`.
    pub const fn new(index: u8) -> Option<Self> {
        if (index as usize) < NUM_CHANNELS {
            Some(Self(index))
        } else {
            None
        }
    }

    /// Channel carried in a status byte's low nibble.
    pub const fn from_status(status: u8) -> Self {
        Self(status & 0x0f)
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }

    pub const fn as_u8(self) -> u8 {
        self.0
    }

    /// Iterate all 16 channels in order.
    pub fn all() -> impl Iterator<Item = Channel> {
        (0..NUM_CHANNELS as u8).map(Channel)
    }
}

/// Last observed volume and program on a channel (display only).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ChannelSnapshot {
    pub volume: u8,
    pub program: u8,
}
