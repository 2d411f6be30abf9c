//! Core value types for seqbridge.
//!
//! This crate defines the types shared by the wire codecs, the asset
//! stager and the sequence engine: fixed-size link frames, MIDI event
//! records, tempo, channel snapshots and the asset directories.
//!
//! Designed to be `no_std` compatible with the `alloc` crate.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod channel;
mod directory;
mod frame;
mod midi;
mod tempo;

pub use channel::{Channel, ChannelSnapshot, NUM_CHANNELS};
pub use directory::{wrap_next, wrap_prev, BankDirectory, SeqEntry, SequenceDirectory};
pub use frame::{Frame, Tag, BATCH_HEADER_SIZE, FRAME_SIZE, MAX_BATCH_EVENTS, RECORD_STRIDE};
pub use midi::{classify, MidiBatch, MidiEventKind, MidiMessage, CC_CHANNEL_VOLUME};
pub use tempo::{Tempo, Tick};
