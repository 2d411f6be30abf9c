//! Device-side core of seqbridge.
//!
//! Stages asset containers from bulk storage into a bump-allocated heap,
//! owns the active sequence and its player, reconciles host timestamps
//! against the musical clock, and decodes remote link frames into player
//! events.

mod clock;
mod heap;
mod player;
mod remote;
mod sequencer;
mod stager;
mod storage;

pub use clock::{ClockReconciler, TickMapper};
pub use heap::{AssetHeap, HeapError, HeapHandle};
pub use player::{PlayerCall, RecordingPlayer, SeqPlayer, RECORDING_CAPACITY};
pub use remote::{DecoderStats, FrameOutcome, RemoteEventDecoder};
pub use sequencer::{ActiveSequence, PlayState, SequenceEngine};
pub use stager::{AssetStager, BodySlot, Probe, StageError};
pub use storage::{BulkStorage, MemoryStorage, StorageError, StorageRead, READ_LOG_CAPACITY};
