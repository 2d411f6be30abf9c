use sb_engine::StageError;
use thiserror::Error;

/// Errors surfaced by bridge construction and configuration loading.
///
/// Everything here is fatal at startup; the running `tick()` path has no
/// error return.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("asset staging failed: {0}")]
    Stage(#[from] StageError),

    #[error("invalid config: {0}")]
    Config(#[from] ron::error::SpannedError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("sequence {index} needs {required} bytes but the body slot holds {capacity}")]
    SlotTooSmall { index: usize, required: usize, capacity: usize },
}
