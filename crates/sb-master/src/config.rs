//! Bridge configuration, loaded from RON.

use std::path::Path;
use std::time::Duration;

use sb_link::RetryPolicy;
use serde::{Deserialize, Serialize};

use crate::error::BridgeError;

/// Link retry settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    pub max_attempts: u32,
    pub retry_interval_ms: u64,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self { max_attempts: 8, retry_interval_ms: 100 }
    }
}

impl LinkConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts.max(1),
            retry_interval: Duration::from_millis(self.retry_interval_ms),
        }
    }
}

/// Startup budget and control defaults. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Working heap for directories, the bank control file and the body slot
    pub heap_bytes: usize,
    /// Capacity of the replaceable sequence body slot
    pub body_slot_bytes: usize,
    /// Master volume applied on each sequence selection
    pub initial_volume: u16,
    pub fade_out_ms: u32,
    /// Start playing sequence 0 once staged
    pub autoplay: bool,
    pub link: LinkConfig,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            heap_bytes: 256 * 1024,
            body_slot_bytes: 50_000,
            initial_volume: 0x7fff / 2,
            fade_out_ms: 200,
            autoplay: true,
            link: LinkConfig::default(),
        }
    }
}

impl BridgeConfig {
    pub fn from_ron_str(text: &str) -> Result<Self, BridgeError> {
        Ok(ron::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, BridgeError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_ron_str(&text)
    }
}
