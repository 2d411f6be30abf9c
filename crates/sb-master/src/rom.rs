//! Lays asset files out as one bulk-storage image.

use sb_engine::MemoryStorage;
use serde::{Deserialize, Serialize};

/// Storage offsets of the three asset files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetLayout {
    /// Bank control file (`.ctl`)
    pub bank_ctl_offset: u32,
    pub bank_ctl_len: u32,
    /// Sample table (`.tbl`), passed through to the player untouched
    pub bank_table_offset: u32,
    /// Sequence bank (`.sbk`)
    pub seq_bank_offset: u32,
}

/// An assembled storage image and where each file landed.
#[derive(Debug, Clone)]
pub struct RomImage {
    pub data: Vec<u8>,
    pub layout: AssetLayout,
}

impl RomImage {
    /// Concatenate the control file, sample table and sequence bank, each
    /// starting on a 2-byte boundary.
    pub fn assemble(ctl: &[u8], tbl: &[u8], sbk: &[u8]) -> Self {
        let mut data = Vec::with_capacity(ctl.len() + tbl.len() + sbk.len() + 4);
        let bank_ctl_offset = append_aligned(&mut data, ctl);
        let bank_table_offset = append_aligned(&mut data, tbl);
        let seq_bank_offset = append_aligned(&mut data, sbk);
        if data.len() % 2 != 0 {
            data.push(0);
        }
        let layout = AssetLayout {
            bank_ctl_offset,
            bank_ctl_len: ctl.len() as u32,
            bank_table_offset,
            seq_bank_offset,
        };
        log::info!(
            "rom image: ctl @{:#x} ({} bytes), tbl @{:#x}, sbk @{:#x}, {} bytes total",
            layout.bank_ctl_offset,
            layout.bank_ctl_len,
            layout.bank_table_offset,
            layout.seq_bank_offset,
            data.len()
        );
        Self { data, layout }
    }

    pub fn into_storage(self) -> (MemoryStorage, AssetLayout) {
        (MemoryStorage::new(self.data), self.layout)
    }
}

fn append_aligned(data: &mut Vec<u8>, bytes: &[u8]) -> u32 {
    if data.len() % 2 != 0 {
        data.push(0);
    }
    let offset = data.len() as u32;
    data.extend_from_slice(bytes);
    offset
}
