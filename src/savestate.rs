use crate::consts::{ADDRESS_MASK, FONT_SIZE, SCREEN_SIZE, STACK_SIZE, TOTAL_RAM_SIZE};
use crate::state::Registers;
use crate::{Chip8Error, Result};
use serde::{Deserialize, Serialize};

pub const SAVE_STATE_VERSION: u32 = 1;

/// Bytes of RAM carried by a snapshot: everything above the font.
pub const SAVED_RAM_SIZE: usize = TOTAL_RAM_SIZE as usize - FONT_SIZE;

/// Flat snapshot of a machine.
///
/// The font is not stored since every machine installs the same one, and key
/// state is not stored since a restored machine starts with no keys held.
/// Runtime configuration (clock rate, vsync, wrap) belongs to the host and is
/// left untouched by a restore.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveState {
    pub version: u32,
    pub seed: u32,
    pub registers: Registers,
    pub stack: [u16; STACK_SIZE],
    /// RAM from the end of the font to the top of memory.
    pub ram: Vec<u8>,
    /// One byte per pixel, row-major, nonzero when lit.
    pub display: Vec<u8>,
}

impl SaveState {
    /// Check that the record can be restored without breaking machine invariants.
    pub fn validate(&self) -> Result<()> {
        if self.version != SAVE_STATE_VERSION {
            return Err(Chip8Error::UnsupportedSaveStateVersion(self.version));
        }
        if self.ram.len() != SAVED_RAM_SIZE {
            return Err(Chip8Error::CorruptSaveState("ram length"));
        }
        if self.display.len() != SCREEN_SIZE as usize {
            return Err(Chip8Error::CorruptSaveState("display length"));
        }
        let r = &self.registers;
        if r.pc > ADDRESS_MASK || r.index > ADDRESS_MASK {
            return Err(Chip8Error::CorruptSaveState("address register out of range"));
        }
        if r.sp as usize >= STACK_SIZE {
            return Err(Chip8Error::CorruptSaveState("stack pointer out of range"));
        }
        if self.stack.iter().any(|&addr| addr > ADDRESS_MASK) {
            return Err(Chip8Error::CorruptSaveState("return address out of range"));
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| Chip8Error::SaveStateEncoding(e.to_string()))
    }

    pub fn from_json(s: &str) -> Result<Self> {
        let state: SaveState =
            serde_json::from_str(s).map_err(|e| Chip8Error::SaveStateEncoding(e.to_string()))?;
        state.validate()?;
        Ok(state)
    }
}
