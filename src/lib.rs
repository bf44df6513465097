pub mod config;
pub mod consts;
pub mod display;
pub mod frontend;
pub mod interpreter;
pub mod parser;
pub mod rng;
pub mod savestate;
pub mod state;

pub use config::Config;
pub use display::Display;
pub use frontend::Frontend;
pub use interpreter::Interpreter;
pub use savestate::SaveState;
pub use state::Key;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Chip8Error {
    #[error("program image is empty")]
    EmptyProgram,

    #[error("program image is {len} bytes, at most {max} fit in memory")]
    ProgramTooLarge { len: usize, max: usize },

    #[error("key index {0:#x} is out of range (0x0..=0xF)")]
    InvalidKey(u8),

    #[error("stack overflow at {pc:#05x}")]
    StackOverflow { pc: u16 },

    #[error("stack underflow at {pc:#05x}")]
    StackUnderflow { pc: u16 },

    #[error("unsupported save state version {0}")]
    UnsupportedSaveStateVersion(u32),

    #[error("corrupt save state: {0}")]
    CorruptSaveState(&'static str),

    #[error("save state encoding: {0}")]
    SaveStateEncoding(String),
}

pub type Result<T> = std::result::Result<T, Chip8Error>;
