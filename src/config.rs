use crate::consts::{DEFAULT_CLOCK_RATE, DEFAULT_VSYNC, DEFAULT_WRAP};
use serde::{Deserialize, Serialize};

/// Runtime knobs that survive `reset` and `load_program`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Instructions executed per tick.
    pub clock_rate: u32,
    /// Stop a tick early once a frame is pending.
    pub vsync: bool,
    /// Wrap sprites around the framebuffer edges instead of clipping them.
    pub wrap: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            clock_rate: DEFAULT_CLOCK_RATE,
            vsync: DEFAULT_VSYNC,
            wrap: DEFAULT_WRAP,
        }
    }
}
