use rand::Rng;

const MULTIPLIER: u32 = 214_013;
const INCREMENT: u32 = 2_531_011;

/// Linear-congruential generator behind `CXKK`.
///
/// The recurrence is fixed so that a restored save state replays the same
/// random bytes. Not suitable for anything but game logic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Lcg {
    seed: u32,
}

impl Lcg {
    pub fn new(seed: u32) -> Self {
        Lcg { seed }
    }

    pub fn from_entropy() -> Self {
        let mut rng = rand::rng();
        Lcg::new(rng.random())
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    pub fn next_byte(&mut self) -> u8 {
        self.seed = self.seed.wrapping_mul(MULTIPLIER).wrapping_add(INCREMENT);
        (((self.seed >> 16) & 0x7FFF) & 0xFF) as u8
    }
}
