use std::fmt;

/// The most recently fetched opcode and its fields.
///
/// Every field is decoded on every fetch, whether or not the instruction uses it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Opcode {
    pub raw: u16,
    pub n: u8,
    pub x: usize,
    pub y: usize,
    pub kk: u8,
    pub nnn: u16,
}

impl Opcode {
    pub fn decode(raw: u16) -> Self {
        Opcode {
            raw,
            n: (raw & 0x000F) as u8,
            x: ((raw & 0x0F00) >> 8) as usize,
            y: ((raw & 0x00F0) >> 4) as usize,
            kk: (raw & 0x00FF) as u8,
            nnn: raw & 0x0FFF,
        }
    }

    pub fn family(&self) -> u8 {
        (self.raw >> 12) as u8
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// 00E0 - clear screen
    ClearScreen,
    /// 00EE - return from subroutine
    Return,
    /// 1NNN - jump to NNN
    Jump(u16),
    /// 2NNN - call subroutine at NNN
    Call(u16),
    /// 3XKK - skip next if VX equals KK
    SkipIfEqualByte(usize, u8),
    /// 4XKK - skip next if VX does not equal KK
    SkipIfNotEqualByte(usize, u8),
    /// 5XY0 - skip next if VX equals VY
    SkipIfRegistersEqual(usize, usize),
    /// 6XKK - set VX to KK
    LoadByte(usize, u8),
    /// 7XKK - add KK to VX, no carry
    AddByte(usize, u8),
    /// 8XY0 - set VX to VY
    LoadRegister(usize, usize),
    /// 8XY1 - VX |= VY
    Or(usize, usize),
    /// 8XY2 - VX &= VY
    And(usize, usize),
    /// 8XY3 - VX ^= VY
    Xor(usize, usize),
    /// 8XY4 - VX += VY, VF = carry
    AddWithCarry(usize, usize),
    /// 8XY5 - VX -= VY, VF = VX > VY
    Subtract(usize, usize),
    /// 8XY6 - VX >>= 1, VF = shifted-out bit
    ShiftRight(usize),
    /// 8XY7 - VX = VY - VX, VF = VY > VX
    SubtractReversed(usize, usize),
    /// 8XYE - VX <<= 1, VF = shifted-out bit
    ShiftLeft(usize),
    /// 9XY0 - skip next if VX does not equal VY
    SkipIfRegistersNotEqual(usize, usize),
    /// ANNN - set I to NNN
    LoadIndex(u16),
    /// BNNN - jump to V0 + NNN
    JumpOffset(u16),
    /// CXKK - set VX to random byte & KK
    Random(usize, u8),
    /// DXYN - draw an N-row sprite from I at (VX, VY)
    Draw(usize, usize, u8),
    /// EX9E - skip next if key VX is held
    SkipIfKeyPressed(usize),
    /// EXA1 - skip next if key VX is not held
    SkipIfKeyNotPressed(usize),
    /// FX07 - set VX to delay timer value
    LoadFromDelayTimer(usize),
    /// FX15 - set delay timer to VX
    LoadDelayTimer(usize),
    /// FX18 - set sound timer to VX
    LoadSoundTimer(usize),
    /// FX1E - add VX to I
    AddToIndex(usize),
    /// FX29 - set I to the font glyph for VX
    LoadGlyph(usize),
    /// FX33 - store binary coded decimal of VX at I, I+1, I+2
    StoreBcd(usize),
    /// FX55 - dump V0..=VX to memory starting at I
    StoreRegisters(usize),
    /// FX65 - load V0..=VX from memory starting at I
    LoadRegisters(usize),
}

impl Instruction {
    /// Classify an opcode. `None` for sub-cases the instruction set leaves unmapped.
    pub fn from_opcode(op: &Opcode) -> Option<Self> {
        let Opcode { x, y, kk, nnn, n, .. } = *op;

        let instruction = match op.family() {
            0x0 => match kk {
                0xE0 => Instruction::ClearScreen,
                0xEE => Instruction::Return,
                _ => return None,
            },
            0x1 => Instruction::Jump(nnn),
            0x2 => Instruction::Call(nnn),
            0x3 => Instruction::SkipIfEqualByte(x, kk),
            0x4 => Instruction::SkipIfNotEqualByte(x, kk),
            0x5 => Instruction::SkipIfRegistersEqual(x, y),
            0x6 => Instruction::LoadByte(x, kk),
            0x7 => Instruction::AddByte(x, kk),
            0x8 => match n {
                0x0 => Instruction::LoadRegister(x, y),
                0x1 => Instruction::Or(x, y),
                0x2 => Instruction::And(x, y),
                0x3 => Instruction::Xor(x, y),
                0x4 => Instruction::AddWithCarry(x, y),
                0x5 => Instruction::Subtract(x, y),
                0x6 => Instruction::ShiftRight(x),
                0x7 => Instruction::SubtractReversed(x, y),
                0xE => Instruction::ShiftLeft(x),
                _ => return None,
            },
            0x9 => Instruction::SkipIfRegistersNotEqual(x, y),
            0xA => Instruction::LoadIndex(nnn),
            0xB => Instruction::JumpOffset(nnn),
            0xC => Instruction::Random(x, kk),
            0xD => Instruction::Draw(x, y, n),
            0xE => match kk {
                0x9E => Instruction::SkipIfKeyPressed(x),
                0xA1 => Instruction::SkipIfKeyNotPressed(x),
                _ => return None,
            },
            0xF => match kk {
                0x07 => Instruction::LoadFromDelayTimer(x),
                0x15 => Instruction::LoadDelayTimer(x),
                0x18 => Instruction::LoadSoundTimer(x),
                0x1E => Instruction::AddToIndex(x),
                0x29 => Instruction::LoadGlyph(x),
                0x33 => Instruction::StoreBcd(x),
                0x55 => Instruction::StoreRegisters(x),
                0x65 => Instruction::LoadRegisters(x),
                _ => return None,
            },
            _ => unreachable!("opcode family is a nibble"),
        };
        Some(instruction)
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Instruction::*;
        match *self {
            ClearScreen => write!(f, "CLS"),
            Return => write!(f, "RET"),
            Jump(a) => write!(f, "JP {a:#05x}"),
            Call(a) => write!(f, "CALL {a:#05x}"),
            SkipIfEqualByte(x, kk) => write!(f, "SE V{x:X}, {kk:#04x}"),
            SkipIfNotEqualByte(x, kk) => write!(f, "SNE V{x:X}, {kk:#04x}"),
            SkipIfRegistersEqual(x, y) => write!(f, "SE V{x:X}, V{y:X}"),
            LoadByte(x, kk) => write!(f, "LD V{x:X}, {kk:#04x}"),
            AddByte(x, kk) => write!(f, "ADD V{x:X}, {kk:#04x}"),
            LoadRegister(x, y) => write!(f, "LD V{x:X}, V{y:X}"),
            Or(x, y) => write!(f, "OR V{x:X}, V{y:X}"),
            And(x, y) => write!(f, "AND V{x:X}, V{y:X}"),
            Xor(x, y) => write!(f, "XOR V{x:X}, V{y:X}"),
            AddWithCarry(x, y) => write!(f, "ADD V{x:X}, V{y:X}"),
            Subtract(x, y) => write!(f, "SUB V{x:X}, V{y:X}"),
            ShiftRight(x) => write!(f, "SHR V{x:X}"),
            SubtractReversed(x, y) => write!(f, "SUBN V{x:X}, V{y:X}"),
            ShiftLeft(x) => write!(f, "SHL V{x:X}"),
            SkipIfRegistersNotEqual(x, y) => write!(f, "SNE V{x:X}, V{y:X}"),
            LoadIndex(a) => write!(f, "LD I, {a:#05x}"),
            JumpOffset(a) => write!(f, "JP V0, {a:#05x}"),
            Random(x, kk) => write!(f, "RND V{x:X}, {kk:#04x}"),
            Draw(x, y, n) => write!(f, "DRW V{x:X}, V{y:X}, {n}"),
            SkipIfKeyPressed(x) => write!(f, "SKP V{x:X}"),
            SkipIfKeyNotPressed(x) => write!(f, "SKNP V{x:X}"),
            LoadFromDelayTimer(x) => write!(f, "LD V{x:X}, DT"),
            LoadDelayTimer(x) => write!(f, "LD DT, V{x:X}"),
            LoadSoundTimer(x) => write!(f, "LD ST, V{x:X}"),
            AddToIndex(x) => write!(f, "ADD I, V{x:X}"),
            LoadGlyph(x) => write!(f, "LD F, V{x:X}"),
            StoreBcd(x) => write!(f, "LD B, V{x:X}"),
            StoreRegisters(x) => write!(f, "LD [I], V{x:X}"),
            LoadRegisters(x) => write!(f, "LD V{x:X}, [I]"),
        }
    }
}
