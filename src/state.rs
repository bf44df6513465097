use crate::consts::{
    ADDRESS_MASK, FONT_DATA, FONT_SIZE, INITIAL_PC, KEY_COUNT, REGISTER_COUNT, STACK_SIZE,
    TOTAL_RAM_SIZE,
};
use crate::parser::Opcode;
use crate::{Chip8Error, Result};
use serde::{Deserialize, Serialize};

/// One of the sixteen keys of the hex keypad, `0x0..=0xF`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Key(u8);

impl Key {
    pub fn new(index: u8) -> Option<Self> {
        (index < KEY_COUNT as u8).then_some(Key(index))
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl TryFrom<u8> for Key {
    type Error = Chip8Error;

    fn try_from(index: u8) -> Result<Self> {
        Key::new(index).ok_or(Chip8Error::InvalidKey(index))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registers {
    pub v: [u8; REGISTER_COUNT],
    pub sound_timer: u8,
    pub delay_timer: u8,
    pub index: u16,
    pub pc: u16,
    pub sp: u16,
}

impl Registers {
    pub fn set_pc(&mut self, pc: u16) {
        self.pc = pc & ADDRESS_MASK;
    }

    pub fn set_index(&mut self, index: u16) {
        self.index = index & ADDRESS_MASK;
    }

    /// Step over the next instruction.
    pub fn skip(&mut self) {
        self.set_pc(self.pc.wrapping_add(2));
    }
}

pub struct State {
    pub ram: [u8; TOTAL_RAM_SIZE as usize],
    pub stack: [u16; STACK_SIZE],
    pub registers: Registers,
    pub keys: [bool; KEY_COUNT],
    pub opcode: Opcode,
}

impl Default for State {
    fn default() -> Self {
        Self::new()
    }
}

impl State {
    pub fn new() -> Self {
        let mut ram = [0; TOTAL_RAM_SIZE as usize];
        ram[..FONT_SIZE].copy_from_slice(&FONT_DATA);
        State {
            ram,
            stack: [0; STACK_SIZE],
            registers: Registers {
                pc: INITIAL_PC,
                ..Registers::default()
            },
            keys: [false; KEY_COUNT],
            opcode: Opcode::default(),
        }
    }

    /// Clears everything except the font, which keeps its place below 0x50.
    pub fn clear(&mut self) {
        self.ram[FONT_SIZE..].fill(0);
        self.stack = [0; STACK_SIZE];
        self.registers = Registers {
            pc: INITIAL_PC,
            ..Registers::default()
        };
        self.keys = [false; KEY_COUNT];
        self.opcode = Opcode::default();
    }

    pub fn read(&self, addr: u16) -> u8 {
        self.ram[(addr & ADDRESS_MASK) as usize]
    }

    pub fn write(&mut self, addr: u16, value: u8) {
        self.ram[(addr & ADDRESS_MASK) as usize] = value;
    }

    pub fn push(&mut self, addr: u16) -> Result<()> {
        if self.registers.sp as usize >= STACK_SIZE - 1 {
            return Err(Chip8Error::StackOverflow {
                pc: self.instruction_address(),
            });
        }
        self.registers.sp += 1;
        self.stack[self.registers.sp as usize] = addr & ADDRESS_MASK;
        Ok(())
    }

    pub fn pop(&mut self) -> Result<u16> {
        if self.registers.sp == 0 {
            return Err(Chip8Error::StackUnderflow {
                pc: self.instruction_address(),
            });
        }
        let addr = self.stack[self.registers.sp as usize];
        self.registers.sp -= 1;
        Ok(addr)
    }

    /// Address of the instruction currently executing. PC has already moved past it.
    pub fn instruction_address(&self) -> u16 {
        self.registers.pc.wrapping_sub(2) & ADDRESS_MASK
    }
}
