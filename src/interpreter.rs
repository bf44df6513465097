use crate::config::Config;
use crate::consts::{FONT_SIZE, INITIAL_PC, KEY_COUNT, MAX_PROGRAM_SIZE, SPRITE_SIZE};
use crate::display::Display;
use crate::frontend::{Frontend, Headless};
use crate::parser::{Instruction, Opcode};
use crate::rng::Lcg;
use crate::savestate::{SAVE_STATE_VERSION, SaveState};
use crate::state::{Key, Registers, State};
use crate::{Chip8Error, Result};
use tracing::{debug, trace, warn};

/// A CHIP-8 machine, driven one [`tick`](Interpreter::tick) at a time by the host.
pub struct Interpreter {
    state: State,
    display: Display,
    rng: Lcg,
    clock_rate: u32,
    vsync: bool,
    paused: bool,
    fault: Option<Chip8Error>,
    /// Buzzer state last passed to `Frontend::sound_state_changed`.
    reported_sound: bool,
    /// Set by `load_state` until a tick hands the restored screen to the frontend.
    unreported_frame: bool,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        let mut display = Display::new();
        display.set_wrap(config.wrap);
        Interpreter {
            state: State::new(),
            display,
            rng: Lcg::default(),
            clock_rate: config.clock_rate,
            vsync: config.vsync,
            paused: false,
            fault: None,
            reported_sound: false,
            unreported_frame: false,
        }
    }

    /// Full reset followed by copying `rom` to 0x200.
    ///
    /// Nothing is touched when the image is empty or does not fit.
    pub fn load_program(&mut self, rom: &[u8]) -> Result<()> {
        if rom.is_empty() {
            return Err(Chip8Error::EmptyProgram);
        }
        if rom.len() > MAX_PROGRAM_SIZE {
            return Err(Chip8Error::ProgramTooLarge {
                len: rom.len(),
                max: MAX_PROGRAM_SIZE,
            });
        }

        self.state = State::new();
        self.display.reset();
        self.fault = None;
        self.unreported_frame = false;

        let start = INITIAL_PC as usize;
        let end = start + rom.len();
        self.state.ram[start..end].copy_from_slice(rom);
        debug!(len = rom.len(), "program loaded");
        Ok(())
    }

    /// Partial reset: registers, stack, input, display and all RAM above the
    /// font are cleared. The loaded program is gone afterwards.
    pub fn reset(&mut self) {
        self.state.clear();
        self.display.reset();
        self.fault = None;
        self.unreported_frame = false;
        debug!("machine reset");
    }

    pub fn set_key(&mut self, key: Key, pressed: bool) {
        self.state.keys[key.index()] = pressed;
    }

    pub fn is_key_pressed(&self, key: Key) -> bool {
        self.state.keys[key.index()]
    }

    /// Run one scheduling quantum: up to `clock_rate` instructions, then one
    /// timer decrement.
    pub fn tick(&mut self) {
        self.tick_with(&mut Headless);
    }

    /// Like [`tick`](Interpreter::tick), reporting frame and buzzer changes to `frontend`.
    pub fn tick_with(&mut self, frontend: &mut dyn Frontend) {
        if self.paused || self.fault.is_some() {
            return;
        }

        let restored = std::mem::take(&mut self.unreported_frame);
        self.display.set_draw_pending(false);

        for _ in 0..self.clock_rate {
            if let Err(err) = self.execute_next() {
                warn!(%err, "machine faulted, halting");
                self.fault = Some(err);
                break;
            }
            // break early if a draw call is made
            if self.vsync && self.display.is_draw_pending() {
                break;
            }
        }

        self.update_timers();

        if restored || self.display.is_draw_pending() {
            frontend.frame_ready(&self.display);
        }
        let sound = self.is_sound_active();
        if sound != self.reported_sound {
            self.reported_sound = sound;
            frontend.sound_state_changed(sound);
        }
    }

    /// Execute exactly one instruction without touching the timers.
    pub fn step(&mut self) -> Result<()> {
        if let Some(fault) = &self.fault {
            return Err(fault.clone());
        }
        self.execute_next().inspect_err(|err| {
            warn!(%err, "machine faulted, halting");
            self.fault = Some(err.clone());
        })
    }

    pub fn should_present_frame(&self) -> bool {
        self.display.is_draw_pending()
    }

    pub fn is_sound_active(&self) -> bool {
        self.state.registers.sound_timer > 0
    }

    /// Pixel at (`x`, `y`); false outside the 64x32 screen.
    pub fn pixel(&self, x: u8, y: u8) -> bool {
        self.display.pixel(x, y)
    }

    pub fn clock_rate(&self) -> u32 {
        self.clock_rate
    }

    pub fn set_clock_rate(&mut self, instructions_per_tick: u32) {
        self.clock_rate = instructions_per_tick;
    }

    pub fn vsync(&self) -> bool {
        self.vsync
    }

    pub fn set_vsync(&mut self, enabled: bool) {
        self.vsync = enabled;
    }

    pub fn wraps(&self) -> bool {
        self.display.wraps()
    }

    pub fn set_wrap(&mut self, enabled: bool) {
        self.display.set_wrap(enabled);
    }

    pub fn config(&self) -> Config {
        Config {
            clock_rate: self.clock_rate,
            vsync: self.vsync,
            wrap: self.display.wraps(),
        }
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// The error that halted the machine, if any.
    pub fn fault(&self) -> Option<&Chip8Error> {
        self.fault.as_ref()
    }

    pub fn seed_rng(&mut self, seed: u32) {
        self.rng = Lcg::new(seed);
    }

    pub fn seed_rng_from_entropy(&mut self) {
        self.rng = Lcg::from_entropy();
    }

    pub fn rng_seed(&self) -> u32 {
        self.rng.seed()
    }

    pub fn registers(&self) -> &Registers {
        &self.state.registers
    }

    pub fn ram(&self) -> &[u8] {
        &self.state.ram
    }

    pub fn stack(&self) -> &[u16] {
        &self.state.stack
    }

    pub fn display(&self) -> &Display {
        &self.display
    }

    /// The most recently fetched opcode.
    pub fn opcode(&self) -> Opcode {
        self.state.opcode
    }

    pub fn save_state(&self) -> SaveState {
        debug!(pc = self.state.registers.pc, "saving state");
        SaveState {
            version: SAVE_STATE_VERSION,
            seed: self.rng.seed(),
            registers: self.state.registers,
            stack: self.state.stack,
            ram: self.state.ram[FONT_SIZE..].to_vec(),
            display: self.display.pixels().iter().map(|&p| p as u8).collect(),
        }
    }

    /// Restore a snapshot. The record is validated first; on error the
    /// machine is left as it was.
    pub fn load_state(&mut self, saved: &SaveState) -> Result<()> {
        saved.validate()?;

        self.rng = Lcg::new(saved.seed);
        self.state.keys = [false; KEY_COUNT];
        self.state.registers = saved.registers;
        self.state.stack = saved.stack;
        self.state.ram[FONT_SIZE..].copy_from_slice(&saved.ram);
        self.state.opcode = Opcode::default();
        self.display.reset();
        self.display.load_pixels(&saved.display);
        // the restored screen has never been presented
        self.display.set_draw_pending(true);
        self.unreported_frame = true;
        self.fault = None;
        debug!(pc = saved.registers.pc, "state loaded");
        Ok(())
    }

    fn fetch(&mut self) -> Opcode {
        let pc = self.state.registers.pc;
        let raw = u16::from_be_bytes([self.state.read(pc), self.state.read(pc.wrapping_add(1))]);
        self.state.registers.skip();
        self.state.opcode = Opcode::decode(raw);
        self.state.opcode
    }

    fn execute_next(&mut self) -> Result<()> {
        let op = self.fetch();
        match Instruction::from_opcode(&op) {
            Some(instruction) => self.execute(instruction),
            None => {
                trace!(
                    addr = self.state.instruction_address(),
                    opcode = op.raw,
                    "unmapped opcode, ignoring"
                );
                Ok(())
            }
        }
    }

    fn execute(&mut self, instruction: Instruction) -> Result<()> {
        let state = &mut self.state;
        let regs = &mut state.registers;

        match instruction {
            Instruction::ClearScreen => self.display.clear(),
            Instruction::Return => {
                let addr = state.pop()?;
                state.registers.set_pc(addr);
            }
            Instruction::Jump(addr) => regs.set_pc(addr),
            Instruction::Call(addr) => {
                let ret = regs.pc;
                state.push(ret)?;
                state.registers.set_pc(addr);
            }
            Instruction::SkipIfEqualByte(x, kk) => {
                if regs.v[x] == kk {
                    regs.skip();
                }
            }
            Instruction::SkipIfNotEqualByte(x, kk) => {
                if regs.v[x] != kk {
                    regs.skip();
                }
            }
            Instruction::SkipIfRegistersEqual(x, y) => {
                if regs.v[x] == regs.v[y] {
                    regs.skip();
                }
            }
            Instruction::LoadByte(x, kk) => regs.v[x] = kk,
            Instruction::AddByte(x, kk) => regs.v[x] = regs.v[x].wrapping_add(kk),
            Instruction::LoadRegister(x, y) => regs.v[x] = regs.v[y],
            Instruction::Or(x, y) => regs.v[x] |= regs.v[y],
            Instruction::And(x, y) => regs.v[x] &= regs.v[y],
            Instruction::Xor(x, y) => regs.v[x] ^= regs.v[y],
            // result first, flag last: VF always ends up holding the flag
            Instruction::AddWithCarry(x, y) => {
                let (sum, carry) = regs.v[x].overflowing_add(regs.v[y]);
                regs.v[x] = sum;
                regs.v[0xF] = carry as u8;
            }
            Instruction::Subtract(x, y) => {
                let (vx, vy) = (regs.v[x], regs.v[y]);
                regs.v[x] = vx.wrapping_sub(vy);
                regs.v[0xF] = (vx > vy) as u8;
            }
            Instruction::ShiftRight(x) => {
                let vx = regs.v[x];
                regs.v[x] = vx >> 1;
                regs.v[0xF] = vx & 1;
            }
            Instruction::SubtractReversed(x, y) => {
                let (vx, vy) = (regs.v[x], regs.v[y]);
                regs.v[x] = vy.wrapping_sub(vx);
                regs.v[0xF] = (vy > vx) as u8;
            }
            Instruction::ShiftLeft(x) => {
                let vx = regs.v[x];
                regs.v[x] = vx << 1;
                regs.v[0xF] = (vx >> 7) & 1;
            }
            Instruction::SkipIfRegistersNotEqual(x, y) => {
                if regs.v[x] != regs.v[y] {
                    regs.skip();
                }
            }
            Instruction::LoadIndex(addr) => regs.set_index(addr),
            Instruction::JumpOffset(addr) => regs.set_pc(regs.v[0] as u16 + addr),
            Instruction::Random(x, kk) => regs.v[x] = self.rng.next_byte() & kk,
            Instruction::Draw(x, y, n) => {
                let (vx, vy, i) = (regs.v[x], regs.v[y], regs.index);
                let mut sprite = [0u8; 0xF];
                for (row, byte) in sprite.iter_mut().enumerate().take(n as usize) {
                    *byte = state.read(i + row as u16);
                }
                let collision = self.display.draw(vx, vy, &sprite[..n as usize]);
                state.registers.v[0xF] = collision as u8;
            }
            Instruction::SkipIfKeyPressed(x) => {
                if state.keys[(regs.v[x] & 0xF) as usize] {
                    state.registers.skip();
                }
            }
            Instruction::SkipIfKeyNotPressed(x) => {
                if !state.keys[(regs.v[x] & 0xF) as usize] {
                    state.registers.skip();
                }
            }
            Instruction::LoadFromDelayTimer(x) => regs.v[x] = regs.delay_timer,
            Instruction::LoadDelayTimer(x) => regs.delay_timer = regs.v[x],
            Instruction::LoadSoundTimer(x) => regs.sound_timer = regs.v[x],
            Instruction::AddToIndex(x) => regs.set_index(regs.index + regs.v[x] as u16),
            Instruction::LoadGlyph(x) => regs.set_index(regs.v[x] as u16 * SPRITE_SIZE),
            Instruction::StoreBcd(x) => {
                let num = regs.v[x];
                let i = regs.index;
                state.write(i, num / 100);
                state.write(i + 1, (num / 10) % 10);
                state.write(i + 2, num % 10);
            }
            Instruction::StoreRegisters(x) => {
                let (i, v) = (regs.index, regs.v);
                for ri in 0..=x {
                    state.write(i + ri as u16, v[ri]);
                }
            }
            Instruction::LoadRegisters(x) => {
                let i = regs.index;
                for ri in 0..=x {
                    let byte = state.read(i + ri as u16);
                    state.registers.v[ri] = byte;
                }
            }
        }

        Ok(())
    }

    fn update_timers(&mut self) {
        let regs = &mut self.state.registers;
        regs.delay_timer = regs.delay_timer.saturating_sub(1);
        regs.sound_timer = regs.sound_timer.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn program(words: &[u16]) -> Vec<u8> {
        words.iter().flat_map(|w| w.to_be_bytes()).collect()
    }

    fn machine(words: &[u16]) -> Interpreter {
        let mut m = Interpreter::new();
        m.load_program(&program(words)).unwrap();
        m
    }

    fn steps(m: &mut Interpreter, n: usize) {
        for _ in 0..n {
            m.step().unwrap();
        }
    }

    #[test]
    fn test_new_machine() {
        let m = Interpreter::new();
        assert_eq!(m.registers().pc, 0x200);
        assert_eq!(m.clock_rate(), 10);
        assert!(m.vsync());
        assert!(!m.wraps());
        assert_eq!(m.ram()[..FONT_SIZE], crate::consts::FONT_DATA);
    }

    #[test]
    fn test_load_program_rejects_bad_sizes() {
        let mut m = machine(&[0x6001]);
        assert_eq!(m.load_program(&[]), Err(Chip8Error::EmptyProgram));
        assert_eq!(
            m.load_program(&vec![0u8; MAX_PROGRAM_SIZE + 1]),
            Err(Chip8Error::ProgramTooLarge { len: 3585, max: 3584 })
        );
        // previous program untouched
        assert_eq!(m.ram()[0x200..0x202], [0x60, 0x01]);
        assert!(m.load_program(&vec![0xAAu8; MAX_PROGRAM_SIZE]).is_ok());
        assert_eq!(m.ram()[0xFFF], 0xAA);
    }

    #[test]
    fn test_load_program_is_full_reset() {
        let mut m = machine(&[0x6A05, 0xF018, 0x2300]);
        m.set_key(Key::new(3).unwrap(), true);
        steps(&mut m, 3);
        m.load_program(&[0x00, 0xE0]).unwrap();
        assert_eq!(*m.registers(), Registers { pc: 0x200, ..Registers::default() });
        assert!(!m.is_key_pressed(Key::new(3).unwrap()));
        assert_eq!(m.stack(), &[0u16; 16]);
        assert_eq!(m.ram()[0x202..0x206], [0; 4]);
    }

    #[test]
    fn test_reset_drops_program_keeps_font() {
        let mut m = machine(&[0x6A05, 0x7A01]);
        steps(&mut m, 2);
        m.reset();
        assert_eq!(m.registers().pc, 0x200);
        assert_eq!(m.registers().v[0xA], 0);
        assert_eq!(m.ram()[..FONT_SIZE], crate::consts::FONT_DATA);
        assert!(m.ram()[FONT_SIZE..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_cls_marks_frame() {
        let mut m = machine(&[0x00E0, 0x1202]);
        m.tick();
        assert!(m.should_present_frame());
        assert_eq!(m.registers().pc, 0x202);
    }

    #[test]
    fn test_call_and_return() {
        let mut m = machine(&[0x2206, 0x6001, 0x1202, 0x00EE]);
        m.step().unwrap();
        assert_eq!(m.registers().pc, 0x206);
        assert_eq!(m.registers().sp, 1);
        assert_eq!(m.stack()[1], 0x202);
        m.step().unwrap();
        assert_eq!(m.registers().pc, 0x202);
        assert_eq!(m.registers().sp, 0);
    }

    #[test]
    fn test_skips() {
        // V0 = 5; SE V0,5 skips; SNE V0,5 does not
        let mut m = machine(&[0x6005, 0x3005, 0x0000, 0x4005, 0x5010, 0x0000, 0x9010]);
        steps(&mut m, 2);
        assert_eq!(m.registers().pc, 0x206);
        m.step().unwrap();
        assert_eq!(m.registers().pc, 0x208);
        // V0 != V1, so 5XY0 does not skip
        m.step().unwrap();
        assert_eq!(m.registers().pc, 0x20A);
        steps(&mut m, 2);
        // 9XY0 skips
        assert_eq!(m.registers().pc, 0x210);
    }

    #[test]
    fn test_add_byte_wraps_without_flag() {
        let mut m = machine(&[0x60FF, 0x6F07, 0x7002]);
        steps(&mut m, 3);
        assert_eq!(m.registers().v[0], 1);
        assert_eq!(m.registers().v[0xF], 7);
    }

    #[test]
    fn test_logic_ops() {
        let mut m = machine(&[0x60F0, 0x613C, 0x8011, 0x6200, 0x8212, 0x630F, 0x8303]);
        steps(&mut m, 7);
        let v = m.registers().v;
        assert_eq!(v[0], 0xFC);
        assert_eq!(v[2], 0x00);
        assert_eq!(v[3], 0x0F ^ 0xFC);
    }

    #[test]
    fn test_add_with_carry() {
        let mut m = machine(&[0x60FF, 0x6102, 0x8014]);
        steps(&mut m, 3);
        assert_eq!(m.registers().v[0], 1);
        assert_eq!(m.registers().v[0xF], 1);

        let mut m = machine(&[0x60FE, 0x6101, 0x8014]);
        steps(&mut m, 3);
        assert_eq!(m.registers().v[0], 0xFF);
        assert_eq!(m.registers().v[0xF], 0);
    }

    #[test]
    fn test_subtract_flags() {
        let mut m = machine(&[0x6005, 0x6103, 0x8015]);
        steps(&mut m, 3);
        assert_eq!((m.registers().v[0], m.registers().v[0xF]), (2, 1));

        // equal operands borrow nothing but still clear the flag
        let mut m = machine(&[0x6005, 0x6105, 0x8015]);
        steps(&mut m, 3);
        assert_eq!((m.registers().v[0], m.registers().v[0xF]), (0, 0));

        let mut m = machine(&[0x6003, 0x6105, 0x8015]);
        steps(&mut m, 3);
        assert_eq!((m.registers().v[0], m.registers().v[0xF]), (0xFE, 0));

        let mut m = machine(&[0x6003, 0x6105, 0x8017]);
        steps(&mut m, 3);
        assert_eq!((m.registers().v[0], m.registers().v[0xF]), (2, 1));
    }

    #[test]
    fn test_shifts() {
        let mut m = machine(&[0x6081, 0x8006]);
        steps(&mut m, 2);
        assert_eq!((m.registers().v[0], m.registers().v[0xF]), (0x40, 1));

        let mut m = machine(&[0x6081, 0x800E]);
        steps(&mut m, 2);
        assert_eq!((m.registers().v[0], m.registers().v[0xF]), (0x02, 1));
    }

    #[test]
    fn test_flag_register_as_destination_holds_flag() {
        // VF = FF, V1 = 3; ADD VF, V1 overflows
        let mut m = machine(&[0x6FFF, 0x6103, 0x8F14]);
        steps(&mut m, 3);
        assert_eq!(m.registers().v[0xF], 1);

        // VF = 3, V1 = 5; SUB VF, V1 borrows
        let mut m = machine(&[0x6F03, 0x6105, 0x8F15]);
        steps(&mut m, 3);
        assert_eq!(m.registers().v[0xF], 0);

        // SHR VF keeps the shifted-out bit, SHL VF the top bit
        let mut m = machine(&[0x6F03, 0x8F06]);
        steps(&mut m, 2);
        assert_eq!(m.registers().v[0xF], 1);
        let mut m = machine(&[0x6F40, 0x8F0E]);
        steps(&mut m, 2);
        assert_eq!(m.registers().v[0xF], 0);
    }

    #[test]
    fn test_index_and_jump_offset() {
        let mut m = machine(&[0xA123, 0x6004, 0xB300]);
        steps(&mut m, 3);
        assert_eq!(m.registers().index, 0x123);
        assert_eq!(m.registers().pc, 0x304);
    }

    #[test]
    fn test_jump_offset_wraps_in_twelve_bits() {
        let mut m = machine(&[0x60FF, 0xBFFF]);
        steps(&mut m, 2);
        assert_eq!(m.registers().pc, (0xFFF + 0xFF) & 0xFFF);
    }

    #[test]
    fn test_random_uses_seeded_lcg() {
        let mut m = machine(&[0xC0FF, 0xC10F]);
        m.seed_rng(0);
        steps(&mut m, 2);
        let mut expected = Lcg::new(0);
        assert_eq!(m.registers().v[0], expected.next_byte());
        assert_eq!(m.registers().v[1], expected.next_byte() & 0x0F);
    }

    #[test]
    fn test_draw_font_glyph() {
        // draw glyph "0" at (0, 0)
        let mut m = machine(&[0x6000, 0xF029, 0xD005]);
        steps(&mut m, 3);
        assert!(m.pixel(0, 0));
        assert!(m.pixel(3, 0));
        assert!(!m.pixel(1, 1));
        assert_eq!(m.registers().v[0xF], 0);
        assert!(m.should_present_frame());
    }

    #[test]
    fn test_draw_reads_coordinates_before_flag_clear() {
        // VF holds the x coordinate
        let mut m = machine(&[0x6F08, 0x6000, 0xA000, 0xDF05]);
        steps(&mut m, 4);
        assert!(m.pixel(8, 0));
        assert!(!m.pixel(0, 0));
        assert_eq!(m.registers().v[0xF], 0);
    }

    #[test]
    fn test_draw_origin_past_edge_reduced_without_wrap() {
        // glyph "0" at (70, 33) lands at (6, 1)
        let mut m = machine(&[0x6046, 0x6121, 0x6200, 0xF229, 0xD015]);
        steps(&mut m, 5);
        assert!(!m.wraps());
        assert!(m.pixel(6, 1));
        assert!(m.pixel(9, 1));
    }

    #[test]
    fn test_keys() {
        let mut m = machine(&[0x6007, 0xE09E, 0x0000, 0xE0A1, 0x0000]);
        m.set_key(Key::new(7).unwrap(), true);
        steps(&mut m, 2);
        assert_eq!(m.registers().pc, 0x206);
        m.step().unwrap();
        assert_eq!(m.registers().pc, 0x208);

        m.set_key(Key::new(7).unwrap(), false);
        m.load_program(&program(&[0x6007, 0xE0A1])).unwrap();
        steps(&mut m, 2);
        assert_eq!(m.registers().pc, 0x206);
    }

    #[test]
    fn test_timer_instructions() {
        let mut m = machine(&[0x6009, 0xF015, 0xF118, 0x6100, 0xF107]);
        steps(&mut m, 5);
        assert_eq!(m.registers().delay_timer, 9);
        assert_eq!(m.registers().sound_timer, 0);
        assert_eq!(m.registers().v[1], 9);
    }

    #[test]
    fn test_delay_and_sound_timers_are_separate() {
        let mut m = machine(&[0x6005, 0xF015, 0x6103, 0xF118, 0x1208]);
        m.set_vsync(false);
        m.tick();
        assert_eq!(m.registers().delay_timer, 4);
        assert_eq!(m.registers().sound_timer, 2);
    }

    #[test]
    fn test_add_to_index_masks() {
        let mut m = machine(&[0xAFFF, 0x6002, 0xF01E]);
        steps(&mut m, 3);
        assert_eq!(m.registers().index, 0x001);
    }

    #[test]
    fn test_bcd() {
        let mut m = machine(&[0x60FE, 0xA300, 0xF033]);
        steps(&mut m, 3);
        assert_eq!(m.ram()[0x300..0x303], [2, 5, 4]);
    }

    #[test]
    fn test_store_and_load_registers() {
        let mut m = machine(&[0x6011, 0x6122, 0x6233, 0xA400, 0xF155, 0x6000, 0x6100, 0x6200, 0xF265]);
        steps(&mut m, 5);
        assert_eq!(m.ram()[0x400..0x403], [0x11, 0x22, 0x00]);
        assert_eq!(m.registers().index, 0x400);
        steps(&mut m, 4);
        assert_eq!(m.registers().v[..3], [0x11, 0x22, 0x00]);
    }

    #[test]
    fn test_unmapped_opcode_is_noop() {
        let mut m = machine(&[0x8008, 0xE0FF, 0xF0FF, 0x0123]);
        steps(&mut m, 4);
        assert_eq!(m.registers().pc, 0x208);
        assert_eq!(m.opcode().raw, 0x0123);
        assert!(m.fault().is_none());
    }

    #[test]
    fn test_stack_overflow_faults() {
        // 0x200: CALL 0x200, forever
        let mut m = machine(&[0x2200]);
        m.set_clock_rate(100);
        m.tick();
        assert_eq!(m.fault(), Some(&Chip8Error::StackOverflow { pc: 0x200 }));
        assert_eq!(m.registers().sp, 15);

        let before = m.registers().pc;
        m.tick();
        assert_eq!(m.registers().pc, before);
        assert!(m.step().is_err());

        m.reset();
        assert!(m.fault().is_none());
    }

    #[test]
    fn test_stack_underflow_faults() {
        let mut m = machine(&[0x00EE]);
        assert_eq!(m.step(), Err(Chip8Error::StackUnderflow { pc: 0x200 }));
        assert!(m.fault().is_some());
    }

    #[test]
    fn test_vsync_stops_tick_after_draw() {
        let mut m = machine(&[0x00E0, 0x6001, 0x6102, 0x1206]);
        m.tick();
        assert_eq!(m.registers().pc, 0x202);
        m.set_vsync(false);
        m.tick();
        assert_eq!(m.registers().v[1], 2);
        assert!(!m.should_present_frame());
    }

    #[test]
    fn test_clock_rate_bounds_batch() {
        let mut m = machine(&[0x7001, 0x1200]);
        m.set_clock_rate(6);
        m.tick();
        assert_eq!(m.registers().v[0], 3);
    }

    #[test]
    fn test_pause() {
        let mut m = machine(&[0x7001, 0x1200]);
        m.toggle_pause();
        m.tick();
        assert_eq!(m.registers().v[0], 0);
        m.toggle_pause();
        assert!(!m.is_paused());
        m.tick();
        assert_eq!(m.registers().v[0], 5);
    }

    #[test]
    fn test_config_round_trip() {
        let cfg = Config {
            clock_rate: 20,
            vsync: false,
            wrap: true,
        };
        let mut m = Interpreter::with_config(cfg);
        assert_eq!(m.config(), cfg);
        m.load_program(&[0x00, 0xE0]).unwrap();
        m.reset();
        assert_eq!(m.config(), cfg);
    }

    #[test]
    fn test_load_state_rejects_without_mutation() {
        let mut m = machine(&[0x6042]);
        m.step().unwrap();
        let mut saved = m.save_state();
        saved.version = 99;
        m.reset();
        assert_eq!(
            m.load_state(&saved),
            Err(Chip8Error::UnsupportedSaveStateVersion(99))
        );
        assert_eq!(m.registers().v[0], 0);
    }

    #[derive(Default)]
    struct Recorder {
        frames: usize,
        sound: Vec<bool>,
    }

    impl Frontend for Recorder {
        fn frame_ready(&mut self, display: &Display) {
            assert_eq!(display.size(), 2048);
            self.frames += 1;
        }

        fn sound_state_changed(&mut self, active: bool) {
            self.sound.push(active);
        }
    }

    #[test]
    fn test_frontend_notifications() {
        // LD V0,3; LD ST,V0; CLS; JP self
        let mut m = machine(&[0x6003, 0xF018, 0x00E0, 0x1206]);
        let mut rec = Recorder::default();
        for _ in 0..4 {
            m.tick_with(&mut rec);
        }
        assert_eq!(rec.frames, 1);
        assert_eq!(rec.sound, vec![true, false]);
    }

    #[test]
    fn test_restored_state_is_reported_to_frontend() {
        // LD V0,5; LD ST,V0; CLS; JP self
        let mut m = machine(&[0x6005, 0xF018, 0x00E0, 0x1206]);
        m.tick();
        let saved = m.save_state();

        let mut other = Interpreter::new();
        other.load_state(&saved).unwrap();
        assert!(other.is_sound_active());
        let mut rec = Recorder::default();
        for _ in 0..10 {
            other.tick_with(&mut rec);
        }
        assert_eq!(rec.frames, 1);
        assert_eq!(rec.sound, vec![true, false]);
    }

    #[test]
    fn test_sound_set_by_step_is_reported() {
        let mut m = machine(&[0x6002, 0xF018, 0x1204]);
        steps(&mut m, 2);
        let mut rec = Recorder::default();
        // ST 2 -> 1, then 1 -> 0
        m.tick_with(&mut rec);
        assert_eq!(rec.sound, vec![true]);
        m.tick_with(&mut rec);
        assert_eq!(rec.sound, vec![true, false]);
        assert_eq!(rec.frames, 0);
    }
}
