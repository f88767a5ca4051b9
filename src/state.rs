use crate::config::Config;
use crate::constants::{
    DISPLAY_HEIGHT, DISPLAY_WIDTH, FONT_ADDRESS, KEY_COUNT, MEMORY_SIZE, PROGRAM_START,
    REGISTER_COUNT, SPRITE_SHEET, STACK_SIZE,
};
use crate::error::{Error, Result};

/// The FrameBuffer is indexed as [y][x]; `true` is a lit pixel
pub type FrameBuffer = [[bool; DISPLAY_WIDTH]; DISPLAY_HEIGHT];

/// A snapshot of the complete machine
///
/// ## CPU
/// Registers
/// - (v) 16 8-bit registers V0..VF
///     - VF doubles as the carry, borrow, shifted-out bit and collision flag
/// - (i) a 16-bit index register, only ever holding 12-bit addresses
///
/// Counter
/// - (pc) a 16-bit program counter, 0x200 on reset
///
/// Stack
/// - 16 return addresses with a stack pointer (sp) counting the slots in use
///
/// Timers
/// - 2 8-bit timers (delay & sound) counting down at 60Hz
/// - the buzzer sounds while the sound timer is non-zero
///
/// ## Memory
/// - 4096 bytes; programs are loaded at 0x200
/// - 64x32 frame buffer, written only by the clear and draw instructions
///
/// ## Input
/// - pressed status of keys 0..F
/// - while FX0A waits, the register it will write is held in `register_needing_key`
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct State {
    pub v: [u8; REGISTER_COUNT],
    pub i: u16,
    pub pc: u16,
    pub sp: usize,
    pub delay_timer: u8,
    pub sound_timer: u8,
    pub stack: [u16; STACK_SIZE],
    pub memory: [u8; MEMORY_SIZE],
    pub frame_buffer: FrameBuffer,
    pub draw_flag: bool,
    pub pressed_keys: [bool; KEY_COUNT],
    pub register_needing_key: Option<usize>,
}

impl State {
    /// Power-on state: everything zeroed and the pc at the program start
    pub fn new() -> Self {
        State {
            v: [0; REGISTER_COUNT],
            i: 0,
            pc: PROGRAM_START,
            sp: 0,
            delay_timer: 0,
            sound_timer: 0,
            stack: [0; STACK_SIZE],
            memory: [0; MEMORY_SIZE],
            frame_buffer: [[false; DISPLAY_WIDTH]; DISPLAY_HEIGHT],
            draw_flag: false,
            pressed_keys: [false; KEY_COUNT],
            register_needing_key: None,
        }
    }

    /// Power-on state with whatever the config asks to be preloaded
    pub fn with_config(config: &Config) -> Self {
        let mut state = State::new();
        if config.load_font {
            let start = usize::from(FONT_ADDRESS);
            state.memory[start..start + SPRITE_SHEET.len()].copy_from_slice(&SPRITE_SHEET);
        }
        state
    }

    /// Borrows `len` bytes of memory starting at `address`
    pub fn read(&self, address: usize, len: usize) -> Result<&[u8]> {
        let end = checked_end(address, len)?;
        Ok(&self.memory[address..end])
    }

    /// Mutably borrows `len` bytes of memory starting at `address`
    pub fn read_mut(&mut self, address: usize, len: usize) -> Result<&mut [u8]> {
        let end = checked_end(address, len)?;
        Ok(&mut self.memory[address..end])
    }

    /// The opcode the pc points at
    pub fn fetch(&self) -> Result<u16> {
        let bytes = self.read(usize::from(self.pc), 2)?;
        Ok(crate::opcode::from_bytes(bytes[0], bytes[1]))
    }

    pub fn buzzer_active(&self) -> bool {
        self.sound_timer > 0
    }
}

impl Default for State {
    fn default() -> Self {
        Self::new()
    }
}

fn checked_end(address: usize, len: usize) -> Result<usize> {
    match address.checked_add(len) {
        Some(end) if end <= MEMORY_SIZE => Ok(end),
        _ => Err(Error::MemoryOutOfRange { address, len }),
    }
}
