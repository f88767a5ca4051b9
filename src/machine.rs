use std::io::Read;

use log::{debug, info, trace, warn};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

use crate::config::Config;
use crate::constants::{DISPLAY_HEIGHT, DISPLAY_WIDTH, REGISTER_COUNT};
use crate::error::{Error, Result};
use crate::instruction;
use crate::loader;
use crate::operations::Context;
use crate::state::{FrameBuffer, State};

/// What a successful `step` did
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Step {
    /// An instruction ran
    Executed,
    /// FX0A is waiting for a key; the pc hasn't moved and the next step runs it again
    AwaitingKey,
    /// The opcode isn't one we know; it was skipped and nothing else changed
    Unsupported { opcode: u16 },
}

/// # Machine
/// A CHIP-8 interpreter: the current `State` plus what's needed to advance it.
///
/// Supplies interfaces for:
/// - resetting and loading programs
/// - advancing the CPU one instruction at a time
/// - advancing the 60Hz timers
/// - pressing and releasing keys
/// - inspecting the frame buffer and buzzer for some host to present
///
/// Nothing here sleeps or schedules; the host calls `step` at its instruction rate and
/// `tick_timers` at 60Hz.
///
/// Instructions that fault (stack misuse, memory access past the end) return an error and
/// leave the state as it was, so the machine stays halted on that instruction until reset.
pub struct Machine<R = StdRng> {
    state: State,
    config: Config,
    rng: R,
}

impl Machine<StdRng> {
    /// A machine whose CXNN draws from an entropy-seeded rng
    pub fn new(config: Config) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }
}

impl Default for Machine<StdRng> {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl<R: RngCore> Machine<R> {
    /// A machine whose CXNN draws from `rng`
    pub fn with_rng(config: Config, rng: R) -> Self {
        Machine {
            state: State::with_config(&config),
            config,
            rng,
        }
    }

    /// Puts every part of the machine back to its power-on state, including memory
    ///
    /// The blank frame is flagged for redraw so hosts stop showing the old one.
    /// The rng is not rewound: CXNN carries on from where it was.
    pub fn reset(&mut self) {
        self.state = State {
            draw_flag: true,
            ..State::with_config(&self.config)
        };
        info!("machine reset");
    }

    /// Copies a program image into memory at 0x200
    pub fn load_program(&mut self, image: &[u8]) -> Result<()> {
        loader::load(&mut self.state.memory, image)
    }

    /// Load a rom from a source
    ///
    /// # Arguments
    /// * `reader` a reader positioned at the start of a ROM image
    pub fn load_rom(&mut self, reader: &mut dyn Read) -> Result<()> {
        loader::load_from(&mut self.state.memory, reader)
    }

    /// Advances the CPU by a single instruction
    /// - fetches the opcode the pc points at
    /// - decodes it, skipping it if it's unsupported
    /// - executes it, committing the new state only if it succeeded
    pub fn step(&mut self) -> Result<Step> {
        let op = self.state.fetch()?;
        trace!(
            "{:04X} v{:02X?} i{:04X} pc{:04X}",
            op,
            self.state.v,
            self.state.i,
            self.state.pc
        );

        let operation = match instruction::from_op(&op) {
            Some(operation) => operation,
            None => {
                warn!(
                    "unsupported opcode {:04X} at {:#06X}, skipping it",
                    op, self.state.pc
                );
                self.state.pc += 0x2;
                return Ok(Step::Unsupported { opcode: op });
            }
        };

        let was_waiting = self.state.register_needing_key.is_some();
        let mut ctx = Context {
            config: &self.config,
            rng: &mut self.rng,
        };
        self.state = operation(&op, &self.state, &mut ctx)?;

        match self.state.register_needing_key {
            Some(register) => {
                if !was_waiting {
                    debug!("waiting for a key press to store in v{:X}", register);
                }
                Ok(Step::AwaitingKey)
            }
            None => Ok(Step::Executed),
        }
    }

    /// Counts both timers down by one, stopping at zero
    pub fn tick_timers(&mut self) {
        self.state.delay_timer = self.state.delay_timer.saturating_sub(1);
        self.state.sound_timer = self.state.sound_timer.saturating_sub(1);
    }

    /// Whether the pixel at (x, y) is lit
    pub fn get_pixel(&self, x: usize, y: usize) -> Result<bool> {
        if x >= DISPLAY_WIDTH || y >= DISPLAY_HEIGHT {
            return Err(Error::PixelOutOfRange { x, y });
        }
        Ok(self.state.frame_buffer[y][x])
    }

    /// Set the pressed status of a key
    ///
    /// # Arguments
    /// * `key` the keypad key, 0x0..=0xF
    /// * `pressed` whether it's held down
    pub fn set_key(&mut self, key: u8, pressed: bool) -> Result<()> {
        let slot = self
            .state
            .pressed_keys
            .get_mut(usize::from(key))
            .ok_or(Error::KeyOutOfRange { key })?;
        *slot = pressed;
        Ok(())
    }

    /// Returns the FrameBuffer if it changed since it was last taken
    pub fn take_frame(&mut self) -> Option<FrameBuffer> {
        if self.state.draw_flag {
            self.state.draw_flag = false;
            Some(self.state.frame_buffer)
        } else {
            None
        }
    }

    pub fn frame_buffer(&self) -> &FrameBuffer {
        &self.state.frame_buffer
    }

    /// Whether the host should be sounding the buzzer
    pub fn buzzer_active(&self) -> bool {
        self.state.buzzer_active()
    }

    /// Whether FX0A is holding up execution
    pub fn awaiting_key(&self) -> bool {
        self.state.register_needing_key.is_some()
    }

    pub fn registers(&self) -> &[u8; REGISTER_COUNT] {
        &self.state.v
    }

    pub fn index(&self) -> u16 {
        self.state.i
    }

    pub fn program_counter(&self) -> u16 {
        self.state.pc
    }

    pub fn stack_pointer(&self) -> usize {
        self.state.sp
    }

    pub fn delay_timer(&self) -> u8 {
        self.state.delay_timer
    }

    pub fn sound_timer(&self) -> u8 {
        self.state.sound_timer
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}
