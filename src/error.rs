use crate::constants::MAX_PROGRAM_SIZE;

/// Failures reported by the interpreter.
///
/// Load and accessor errors are caller mistakes and are reported at the call site.
/// Stack and memory errors are caused by the running program; the machine is left in
/// the state it had before the faulting instruction.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("program is {size} bytes, at most {max} bytes fit in memory")]
    ProgramTooLarge { size: usize, max: usize },

    #[error("failed to read program image")]
    ReadProgram(#[from] std::io::Error),

    #[error("stack overflow: call at {pc:#06X} with a full stack")]
    StackOverflow { pc: u16 },

    #[error("stack underflow: return at {pc:#06X} with an empty stack")]
    StackUnderflow { pc: u16 },

    #[error("memory access of {len} byte(s) at {address:#06X} is out of range")]
    MemoryOutOfRange { address: usize, len: usize },

    #[error("pixel ({x}, {y}) is out of range")]
    PixelOutOfRange { x: usize, y: usize },

    #[error("key {key:#X} is out of range")]
    KeyOutOfRange { key: u8 },
}

impl Error {
    pub(crate) fn too_large(size: usize) -> Self {
        Error::ProgramTooLarge {
            size,
            max: MAX_PROGRAM_SIZE,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
