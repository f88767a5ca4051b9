use std::io::Read;

use log::info;

use crate::constants::{MAX_PROGRAM_SIZE, MEMORY_SIZE, PROGRAM_START};
use crate::error::{Error, Result};

/// Copies a program image into memory at the program start
///
/// The image is copied verbatim; nothing is decoded. Memory outside the image is left
/// alone, so this is meant to follow a reset.
///
/// # Arguments
/// * `memory` the machine's memory
/// * `image` raw big-endian opcodes, at most `MAX_PROGRAM_SIZE` bytes
pub fn load(memory: &mut [u8; MEMORY_SIZE], image: &[u8]) -> Result<()> {
    if image.len() > MAX_PROGRAM_SIZE {
        return Err(Error::too_large(image.len()));
    }
    let start = usize::from(PROGRAM_START);
    memory[start..start + image.len()].copy_from_slice(image);
    info!("loaded {} byte program at {:#06X}", image.len(), start);
    Ok(())
}

/// Reads a whole program image from `reader` and loads it
pub fn load_from(memory: &mut [u8; MEMORY_SIZE], reader: &mut dyn Read) -> Result<()> {
    let mut image = Vec::with_capacity(MAX_PROGRAM_SIZE);
    // Read one byte past the limit so an oversized image is rejected rather than cut short
    reader
        .take(MAX_PROGRAM_SIZE as u64 + 1)
        .read_to_end(&mut image)?;
    load(memory, &image)
}
