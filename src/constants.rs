/// Bytes of addressable memory
pub const MEMORY_SIZE: usize = 4096;

/// Where program images are loaded and where execution starts
pub const PROGRAM_START: u16 = 0x200;

/// The largest program image that fits between `PROGRAM_START` and the end of memory
pub const MAX_PROGRAM_SIZE: usize = MEMORY_SIZE - PROGRAM_START as usize;

/// I is a 12-bit pointer
pub const ADDRESS_MASK: u16 = 0x0FFF;

pub const REGISTER_COUNT: usize = 16;
pub const STACK_SIZE: usize = 16;
pub const KEY_COUNT: usize = 16;

pub const DISPLAY_WIDTH: usize = 64;
pub const DISPLAY_HEIGHT: usize = 32;

/// Timers count down at a fixed 60Hz regardless of the instruction rate
pub const TIMER_HZ: u32 = 60;

/// A reasonable default instruction rate for hosts
pub const DEFAULT_INSTRUCTIONS_PER_SECOND: u32 = 500;

/// Where the sprite sheet lives when it's loaded
pub const FONT_ADDRESS: u16 = 0x000;

/// Each glyph in the sprite sheet is 5 rows tall
pub const FONT_GLYPH_SIZE: u16 = 5;

/// # Sprite sheet
/// Hexadecimal digits 0..F, each a 4x5 sprite stored as 5 bytes where only the
/// high nibble is used.
/// ```text
/// 0xF0 ****
/// 0x90 *  *
/// 0x90 *  *
/// 0x90 *  *
/// 0xF0 ****
/// ```
pub const SPRITE_SHEET: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];
