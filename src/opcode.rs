/// # Opcodes
///
/// Every instruction is a big-endian 16-bit word. Reading it as four nibbles `(f, x, y, n)`:
/// - `f` picks the instruction family
/// - `x` and `y` name registers Vx and Vy (or, for FX55/FX65, the range V0..=Vx)
/// - `n` is a 4-bit count (sprite height) or picks an operation within a family
/// - the low byte `kk` is an 8-bit immediate
/// - the low three nibbles `addr` are a 12-bit address
///
/// Which of these carry meaning depends on the family; decoding only ever masks and
/// shifts, so every extracted field is already in range for its width.
pub trait Opcode {
    /// `[fxyn]` as a tuple for pattern matching.
    fn nibbles(&self) -> (u8, u8, u8, u8);

    /// `[f___]`
    fn family(&self) -> u8;

    /// `[_x__]`
    fn x(&self) -> usize;

    /// `[__y_]`
    fn y(&self) -> usize;

    /// `[___n]`
    fn n(&self) -> u8;

    /// `[__kk]`
    fn kk(&self) -> u8;

    /// `[_nnn]`
    fn addr(&self) -> u16;
}

impl Opcode for u16 {
    fn nibbles(&self) -> (u8, u8, u8, u8) {
        (self.family(), self.x() as u8, self.y() as u8, self.n())
    }

    fn family(&self) -> u8 {
        ((self & 0xF000) >> 12) as u8
    }

    fn x(&self) -> usize {
        usize::from((self & 0x0F00) >> 8)
    }

    fn y(&self) -> usize {
        usize::from((self & 0x00F0) >> 4)
    }

    fn n(&self) -> u8 {
        (self & 0x000F) as u8
    }

    fn kk(&self) -> u8 {
        (self & 0x00FF) as u8
    }

    fn addr(&self) -> u16 {
        self & 0x0FFF
    }
}

/// Combines two consecutive memory bytes into an opcode
pub fn from_bytes(high: u8, low: u8) -> u16 {
    u16::from_be_bytes([high, low])
}
