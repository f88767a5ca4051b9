/// What happens to sprite pixels that land past the edge of the display
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum SpriteEdge {
    /// Every pixel coordinate wraps around to the opposite edge
    #[default]
    Wrap,
    /// The sprite's origin wraps onto the display but pixels past an edge are dropped
    Clip,
}

/// # Config
/// Interpreter behaviour that differs between CHIP-8 implementations in the wild.
///
/// The defaults describe the bare machine: no font in memory, sprites wrap, shifts
/// operate on Vx in place and FX55/FX65 leave I untouched.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub struct Config {
    pub sprite_edge: SpriteEdge,
    /// Write the built-in sprite sheet into memory on reset
    pub load_font: bool,
    /// 8XY6/8XYE shift Vy into Vx instead of shifting Vx in place
    pub shift_uses_vy: bool,
    /// FX55/FX65 leave I pointing just past the last register transferred
    pub load_store_increments_i: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_bare_machine() {
        let config = Config::default();
        assert_eq!(config.sprite_edge, SpriteEdge::Wrap);
        assert!(!config.load_font);
        assert!(!config.shift_uses_vy);
        assert!(!config.load_store_increments_i);
    }
}
