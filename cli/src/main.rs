use std::path::PathBuf;

use clap::Parser;

use vip8::constants::DEFAULT_INSTRUCTIONS_PER_SECOND;
use vip8::{Config, SpriteEdge};

mod keymap;
mod run;

/// Runs a CHIP-8 program in an SDL2 window.
///
/// Hold Space to run as fast as possible, Escape quits. Set RUST_LOG=vip8=trace to
/// see every instruction.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Path to the ROM to run
    rom: PathBuf,

    /// Instructions executed per second
    #[arg(long, default_value_t = DEFAULT_INSTRUCTIONS_PER_SECOND, value_parser = clap::value_parser!(u32).range(1..))]
    ips: u32,

    /// Window pixels per CHIP-8 pixel
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u32).range(1..))]
    scale: u32,

    /// Drop sprite pixels past the display edges instead of wrapping them around
    #[arg(long)]
    clip: bool,

    /// Don't put the built-in hex font in memory
    #[arg(long)]
    no_font: bool,

    /// Shift instructions read Vy instead of shifting Vx in place
    #[arg(long)]
    shift_vy: bool,

    /// FX55/FX65 advance I past the registers they transfer
    #[arg(long)]
    increment_i: bool,
}

impl Args {
    fn config(&self) -> Config {
        Config {
            sprite_edge: if self.clip {
                SpriteEdge::Clip
            } else {
                SpriteEdge::Wrap
            },
            load_font: !self.no_font,
            shift_uses_vy: self.shift_vy,
            load_store_increments_i: self.increment_i,
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();
    run::run(&args.rom, args.config(), args.ips, args.scale)
}
