pub use config::{Config, SpriteEdge};
pub use error::{Error, Result};
pub use machine::{Machine, Step};
pub use state::FrameBuffer;

mod config;
pub mod constants;
mod error;
mod instruction;
pub mod loader;
mod machine;
mod opcode;
mod operations;
pub mod state;
