//! video2ascii library crate.
//!
//! Renders a video or image source as colored ASCII art on the GPU. The
//! host supplies the GPU context, the frame scheduler and the media; the
//! crate owns the grid policy, glyph atlas, shader program, effects and
//! frame loop.

pub mod ascii;
pub mod clock;
pub mod config;
pub mod effects;
pub mod frame_loop;
pub mod gpu;
pub mod input;
pub mod logging;
pub mod media;
pub mod player;
pub mod render;

pub use config::{AsciiOptions, Config, ConfigError};
pub use frame_loop::AsciiStats;
pub use player::AsciiPlayer;
pub use render::RenderError;
