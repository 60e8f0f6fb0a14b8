//! Command-line interface definitions and helpers.
//!
//! This module contains all CLI argument parsing, enums, and subcommand handlers.

mod args;
mod commands;
mod enums;

pub use args::{Args, Command, ConfigAction};
pub use commands::{
    detect, handle_config_action, list_charsets, run_atlas, run_grid, run_render, CliError,
    RenderArgs,
};
pub use enums::{CharacterSet, Dialect, Dither};
