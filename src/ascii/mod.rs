//! Host-side ASCII grid policy.
//!
//! The per-pixel work happens on the GPU. This module holds what the host
//! decides before a frame is drawn:
//!
//! 1. **Grid calculation** - rows and columns from the source aspect ratio
//! 2. **Character sets** - ordered glyph ramps, sparsest to densest
//! 3. **Dither mode** - how luminance is quantized into a glyph index
//!
//! # Character Sets
//!
//! Built-in sets are selected via [`CharsetKey`]:
//! - `Standard` - 10-level ASCII density ramp
//! - `Detailed` - 70-level ramp
//! - `Blocks` - Unicode block characters
//! - `Minimal` - 4-level clean look
//! - `Binary` / `Dots` - stylized looks

mod charset;
mod dither;
mod grid;

pub use charset::{
    CharsetKey, BINARY_CHARSET, BLOCKS_CHARSET, DETAILED_CHARSET, DOTS_CHARSET, MINIMAL_CHARSET,
    STANDARD_CHARSET,
};
pub use dither::DitherMode;
pub use grid::{
    calculate_grid, default_columns, GridDimensions, GridLayout, CHAR_WIDTH_RATIO,
    DEFAULT_FONT_SIZE, DEFAULT_MAX_WIDTH,
};
