//! GPU rendering of the ASCII grid.
//!
//! This module handles:
//! - Rasterizing charsets into glyph atlases
//! - The shader program and its cached uniform locations
//! - The uniform setter registry effects plug into
//! - Per-frame upload and draw in [`RenderCore`]

mod atlas;
mod core;
mod registry;
mod shader;
mod uniforms;

pub use atlas::{
    build_atlas, AtlasCache, FontRasterizer, GlyphAtlas, GlyphRasterizer, SYSTEM_FONT_CANDIDATES,
};
pub use self::core::{
    RenderCore, RenderSettings, TickOutcome, Tone, ATLAS_TEXTURE_UNIT, MAX_BRIGHTNESS,
    VIDEO_TEXTURE_UNIT,
};
pub use registry::{UniformSetter, UniformSetterRegistry};
pub use shader::{fragment_source, vertex_source, ShaderDialect, RIPPLE_RADIUS_SCALE};
pub use uniforms::{write_effect_defaults, UniformLocations, RIPPLE_SENTINEL, TRAIL_SENTINEL};

use crate::config::ConfigError;
use crate::gpu::ResourceInitError;

/// Errors from building or reconfiguring a [`RenderCore`].
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    ResourceInit(#[from] ResourceInitError),
}
