//! The render core: one program, two textures, one draw per tick.
//!
//! ```text
//!  Drawable ──upload──► video texture (unit 0) ─┐
//!                                                ├─► fragment shader ─► canvas
//!  GlyphAtlas ─upload─► atlas texture (unit 1) ─┘        ▲
//!                                                         │
//!             core uniforms + registered effect setters ──┘
//! ```
//!
//! Everything GPU-side is created in [`RenderCore::new`] and released when
//! the core is dropped, including when `new` itself fails halfway.

use std::rc::Rc;

use super::atlas::{AtlasCache, GlyphAtlas, GlyphRasterizer};
use super::registry::UniformSetterRegistry;
use super::shader::{fragment_source, vertex_source, ShaderDialect};
use super::uniforms::{write_effect_defaults, UniformLocations};
use super::RenderError;
use crate::ascii::{
    calculate_grid, default_columns, CharsetKey, DitherMode, GridDimensions, GridLayout,
    DEFAULT_FONT_SIZE, DEFAULT_MAX_WIDTH,
};
use crate::config::ConfigError;
use crate::gpu::{GpuBackend, ProgramId, TextureFilter, TextureId, UniformWriter};
use crate::media::Drawable;

/// Texture unit the source frame is bound to.
pub const VIDEO_TEXTURE_UNIT: u32 = 0;

/// Texture unit the glyph atlas is bound to.
pub const ATLAS_TEXTURE_UNIT: u32 = 1;

/// Upper bound accepted for `brightness`.
pub const MAX_BRIGHTNESS: f32 = 4.0;

/// Shader tone-mapping scalars.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    /// Tint glyphs with the sampled cell color
    pub colored: bool,
    /// How much of the source shows through between glyph strokes (0-1)
    pub blend: f32,
    /// Strength of the contrast curve (0-1)
    pub highlight: f32,
    /// Luminance multiplier (0-[`MAX_BRIGHTNESS`])
    pub brightness: f32,
}

impl Default for Tone {
    fn default() -> Self {
        Self {
            colored: true,
            blend: 0.0,
            highlight: 0.0,
            brightness: 1.0,
        }
    }
}

impl Tone {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_range("blend", self.blend, 0.0, 1.0)?;
        check_range("highlight", self.highlight, 0.0, 1.0)?;
        check_range("brightness", self.brightness, 0.0, MAX_BRIGHTNESS)?;
        Ok(())
    }
}

fn check_range(name: &'static str, value: f32, min: f32, max: f32) -> Result<(), ConfigError> {
    if value.is_finite() && (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            name,
            value: f64::from(value),
            min: f64::from(min),
            max: f64::from(max),
        })
    }
}

/// Everything the core needs to know to draw.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSettings {
    /// Glyphs ordered sparsest to densest
    pub charset: String,
    /// Grid width; `None` derives it from `max_width` and `font_size`
    pub num_columns: Option<u32>,
    /// Cell height in pixels
    pub font_size: f32,
    /// Canvas width budget used when `num_columns` is unset
    pub max_width: f32,
    pub tone: Tone,
    pub dither: DitherMode,
    pub dialect: ShaderDialect,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            charset: CharsetKey::default().chars().to_string(),
            num_columns: None,
            font_size: DEFAULT_FONT_SIZE,
            max_width: DEFAULT_MAX_WIDTH,
            tone: Tone::default(),
            dither: DitherMode::default(),
            dialect: ShaderDialect::default(),
        }
    }
}

impl RenderSettings {
    /// Check the settings without touching the GPU.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.charset.is_empty() {
            return Err(ConfigError::EmptyCharset);
        }
        if self.num_columns == Some(0) {
            return Err(ConfigError::ZeroColumns);
        }
        check_range("font_size", self.font_size, 1.0, 512.0)?;
        check_range("max_width", self.max_width, 1.0, 65_536.0)?;
        self.tone.validate()
    }

    /// Requested column count, or the width-derived default.
    pub fn columns(&self) -> u32 {
        self.num_columns
            .unwrap_or_else(|| default_columns(self.max_width, self.font_size))
    }
}

/// What a tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// A frame was uploaded and drawn
    Drawn,
    /// Nothing to draw yet (no frame, or an empty grid)
    Skipped,
}

/// Owns the backend and every GPU object created through it.
///
/// Dropping it deletes whatever was created, so a half-finished
/// initialization cleans up after itself.
struct GpuResources<B: GpuBackend> {
    backend: B,
    program: Option<ProgramId>,
    textures: Vec<TextureId>,
}

impl<B: GpuBackend> GpuResources<B> {
    fn new(backend: B) -> Self {
        Self {
            backend,
            program: None,
            textures: Vec::new(),
        }
    }

    fn create_texture(&mut self, filter: TextureFilter) -> Result<TextureId, RenderError> {
        let texture = self.backend.create_texture(filter)?;
        self.textures.push(texture);
        Ok(texture)
    }
}

impl<B: GpuBackend> Drop for GpuResources<B> {
    fn drop(&mut self) {
        for texture in self.textures.drain(..) {
            self.backend.delete_texture(texture);
        }
        if let Some(program) = self.program.take() {
            self.backend.delete_program(program);
        }
        log::debug!("Released GPU resources");
    }
}

/// Draws a [`Drawable`] as ASCII art through a [`GpuBackend`].
pub struct RenderCore<B: GpuBackend> {
    gpu: GpuResources<B>,
    program: ProgramId,
    video_texture: TextureId,
    atlas_texture: TextureId,
    locations: UniformLocations,
    registry: UniformSetterRegistry,
    applied_generation: Option<u64>,
    rasterizer: Box<dyn GlyphRasterizer>,
    atlas_cache: AtlasCache,
    atlas: Rc<GlyphAtlas>,
    settings: RenderSettings,
    source_size: (u32, u32),
    grid: GridDimensions,
    layout: GridLayout,
    epoch_ms: Option<f64>,
    frames_drawn: u64,
}

impl<B: GpuBackend> RenderCore<B> {
    /// Build the pipeline.
    ///
    /// # Arguments
    /// * `backend` - GPU backend; owned by the core from now on
    /// * `settings` - Initial render settings
    /// * `rasterizer` - Glyph source for atlas builds
    ///
    /// # Errors
    /// [`RenderError::Config`] for invalid settings or an atlas wider than
    /// the backend's texture limit (both checked before any GPU work) and
    /// [`RenderError::ResourceInit`] when the backend fails.
    pub fn new(
        backend: B,
        settings: RenderSettings,
        rasterizer: Box<dyn GlyphRasterizer>,
    ) -> Result<Self, RenderError> {
        settings.validate()?;

        let layout = GridLayout::new(GridDimensions::EMPTY, settings.font_size);
        let (cell_width, cell_height) = layout.cell_pixels();
        let mut atlas_cache = AtlasCache::new();
        let atlas = atlas_cache.get_or_build(
            &settings.charset,
            cell_width,
            cell_height,
            backend.max_texture_size(),
            rasterizer.as_ref(),
        )?;

        let mut gpu = GpuResources::new(backend);

        let program = gpu.backend.create_program(
            &vertex_source(settings.dialect),
            &fragment_source(settings.dialect),
        )?;
        gpu.program = Some(program);
        log::info!("Linked ASCII shader program ({:?})", settings.dialect);

        let locations = UniformLocations::resolve(&mut gpu.backend, program);

        let video_texture = gpu.create_texture(TextureFilter::Linear)?;
        let atlas_texture = gpu.create_texture(TextureFilter::Nearest)?;

        gpu.backend
            .upload_texture(atlas_texture, atlas.width(), atlas.height(), atlas.pixels());

        Ok(Self {
            gpu,
            program,
            video_texture,
            atlas_texture,
            locations,
            registry: UniformSetterRegistry::new(),
            applied_generation: None,
            rasterizer,
            atlas_cache,
            atlas,
            settings,
            source_size: (0, 0),
            grid: GridDimensions::EMPTY,
            layout,
            epoch_ms: None,
            frames_drawn: 0,
        })
    }

    /// Render one frame of `source`.
    ///
    /// Skips (without touching the GPU) while the source has no frame or the
    /// grid is empty.
    pub fn tick(&mut self, source: &dyn Drawable, now_ms: f64) -> TickOutcome {
        if !source.has_frame() {
            return TickOutcome::Skipped;
        }
        let Some(frame) = source.frame() else {
            return TickOutcome::Skipped;
        };
        self.sync_source_size(frame.width, frame.height);
        if self.grid.is_empty() {
            return TickOutcome::Skipped;
        }

        let epoch = *self.epoch_ms.get_or_insert(now_ms);
        let backend = &mut self.gpu.backend;

        backend.upload_texture(self.video_texture, frame.width, frame.height, frame.pixels);
        backend.use_program(self.program);
        backend.bind_texture(VIDEO_TEXTURE_UNIT, self.video_texture);
        backend.bind_texture(ATLAS_TEXTURE_UNIT, self.atlas_texture);

        let generation = self.registry.generation();
        if self.applied_generation != Some(generation) {
            write_effect_defaults(backend, &self.locations);
            self.applied_generation = Some(generation);
        }

        write_core_uniforms(
            backend,
            &self.locations,
            &CoreUniforms {
                grid: self.grid,
                layout: self.layout,
                num_chars: self.atlas.glyph_count(),
                tone: self.settings.tone,
                dither: self.settings.dither,
                time_seconds: ((now_ms - epoch) / 1000.0) as f32,
            },
        );
        self.registry.apply(backend, &self.locations);

        backend.draw_quad(self.layout.canvas_width, self.layout.canvas_height);
        self.frames_drawn += 1;
        TickOutcome::Drawn
    }

    /// Recompute the grid if the source size changed.
    ///
    /// # Returns
    /// True when the grid changed.
    pub fn sync_source_size(&mut self, width: u32, height: u32) -> bool {
        if self.source_size == (width, height) {
            return false;
        }
        self.source_size = (width, height);
        self.recompute_grid()
    }

    fn recompute_grid(&mut self) -> bool {
        let (width, height) = self.source_size;
        let grid = calculate_grid(width, height, self.settings.columns());
        let layout = GridLayout::new(grid, self.settings.font_size);
        let changed = grid != self.grid || layout != self.layout;
        if grid != self.grid {
            log::info!("Grid {} for {}x{} source", grid, width, height);
        }
        self.grid = grid;
        self.layout = layout;
        changed
    }

    /// Switch to another charset. The atlas comes from the cache when this
    /// charset was used before.
    pub fn set_charset(&mut self, charset: &str) -> Result<(), ConfigError> {
        if charset == self.settings.charset {
            return Ok(());
        }
        self.load_atlas(charset, self.layout.cell_pixels())?;
        self.settings.charset = charset.to_string();
        Ok(())
    }

    /// Change the cell height. Rebuilds the atlas at the new cell size.
    pub fn set_font_size(&mut self, font_size: f32) -> Result<(), ConfigError> {
        check_range("font_size", font_size, 1.0, 512.0)?;
        let cell = GridLayout::new(self.grid, font_size).cell_pixels();
        let charset = self.settings.charset.clone();
        self.load_atlas(&charset, cell)?;
        self.settings.font_size = font_size;
        self.recompute_grid();
        Ok(())
    }

    fn load_atlas(&mut self, charset: &str, cell: (u32, u32)) -> Result<(), ConfigError> {
        let max_width = self.gpu.backend.max_texture_size();
        let atlas = self.atlas_cache.get_or_build(
            charset,
            cell.0,
            cell.1,
            max_width,
            self.rasterizer.as_ref(),
        )?;
        if !Rc::ptr_eq(&atlas, &self.atlas) {
            self.gpu.backend.upload_texture(
                self.atlas_texture,
                atlas.width(),
                atlas.height(),
                atlas.pixels(),
            );
            self.atlas = atlas;
        }
        Ok(())
    }

    /// Change the column count (`None` for the width-derived default).
    pub fn set_num_columns(&mut self, num_columns: Option<u32>) -> Result<(), ConfigError> {
        if num_columns == Some(0) {
            return Err(ConfigError::ZeroColumns);
        }
        self.settings.num_columns = num_columns;
        self.recompute_grid();
        Ok(())
    }

    /// Change the width budget used when no column count is set.
    pub fn set_max_width(&mut self, max_width: f32) -> Result<(), ConfigError> {
        check_range("max_width", max_width, 1.0, 65_536.0)?;
        self.settings.max_width = max_width;
        self.recompute_grid();
        Ok(())
    }

    pub fn set_tone(&mut self, tone: Tone) -> Result<(), ConfigError> {
        tone.validate()?;
        self.settings.tone = tone;
        Ok(())
    }

    pub fn set_dither(&mut self, dither: DitherMode) {
        self.settings.dither = dither;
    }

    /// Registry effects attach their uniform setters to.
    pub fn registry_mut(&mut self) -> &mut UniformSetterRegistry {
        &mut self.registry
    }

    pub fn registry(&self) -> &UniformSetterRegistry {
        &self.registry
    }

    pub fn locations(&self) -> &UniformLocations {
        &self.locations
    }

    pub fn dimensions(&self) -> GridDimensions {
        self.grid
    }

    pub fn layout(&self) -> GridLayout {
        self.layout
    }

    pub fn atlas(&self) -> &GlyphAtlas {
        &self.atlas
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    /// True once a source size is known and the grid is drawable.
    pub fn is_ready(&self) -> bool {
        !self.grid.is_empty()
    }

    pub fn frames_drawn(&self) -> u64 {
        self.frames_drawn
    }

    pub fn backend(&self) -> &B {
        &self.gpu.backend
    }
}

impl<B: GpuBackend> std::fmt::Debug for RenderCore<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderCore")
            .field("program", &self.program)
            .field("grid", &self.grid)
            .field("glyphs", &self.atlas.glyph_count())
            .field("registry", &self.registry)
            .field("frames_drawn", &self.frames_drawn)
            .finish()
    }
}

/// Per-frame values owned by the core itself.
struct CoreUniforms {
    grid: GridDimensions,
    layout: GridLayout,
    num_chars: usize,
    tone: Tone,
    dither: DitherMode,
    time_seconds: f32,
}

fn write_core_uniforms(gpu: &mut dyn UniformWriter, loc: &UniformLocations, frame: &CoreUniforms) {
    gpu.put_int(loc.video, VIDEO_TEXTURE_UNIT as i32);
    gpu.put_int(loc.ascii_atlas, ATLAS_TEXTURE_UNIT as i32);
    gpu.put_vec2(
        loc.resolution,
        [
            frame.layout.canvas_width as f32,
            frame.layout.canvas_height as f32,
        ],
    );
    gpu.put_vec2(
        loc.char_size,
        [frame.layout.cell_width, frame.layout.cell_height],
    );
    gpu.put_vec2(
        loc.grid_size,
        [frame.grid.cols as f32, frame.grid.rows as f32],
    );
    gpu.put_float(loc.num_chars, frame.num_chars as f32);
    gpu.put_int(loc.colored, i32::from(frame.tone.colored));
    gpu.put_float(loc.blend, frame.tone.blend);
    gpu.put_float(loc.highlight, frame.tone.highlight);
    gpu.put_float(loc.brightness, frame.tone.brightness);
    gpu.put_int(loc.dither_mode, frame.dither.shader_value());
    gpu.put_float(loc.time, frame.time_seconds);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_are_valid() {
        assert!(RenderSettings::default().validate().is_ok());
    }

    #[test]
    fn test_default_columns_follow_width_budget() {
        let settings = RenderSettings::default();
        assert_eq!(settings.columns(), 150);
    }

    #[test]
    fn test_zero_columns_rejected() {
        let settings = RenderSettings {
            num_columns: Some(0),
            ..RenderSettings::default()
        };
        assert!(matches!(settings.validate(), Err(ConfigError::ZeroColumns)));
    }

    #[test]
    fn test_tone_out_of_range_rejected() {
        let tone = Tone {
            blend: 1.5,
            ..Tone::default()
        };
        assert!(matches!(
            tone.validate(),
            Err(ConfigError::OutOfRange { name: "blend", .. })
        ));
        let tone = Tone {
            brightness: f32::NAN,
            ..Tone::default()
        };
        assert!(tone.validate().is_err());
    }
}
