//! Glyph atlas: the charset rasterized into a single 1xN texture strip.
//!
//! ```text
//!  ┌──────┬──────┬──────┬──────┬─────┐
//!  │ ' '  │ '.'  │ ':'  │ '-'  │ ... │   cell_width x cell_height each,
//!  └──────┴──────┴──────┴──────┴─────┘   sparsest glyph first
//! ```
//!
//! Glyphs are white with the rasterized coverage in every channel, so the
//! shader can tint them freely. Atlases are built off-screen (CPU
//! rasterization) and cached by charset and cell size; building is far too
//! expensive to repeat per frame.

use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;

use fontdue::{Font, FontSettings};

use crate::config::ConfigError;
use crate::gpu::ResourceInitError;

/// Monospace fonts tried, in order, by [`FontRasterizer::from_system`].
pub const SYSTEM_FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf",
    "/usr/share/fonts/TTF/DejaVuSansMono.ttf",
    "/usr/share/fonts/dejavu/DejaVuSansMono.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationMono-Regular.ttf",
    "/System/Library/Fonts/Menlo.ttc",
    "/System/Library/Fonts/Monaco.ttf",
    "C:\\Windows\\Fonts\\consola.ttf",
];

/// Fraction of the cell height where the baseline sits.
const BASELINE: f32 = 0.78;

/// Turns a single character into a coverage bitmap.
pub trait GlyphRasterizer {
    /// Rasterize `glyph` into a `width * height` coverage buffer (row-major,
    /// 0 = empty, 255 = fully covered).
    fn rasterize(&self, glyph: char, width: u32, height: u32) -> Vec<u8>;
}

/// [`GlyphRasterizer`] backed by a TrueType/OpenType font via `fontdue`.
pub struct FontRasterizer {
    font: Font,
}

impl FontRasterizer {
    /// Parse a font from raw bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ResourceInitError> {
        let font = Font::from_bytes(bytes, FontSettings::default()).map_err(|e| {
            ResourceInitError::FontUnavailable {
                message: e.to_string(),
            }
        })?;
        Ok(Self { font })
    }

    /// Load a font file.
    pub fn from_path(path: &Path) -> Result<Self, ResourceInitError> {
        let bytes = std::fs::read(path).map_err(|e| ResourceInitError::FontUnavailable {
            message: format!("{}: {}", path.display(), e),
        })?;
        Self::from_bytes(&bytes)
    }

    /// Load the first available font from [`SYSTEM_FONT_CANDIDATES`].
    pub fn from_system() -> Result<Self, ResourceInitError> {
        for candidate in SYSTEM_FONT_CANDIDATES {
            let path = Path::new(candidate);
            if path.exists() {
                match Self::from_path(path) {
                    Ok(rasterizer) => {
                        log::info!("Using font {}", candidate);
                        return Ok(rasterizer);
                    }
                    Err(e) => log::warn!("Skipping font {}: {}", candidate, e),
                }
            }
        }
        Err(ResourceInitError::FontUnavailable {
            message: "no monospace system font found; pass a font path".to_string(),
        })
    }
}

impl GlyphRasterizer for FontRasterizer {
    fn rasterize(&self, glyph: char, width: u32, height: u32) -> Vec<u8> {
        let mut cell = vec![0u8; (width * height) as usize];
        if glyph.is_whitespace() {
            return cell;
        }

        let px = height as f32 * 0.9;
        let (mut metrics, mut bitmap) = self.font.rasterize(glyph, px);

        // Shrink glyphs wider than the cell (wide Unicode symbols).
        if metrics.width > width as usize && metrics.width > 0 {
            let scale = width as f32 / metrics.width as f32;
            (metrics, bitmap) = self.font.rasterize(glyph, px * scale);
        }

        let baseline = (height as f32 * BASELINE) as i32;
        let top = baseline - metrics.height as i32 - metrics.ymin;
        let left = (width as i32 - metrics.width as i32) / 2;

        for gy in 0..metrics.height {
            let y = top + gy as i32;
            if y < 0 || y >= height as i32 {
                continue;
            }
            for gx in 0..metrics.width {
                let x = left + gx as i32;
                if x < 0 || x >= width as i32 {
                    continue;
                }
                cell[y as usize * width as usize + x as usize] = bitmap[gy * metrics.width + gx];
            }
        }
        cell
    }
}

/// A charset rasterized into one RGBA8 strip.
///
/// Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphAtlas {
    glyphs: Vec<char>,
    cell_width: u32,
    cell_height: u32,
    pixels: Vec<u8>,
}

impl GlyphAtlas {
    /// Glyphs in atlas order (sparsest first).
    pub fn glyphs(&self) -> &[char] {
        &self.glyphs
    }

    pub fn glyph_count(&self) -> usize {
        self.glyphs.len()
    }

    pub fn cell_size(&self) -> (u32, u32) {
        (self.cell_width, self.cell_height)
    }

    /// Texture width in pixels.
    pub fn width(&self) -> u32 {
        self.cell_width * self.glyphs.len() as u32
    }

    /// Texture height in pixels.
    pub fn height(&self) -> u32 {
        self.cell_height
    }

    /// RGBA8 pixels, row-major, `width() * height() * 4` bytes.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Coverage of glyph `index` at cell-local pixel `(x, y)`.
    pub fn coverage(&self, index: usize, x: u32, y: u32) -> Option<u8> {
        if index >= self.glyphs.len() || x >= self.cell_width || y >= self.cell_height {
            return None;
        }
        let px = index * self.cell_width as usize + x as usize;
        let offset = (y as usize * self.width() as usize + px) * 4 + 3;
        self.pixels.get(offset).copied()
    }

    /// Summed coverage of glyph `index`, a proxy for its visual weight.
    pub fn ink(&self, index: usize) -> u64 {
        let mut total = 0u64;
        for y in 0..self.cell_height {
            for x in 0..self.cell_width {
                total += self.coverage(index, x, y).unwrap_or(0) as u64;
            }
        }
        total
    }
}

/// Rasterize `charset` into an atlas.
///
/// # Arguments
/// * `charset` - Glyphs ordered from sparsest to densest
/// * `cell_width` / `cell_height` - Cell size in pixels
/// * `max_width` - Widest texture the GPU accepts
/// * `rasterizer` - Glyph source
///
/// # Errors
/// [`ConfigError::EmptyCharset`] for an empty charset,
/// [`ConfigError::InvalidCellSize`] for a zero-sized cell and
/// [`ConfigError::AtlasTooLarge`] when the strip would exceed `max_width`.
pub fn build_atlas(
    charset: &str,
    cell_width: u32,
    cell_height: u32,
    max_width: u32,
    rasterizer: &dyn GlyphRasterizer,
) -> Result<GlyphAtlas, ConfigError> {
    let glyphs: Vec<char> = charset.chars().collect();
    if glyphs.is_empty() {
        return Err(ConfigError::EmptyCharset);
    }
    if cell_width == 0 || cell_height == 0 {
        return Err(ConfigError::InvalidCellSize {
            width: cell_width,
            height: cell_height,
        });
    }

    let too_large = ConfigError::AtlasTooLarge {
        glyphs: glyphs.len(),
        cell_width,
        max_width,
    };
    let atlas_width = u32::try_from(glyphs.len())
        .ok()
        .and_then(|n| n.checked_mul(cell_width))
        .filter(|&w| w <= max_width && cell_height <= max_width)
        .ok_or(too_large)?;

    let row_bytes = atlas_width as usize * 4;
    let mut pixels = vec![0u8; row_bytes * cell_height as usize];

    for (index, &glyph) in glyphs.iter().enumerate() {
        let coverage = rasterizer.rasterize(glyph, cell_width, cell_height);
        let origin = index * cell_width as usize * 4;
        for y in 0..cell_height as usize {
            for x in 0..cell_width as usize {
                let value = coverage
                    .get(y * cell_width as usize + x)
                    .copied()
                    .unwrap_or(0);
                let offset = y * row_bytes + origin + x * 4;
                pixels[offset..offset + 4].copy_from_slice(&[value, value, value, value]);
            }
        }
    }

    log::info!(
        "Built glyph atlas: {} glyphs, {}x{} cells",
        glyphs.len(),
        cell_width,
        cell_height
    );

    Ok(GlyphAtlas {
        glyphs,
        cell_width,
        cell_height,
        pixels,
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct AtlasKey {
    charset: String,
    cell_width: u32,
    cell_height: u32,
}

/// Cache of built atlases keyed by charset and cell size.
#[derive(Debug, Default)]
pub struct AtlasCache {
    entries: HashMap<AtlasKey, Rc<GlyphAtlas>>,
}

impl AtlasCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached atlas, building it on first use.
    pub fn get_or_build(
        &mut self,
        charset: &str,
        cell_width: u32,
        cell_height: u32,
        max_width: u32,
        rasterizer: &dyn GlyphRasterizer,
    ) -> Result<Rc<GlyphAtlas>, ConfigError> {
        let key = AtlasKey {
            charset: charset.to_string(),
            cell_width,
            cell_height,
        };
        if let Some(atlas) = self.entries.get(&key) {
            log::debug!("Glyph atlas cache hit ({} glyphs)", atlas.glyph_count());
            return Ok(Rc::clone(atlas));
        }
        let atlas = Rc::new(build_atlas(
            charset,
            cell_width,
            cell_height,
            max_width,
            rasterizer,
        )?);
        self.entries.insert(key, Rc::clone(&atlas));
        Ok(atlas)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
