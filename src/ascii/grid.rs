//! Grid calculation for aspect-ratio-correct ASCII rendering.

use serde::Serialize;

/// Width of a glyph cell relative to its height.
///
/// Glyph cells are taller than wide, so a naive one-pixel-per-cell mapping
/// would stretch the picture vertically. Row counts are scaled by this factor.
pub const CHAR_WIDTH_RATIO: f32 = 0.6;

/// Default font size (cell height in pixels).
pub const DEFAULT_FONT_SIZE: f32 = 10.0;

/// Default maximum canvas width in pixels, used when no column count is given.
pub const DEFAULT_MAX_WIDTH: f32 = 900.0;

/// Character grid dimensions.
///
/// Derived from the source size and column count; never mutated directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct GridDimensions {
    pub cols: u32,
    pub rows: u32,
}

impl GridDimensions {
    /// An empty grid, used while the source has no known size.
    pub const EMPTY: GridDimensions = GridDimensions { cols: 0, rows: 0 };

    /// True when nothing can be drawn into this grid.
    pub fn is_empty(&self) -> bool {
        self.cols == 0 || self.rows == 0
    }

    /// Total number of cells.
    pub fn cell_count(&self) -> u32 {
        self.cols * self.rows
    }
}

impl std::fmt::Display for GridDimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.cols, self.rows)
    }
}

/// Calculate the character grid for a source image.
///
/// `rows = round(cols * source_height / source_width * CHAR_WIDTH_RATIO)`.
///
/// # Arguments
/// * `source_width` - Natural width of the source in pixels
/// * `source_height` - Natural height of the source in pixels
/// * `num_columns` - Requested column count
///
/// # Returns
/// The grid, or [`GridDimensions::EMPTY`] when the source is not loaded yet
/// (zero dimensions) or no columns were requested.
///
/// # Example
/// ```
/// use video2ascii::ascii::calculate_grid;
///
/// let grid = calculate_grid(1920, 1080, 100);
/// assert_eq!((grid.cols, grid.rows), (100, 34));
/// ```
pub fn calculate_grid(source_width: u32, source_height: u32, num_columns: u32) -> GridDimensions {
    if source_width == 0 || source_height == 0 || num_columns == 0 {
        return GridDimensions::EMPTY;
    }

    let aspect = source_height as f64 / source_width as f64;
    let rows = (num_columns as f64 * aspect * CHAR_WIDTH_RATIO as f64).round() as u32;

    GridDimensions {
        cols: num_columns,
        rows,
    }
}

/// Column count used when none is requested: as many cells as fit in
/// `max_width` pixels at the given font size (at least one).
pub fn default_columns(max_width: f32, font_size: f32) -> u32 {
    let cell_width = font_size * CHAR_WIDTH_RATIO;
    if !(cell_width > 0.0) || !max_width.is_finite() {
        return 1;
    }
    ((max_width / cell_width).floor() as u32).max(1)
}

/// Pixel layout of a grid at a given font size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLayout {
    /// Cell width in pixels
    pub cell_width: f32,
    /// Cell height in pixels
    pub cell_height: f32,
    /// Canvas width in pixels (cols * cell_width, rounded)
    pub canvas_width: u32,
    /// Canvas height in pixels (rows * cell_height, rounded)
    pub canvas_height: u32,
}

impl GridLayout {
    /// Lay out `grid` with cells `font_size` pixels tall.
    pub fn new(grid: GridDimensions, font_size: f32) -> Self {
        let cell_width = font_size * CHAR_WIDTH_RATIO;
        let cell_height = font_size;
        Self {
            cell_width,
            cell_height,
            canvas_width: (grid.cols as f32 * cell_width).round() as u32,
            canvas_height: (grid.rows as f32 * cell_height).round() as u32,
        }
    }

    /// Cell size rounded to whole pixels, as used for atlas rasterization.
    pub fn cell_pixels(&self) -> (u32, u32) {
        (
            (self.cell_width.round() as u32).max(1),
            (self.cell_height.round() as u32).max(1),
        )
    }
}
