//! Subcommand handlers for grid, atlas, charsets, detect, render and config.

use std::path::{Path, PathBuf};
use std::rc::Rc;

use video2ascii::ascii::{calculate_grid, default_columns, CharsetKey, GridDimensions, GridLayout};
use video2ascii::clock::{Clock, ManualClock};
use video2ascii::config::{default_path, AsciiOptions, Config, ConfigError};
use video2ascii::frame_loop::ManualScheduler;
use video2ascii::gpu::{HeadlessBackend, ResourceInitError, DEFAULT_MAX_TEXTURE_SIZE};
use video2ascii::input::PointerEvent;
use video2ascii::media::{detect_media_type, is_gif, MediaType, StillImage};
use video2ascii::player::AsciiPlayer;
use video2ascii::render::{build_atlas, FontRasterizer, GlyphRasterizer, RenderError};

use super::args::ConfigAction;
use super::enums::{CharacterSet, Dialect, Dither};

/// Interval between simulated frame callbacks in `render`.
const FRAME_INTERVAL_MS: f64 = 1000.0 / 60.0;

/// Errors surfaced by subcommand handlers.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Resource(#[from] ResourceInitError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("Failed to read image '{}': {source}", .path.display())]
    Image {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("Failed to write '{}': {message}", .path.display())]
    Output { path: PathBuf, message: String },

    #[error("Config file already exists: {}", .0.display())]
    ConfigExists(PathBuf),

    #[error("Failed to write config file '{}': {source}", .path.display())]
    ConfigWrite {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Default configuration written by `config init`. Every value matches
/// [`Config::default`].
pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# video2ascii configuration

[source]
# Image or video path/URL; the media type is detected from the extension
# src = "clip.mp4"
# Force the media type: video, image
# media_type = "video"

[render]
# Fixed column count (default: as many as fit in max_width)
# num_columns = 120
# Cell height in pixels; cells are 0.6x as wide
font_size = 10.0
# Canvas width budget used when num_columns is not set
max_width = 900.0
# Tint glyphs with the source color
colored = true
# Mix of source pixels behind the glyphs (0-1)
blend = 0.0
# Highlight boost for bright cells (0-1)
highlight = 0.0
# Brightness multiplier (0-4)
brightness = 1.0
# Dithering: none, bayer, random
dither = "none"
# Character set: standard, detailed, blocks, minimal, binary, dots
charset = "standard"
# Custom glyphs, sparsest first (overrides charset)
# custom_charset = " .oO@"
# Shader dialect: gles300, glsl330
dialect = "gles300"

[mouse]
# Glow trail following the pointer
enabled = false
trail_length = 20
radius = 0.08

[ripple]
# Ripples spawned on click
enabled = false
speed = 30.0

[ripple.tuning]
# Distance a ripple travels; lifetime = travel / speed, clamped
travel = 60.0
min_lifetime_ms = 100.0
max_lifetime_ms = 10000.0

[audio]
# Audio reactivity strength; 0 disables the effect
effect = 0.0
# Sensitivity to the audio level
range = 50.0

[audio.tuning]
reactivity_scale = 0.01
sensitivity_scale = 0.02
max_level = 1.0

[playback]
is_playing = true
auto_play = true
# Space toggles play/pause
enable_spacebar_toggle = false
# Show the FPS label
show_stats = false
"#;

/// Print the grid for a source size.
///
/// # Arguments
/// * `size` - Source size, or `None` to read it from `image`
/// * `image` - Image file to take the size from
/// * `columns` / `font_size` / `max_width` - Overrides for the config values
pub fn run_grid(
    options: &AsciiOptions,
    size: Option<(u32, u32)>,
    image: Option<&Path>,
    columns: Option<u32>,
    font_size: Option<f32>,
    max_width: Option<f32>,
) -> Result<(), CliError> {
    let (width, height) = match (size, image) {
        (Some(size), _) => size,
        (None, Some(path)) => image::image_dimensions(path).map_err(|e| CliError::Image {
            path: path.to_path_buf(),
            source: e,
        })?,
        (None, None) => (0, 0),
    };

    let font_size = font_size.unwrap_or(options.font_size);
    let max_width = max_width.unwrap_or(options.max_width);
    let columns = columns
        .or(options.num_columns)
        .unwrap_or_else(|| default_columns(max_width, font_size));

    let grid = calculate_grid(width, height, columns);
    let layout = GridLayout::new(grid, font_size);

    println!("Source:  {}x{}", width, height);
    println!("Grid:    {} cols x {} rows ({} cells)", grid.cols, grid.rows, grid.cell_count());
    println!(
        "Cell:    {:.1}x{:.1} px",
        layout.cell_width, layout.cell_height
    );
    println!("Canvas:  {}x{} px", layout.canvas_width, layout.canvas_height);
    if grid.is_empty() {
        println!();
        println!("Grid is empty; nothing would be drawn.");
    }
    Ok(())
}

/// Rasterize a charset and write the atlas as PNG.
pub fn run_atlas(
    options: &AsciiOptions,
    charset: Option<CharacterSet>,
    custom: Option<String>,
    font: Option<&Path>,
    font_size: Option<f32>,
    output: &Path,
) -> Result<(), CliError> {
    let glyphs = match (custom, charset) {
        (Some(custom), _) => custom,
        (None, Some(key)) => CharsetKey::from(key).chars().to_string(),
        (None, None) => options.effective_charset().to_string(),
    };
    let font_size = font_size.unwrap_or(options.font_size);
    let (cell_width, cell_height) = GridLayout::new(GridDimensions::EMPTY, font_size).cell_pixels();

    let rasterizer = load_rasterizer(font)?;
    let atlas = build_atlas(
        &glyphs,
        cell_width,
        cell_height,
        DEFAULT_MAX_TEXTURE_SIZE,
        rasterizer.as_ref(),
    )?;

    let strip = image::RgbaImage::from_raw(atlas.width(), atlas.height(), atlas.pixels().to_vec())
        .ok_or_else(|| CliError::Output {
            path: output.to_path_buf(),
            message: "atlas buffer does not match its dimensions".to_string(),
        })?;
    strip.save(output).map_err(|e| CliError::Output {
        path: output.to_path_buf(),
        message: e.to_string(),
    })?;

    println!(
        "Wrote {} ({} glyphs, {}x{} px cells, {}x{} px)",
        output.display(),
        atlas.glyph_count(),
        cell_width,
        cell_height,
        atlas.width(),
        atlas.height()
    );
    Ok(())
}

/// List built-in character sets.
pub fn list_charsets() {
    println!("Built-in character sets (sparsest to densest):");
    for key in CharsetKey::ALL {
        println!(
            "  {:<10} {:>3} glyphs  \"{}\"",
            key.name(),
            key.chars().chars().count(),
            key.chars()
        );
    }
    println!();
    println!("Use --charset <name> or set render.custom_charset in the config.");
}

/// Print the media type detected for a source.
pub fn detect(src: &str) {
    let media_type = detect_media_type(src);
    println!("{}: {}", src, media_type);
    if is_gif(src) {
        println!("  (animated GIF: played as an image element, not a video)");
    }
}

/// Overrides from the `render` subcommand.
#[derive(Debug, Default)]
pub struct RenderArgs {
    pub frames: u32,
    pub columns: Option<u32>,
    pub charset: Option<CharacterSet>,
    pub dither: Option<Dither>,
    pub dialect: Option<Dialect>,
    pub font: Option<PathBuf>,
    pub mouse: bool,
    pub ripple: bool,
}

/// Drive an image through the headless pipeline and report what the GPU
/// would have received.
pub fn run_render(options: &AsciiOptions, image: &Path, args: RenderArgs) -> Result<(), CliError> {
    let mut options = options.clone();
    options.src = Some(image.display().to_string());
    options.media_type = Some(MediaType::Image);
    if args.columns.is_some() {
        options.num_columns = args.columns;
    }
    if let Some(charset) = args.charset {
        options.charset = charset.into();
        options.custom_charset = None;
    }
    if let Some(dither) = args.dither {
        options.dither = dither.into();
    }
    if let Some(dialect) = args.dialect {
        options.dialect = dialect.into();
    }
    options.enable_mouse |= args.mouse;
    options.enable_ripple |= args.ripple;
    options.is_playing = true;
    options.show_stats = true;

    let source = StillImage::open(image).map_err(|e| CliError::Image {
        path: image.to_path_buf(),
        source: e,
    })?;
    let rasterizer = load_rasterizer(args.font.as_deref())?;

    let backend = HeadlessBackend::new();
    let log = backend.log();
    let clock = Rc::new(ManualClock::new(0.0));
    let mut player = AsciiPlayer::new(
        backend,
        ManualScheduler::new(),
        Box::new(source),
        options,
        rasterizer,
        Rc::clone(&clock) as Rc<dyn Clock>,
    )?;

    for frame in 0..args.frames {
        let now = f64::from(frame) * FRAME_INTERVAL_MS;
        clock.set(now);

        let layout = player.core().layout();
        let (w, h) = (layout.canvas_width as f32, layout.canvas_height as f32);
        if args.mouse && w > 0.0 {
            let progress = (frame + 1) as f32 / args.frames as f32;
            player.handle_pointer(PointerEvent::move_at(w * progress, h * 0.5, w, h));
        }
        if args.ripple && frame == 1 {
            player.handle_pointer(PointerEvent::click_at(w * 0.5, h * 0.5, w, h));
        }

        if player.frame_loop().scheduler().pending().is_none() {
            break;
        }
        player.on_frame(now);
    }

    let grid = player.dimensions();
    let layout = player.core().layout();
    println!("Image:   {} ({})", image.display(), player.media_type());
    println!("Grid:    {} cols x {} rows", grid.cols, grid.rows);
    println!("Canvas:  {}x{} px", layout.canvas_width, layout.canvas_height);
    println!("Glyphs:  {}", player.core().atlas().glyph_count());
    println!("Draws:   {} of {} frames", log.draw_count(), args.frames);
    if args.mouse {
        println!("Trail:   {} points", player.mouse().trail().borrow().len());
    }
    if args.ripple {
        println!("Ripples: {} active", player.ripple().field().borrow().len());
    }
    if let Some(label) = player.stats_label() {
        println!("Stats:   {}", label);
    }
    Ok(())
}

fn load_rasterizer(font: Option<&Path>) -> Result<Box<dyn GlyphRasterizer>, CliError> {
    let rasterizer = match font {
        Some(path) => FontRasterizer::from_path(path)?,
        None => FontRasterizer::from_system()?,
    };
    Ok(Box::new(rasterizer))
}

/// Handle config subcommand actions.
pub fn handle_config_action(action: ConfigAction, path: Option<&Path>) -> Result<(), CliError> {
    let config_path = path.map(PathBuf::from).unwrap_or_else(default_path);
    match action {
        ConfigAction::Show => {
            let config = Config::load(Some(&config_path))?;
            let options = config.to_options();
            println!("Current configuration:");
            println!("  Source: {}", options.src.as_deref().unwrap_or("(none)"));
            match options.num_columns {
                Some(columns) => println!("  Columns: {}", columns),
                None => println!(
                    "  Columns: auto ({} at max width {})",
                    default_columns(options.max_width, options.font_size),
                    options.max_width
                ),
            }
            println!("  Font size: {}", options.font_size);
            match &options.custom_charset {
                Some(custom) => println!("  Charset: custom \"{}\"", custom),
                None => println!("  Charset: {}", options.charset.name()),
            }
            println!("  Dither: {:?}", options.dither);
            println!("  Colored: {}", if options.colored { "yes" } else { "no" });
            println!(
                "  Blend / highlight / brightness: {} / {} / {}",
                options.blend, options.highlight, options.brightness
            );
            println!("  Mouse trail: {}", on_off(options.enable_mouse));
            println!("  Ripples: {}", on_off(options.enable_ripple));
            println!("  Audio: {}", on_off(options.audio_effect > 0.0));
            println!("  Spacebar toggle: {}", on_off(options.enable_spacebar_toggle));
            println!();

            if config_path.exists() {
                println!("Config file: {} (exists)", config_path.display());
            } else {
                println!("Config file: {} (not found)", config_path.display());
            }
            Ok(())
        }
        ConfigAction::Init => {
            if config_path.exists() {
                return Err(CliError::ConfigExists(config_path));
            }

            if let Some(parent) = config_path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| CliError::ConfigWrite {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
            std::fs::write(&config_path, DEFAULT_CONFIG_TEMPLATE).map_err(|e| {
                CliError::ConfigWrite {
                    path: config_path.clone(),
                    source: e,
                }
            })?;

            println!("Created config file: {}", config_path.display());
            Ok(())
        }
    }
}

fn on_off(enabled: bool) -> &'static str {
    if enabled {
        "on"
    } else {
        "off"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_template_matches_defaults() {
        let parsed: Config = toml::from_str(DEFAULT_CONFIG_TEMPLATE).unwrap();
        assert_eq!(parsed, Config::default());
    }

    #[test]
    fn test_config_init_writes_template_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        handle_config_action(ConfigAction::Init, Some(&path)).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, DEFAULT_CONFIG_TEMPLATE);

        let again = handle_config_action(ConfigAction::Init, Some(&path));
        assert!(matches!(again, Err(CliError::ConfigExists(_))));
    }

    #[test]
    fn test_config_show_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[render\nfont_size = ").unwrap();

        let result = handle_config_action(ConfigAction::Show, Some(&path));
        assert!(matches!(
            result,
            Err(CliError::Config(ConfigError::ParseError { .. }))
        ));
    }

    #[test]
    fn test_grid_without_source_is_empty() {
        let options = AsciiOptions::default();
        assert!(run_grid(&options, Some((0, 0)), None, Some(10), None, None).is_ok());
    }
}
