//! CLI argument parsing with clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::enums::{CharacterSet, Dialect, Dither};

/// Real-time ASCII art renderer for video and images
#[derive(Parser, Debug)]
#[command(name = "video2ascii")]
#[command(version, about = "Render video and images as colored ASCII art", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Config file path
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose logging (-v for debug, -vv for trace)
    #[arg(long, short, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the character grid for a source size or image file
    Grid {
        /// Source size as WIDTHxHEIGHT
        #[arg(long, short, value_parser = parse_resolution, required_unless_present = "image")]
        size: Option<(u32, u32)>,

        /// Read the source size from an image file
        #[arg(long, short, conflicts_with = "size")]
        image: Option<PathBuf>,

        /// Number of columns (default: derived from --max-width)
        #[arg(long, short = 'n', value_parser = parse_columns)]
        columns: Option<u32>,

        /// Cell height in pixels
        #[arg(long, value_parser = parse_font_size)]
        font_size: Option<f32>,

        /// Canvas width budget in pixels when no column count is given
        #[arg(long, value_parser = parse_max_width)]
        max_width: Option<f32>,
    },

    /// Rasterize a charset into a glyph atlas PNG
    Atlas {
        /// Built-in character set
        #[arg(long)]
        charset: Option<CharacterSet>,

        /// Custom glyphs, sparsest first (overrides --charset)
        #[arg(long)]
        custom: Option<String>,

        /// Font file (default: first monospace system font found)
        #[arg(long)]
        font: Option<PathBuf>,

        /// Cell height in pixels
        #[arg(long, value_parser = parse_font_size)]
        font_size: Option<f32>,

        /// Output PNG path
        #[arg(long, short, default_value = "atlas.png")]
        output: PathBuf,
    },

    /// List built-in character sets
    Charsets,

    /// Detect the media type of a path or URL
    Detect {
        /// Path, URL or data URI
        src: String,
    },

    /// Run an image through the headless pipeline and report the frames
    Render {
        /// Image file to render
        image: PathBuf,

        /// Number of frame callbacks to drive
        #[arg(long, default_value = "3", value_parser = clap::value_parser!(u32).range(1..=10_000))]
        frames: u32,

        /// Number of columns
        #[arg(long, short = 'n', value_parser = parse_columns)]
        columns: Option<u32>,

        /// Built-in character set
        #[arg(long)]
        charset: Option<CharacterSet>,

        /// Luminance dithering
        #[arg(long)]
        dither: Option<Dither>,

        /// GLSL dialect
        #[arg(long)]
        dialect: Option<Dialect>,

        /// Font file (default: first monospace system font found)
        #[arg(long)]
        font: Option<PathBuf>,

        /// Enable the mouse trail and sweep the pointer across the canvas
        #[arg(long)]
        mouse: bool,

        /// Enable ripples and click the canvas center
        #[arg(long)]
        ripple: bool,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Show current configuration
    Show,
    /// Create default config file
    Init,
}

/// Parse and validate resolution (WIDTHxHEIGHT format)
fn parse_resolution(s: &str) -> Result<(u32, u32), String> {
    let parts: Vec<&str> = s.split('x').collect();
    if parts.len() != 2 {
        return Err(format!(
            "Invalid size format '{}'. Use WIDTHxHEIGHT (e.g., 1920x1080)",
            s
        ));
    }
    let width: u32 = parts[0]
        .parse()
        .map_err(|_| format!("Invalid width '{}' in size", parts[0]))?;
    let height: u32 = parts[1]
        .parse()
        .map_err(|_| format!("Invalid height '{}' in size", parts[1]))?;
    Ok((width, height))
}

/// Parse and validate a column count (at least 1)
fn parse_columns(s: &str) -> Result<u32, String> {
    let columns: u32 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid column count", s))?;
    if columns == 0 {
        return Err("Column count must be at least 1".to_string());
    }
    Ok(columns)
}

/// Parse and validate font size (1-512 px)
fn parse_font_size(s: &str) -> Result<f32, String> {
    let size: f32 = s.parse().map_err(|_| format!("'{}' is not a valid number", s))?;
    if !(1.0..=512.0).contains(&size) {
        return Err(format!("Font size must be between 1 and 512, got {}", size));
    }
    Ok(size)
}

/// Parse and validate max width (1-65536 px)
fn parse_max_width(s: &str) -> Result<f32, String> {
    let width: f32 = s.parse().map_err(|_| format!("'{}' is not a valid number", s))?;
    if !(1.0..=65_536.0).contains(&width) {
        return Err(format!("Max width must be between 1 and 65536, got {}", width));
    }
    Ok(width)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_with_size() {
        let args = Args::parse_from(["video2ascii", "grid", "--size", "1920x1080", "-n", "100"]);
        match args.command {
            Command::Grid { size, columns, .. } => {
                assert_eq!(size, Some((1920, 1080)));
                assert_eq!(columns, Some(100));
            }
            _ => panic!("Expected Grid subcommand"),
        }
    }

    #[test]
    fn test_grid_requires_size_or_image() {
        assert!(Args::try_parse_from(["video2ascii", "grid"]).is_err());
        assert!(Args::try_parse_from(["video2ascii", "grid", "--image", "a.png"]).is_ok());
    }

    #[test]
    fn test_zero_columns_rejected() {
        assert!(Args::try_parse_from(["video2ascii", "grid", "-s", "10x10", "-n", "0"]).is_err());
    }

    #[test]
    fn test_atlas_defaults() {
        let args = Args::parse_from(["video2ascii", "atlas"]);
        match args.command {
            Command::Atlas {
                charset,
                custom,
                output,
                ..
            } => {
                assert!(charset.is_none());
                assert!(custom.is_none());
                assert_eq!(output, PathBuf::from("atlas.png"));
            }
            _ => panic!("Expected Atlas subcommand"),
        }
    }

    #[test]
    fn test_render_options() {
        let args = Args::parse_from([
            "video2ascii",
            "render",
            "cat.png",
            "--frames",
            "5",
            "--charset",
            "blocks",
            "--dither",
            "bayer",
            "--mouse",
        ]);
        match args.command {
            Command::Render {
                image,
                frames,
                charset,
                dither,
                mouse,
                ripple,
                ..
            } => {
                assert_eq!(image, PathBuf::from("cat.png"));
                assert_eq!(frames, 5);
                assert_eq!(charset, Some(CharacterSet::Blocks));
                assert_eq!(dither, Some(Dither::Bayer));
                assert!(mouse);
                assert!(!ripple);
            }
            _ => panic!("Expected Render subcommand"),
        }
    }

    #[test]
    fn test_global_flags() {
        let args = Args::parse_from(["video2ascii", "charsets", "-vv", "--config", "/tmp/c.toml"]);
        assert_eq!(args.verbose, 2);
        assert_eq!(args.config, Some(PathBuf::from("/tmp/c.toml")));
    }

    #[test]
    fn test_config_subcommands() {
        let args = Args::parse_from(["video2ascii", "config", "show"]);
        assert!(matches!(
            args.command,
            Command::Config {
                action: ConfigAction::Show
            }
        ));
        let args = Args::parse_from(["video2ascii", "config", "init"]);
        assert!(matches!(
            args.command,
            Command::Config {
                action: ConfigAction::Init
            }
        ));
    }

    #[test]
    fn test_parse_resolution() {
        assert_eq!(parse_resolution("640x480"), Ok((640, 480)));
        assert!(parse_resolution("640").is_err());
        assert!(parse_resolution("ax480").is_err());
    }
}
