//! Configuration file handling for video2ascii.
//!
//! Loads configuration from `~/.config/video2ascii/config.toml` or a custom
//! path, and flattens it into the [`AsciiOptions`] the player consumes.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::ascii::{CharsetKey, DitherMode, DEFAULT_FONT_SIZE, DEFAULT_MAX_WIDTH};
use crate::effects::{
    AudioTuning, RippleTuning, DEFAULT_AUDIO_RANGE, DEFAULT_MOUSE_RADIUS, DEFAULT_RIPPLE_SPEED,
    DEFAULT_TRAIL_LENGTH, MAX_TRAIL_LENGTH,
};
use crate::media::{detect_media_type, MediaType};
use crate::render::{RenderSettings, ShaderDialect, Tone};

/// Configuration file structure for video2ascii.
/// Loaded from ~/.config/video2ascii/config.toml (or custom path via --config).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub mouse: MouseConfig,
    #[serde(default)]
    pub ripple: RippleConfig,
    #[serde(default)]
    pub audio: AudioConfig,
    #[serde(default)]
    pub playback: PlaybackConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SourceConfig {
    #[serde(default)]
    pub src: Option<String>,
    /// Overrides detection from the source extension
    #[serde(default)]
    pub media_type: Option<MediaType>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub num_columns: Option<u32>,
    pub font_size: f32,
    pub max_width: f32,
    pub colored: bool,
    pub blend: f32,
    pub highlight: f32,
    pub brightness: f32,
    pub dither: DitherMode,
    pub charset: CharsetKey,
    pub custom_charset: Option<String>,
    pub dialect: ShaderDialect,
}

impl Default for RenderConfig {
    fn default() -> Self {
        let tone = Tone::default();
        Self {
            num_columns: None,
            font_size: DEFAULT_FONT_SIZE,
            max_width: DEFAULT_MAX_WIDTH,
            colored: tone.colored,
            blend: tone.blend,
            highlight: tone.highlight,
            brightness: tone.brightness,
            dither: DitherMode::default(),
            charset: CharsetKey::default(),
            custom_charset: None,
            dialect: ShaderDialect::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MouseConfig {
    pub enabled: bool,
    pub trail_length: u32,
    pub radius: f32,
}

impl Default for MouseConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            trail_length: DEFAULT_TRAIL_LENGTH,
            radius: DEFAULT_MOUSE_RADIUS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RippleConfig {
    pub enabled: bool,
    pub speed: f32,
    pub tuning: RippleTuning,
}

impl Default for RippleConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            speed: DEFAULT_RIPPLE_SPEED,
            tuning: RippleTuning::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Reactivity strength; 0 leaves the effect off
    pub effect: f32,
    /// Sensitivity to the level
    pub range: f32,
    pub tuning: AudioTuning,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            effect: 0.0,
            range: DEFAULT_AUDIO_RANGE,
            tuning: AudioTuning::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    pub is_playing: bool,
    pub auto_play: bool,
    pub enable_spacebar_toggle: bool,
    pub show_stats: bool,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            is_playing: true,
            auto_play: true,
            enable_spacebar_toggle: false,
            show_stats: false,
        }
    }
}

impl Config {
    /// Load configuration from a file path.
    /// Returns default config if the file doesn't exist.
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path.map(PathBuf::from).unwrap_or_else(default_path);

        if path.exists() {
            let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::IoError {
                path: path.clone(),
                source: e,
            })?;
            let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.clone(),
                source: e,
            })?;
            log::info!("Loaded config from {}", path.display());
            Ok(config)
        } else {
            log::debug!("No config at {}, using defaults", path.display());
            Ok(Config::default())
        }
    }

    /// Write this configuration as TOML, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self).map_err(ConfigError::SerializeError)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::IoError {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        std::fs::write(path, content).map_err(|e| ConfigError::IoError {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Flatten into player options.
    pub fn to_options(&self) -> AsciiOptions {
        AsciiOptions {
            src: self.source.src.clone(),
            media_type: self.source.media_type,
            num_columns: self.render.num_columns,
            font_size: self.render.font_size,
            max_width: self.render.max_width,
            colored: self.render.colored,
            blend: self.render.blend,
            highlight: self.render.highlight,
            brightness: self.render.brightness,
            dither: self.render.dither,
            charset: self.render.charset,
            custom_charset: self.render.custom_charset.clone(),
            dialect: self.render.dialect,
            enable_mouse: self.mouse.enabled,
            trail_length: self.mouse.trail_length,
            mouse_radius: self.mouse.radius,
            enable_ripple: self.ripple.enabled,
            ripple_speed: self.ripple.speed,
            ripple_tuning: self.ripple.tuning,
            audio_effect: self.audio.effect,
            audio_range: self.audio.range,
            audio_tuning: self.audio.tuning,
            is_playing: self.playback.is_playing,
            auto_play: self.playback.auto_play,
            enable_spacebar_toggle: self.playback.enable_spacebar_toggle,
            show_stats: self.playback.show_stats,
        }
    }
}

/// Every option the player recognizes, in one flat struct.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AsciiOptions {
    pub src: Option<String>,
    pub media_type: Option<MediaType>,
    pub num_columns: Option<u32>,
    pub font_size: f32,
    pub max_width: f32,
    pub colored: bool,
    pub blend: f32,
    pub highlight: f32,
    pub brightness: f32,
    pub dither: DitherMode,
    pub charset: CharsetKey,
    pub custom_charset: Option<String>,
    pub dialect: ShaderDialect,
    pub enable_mouse: bool,
    pub trail_length: u32,
    pub mouse_radius: f32,
    pub enable_ripple: bool,
    pub ripple_speed: f32,
    pub ripple_tuning: RippleTuning,
    pub audio_effect: f32,
    pub audio_range: f32,
    pub audio_tuning: AudioTuning,
    pub is_playing: bool,
    pub auto_play: bool,
    pub enable_spacebar_toggle: bool,
    pub show_stats: bool,
}

impl Default for AsciiOptions {
    fn default() -> Self {
        Config::default().to_options()
    }
}

impl AsciiOptions {
    /// Glyphs to rasterize: the custom charset when set, else the built-in
    /// one.
    pub fn effective_charset(&self) -> &str {
        match &self.custom_charset {
            Some(custom) => custom,
            None => self.charset.chars(),
        }
    }

    pub fn tone(&self) -> Tone {
        Tone {
            colored: self.colored,
            blend: self.blend,
            highlight: self.highlight,
            brightness: self.brightness,
        }
    }

    /// Settings for the render core.
    pub fn render_settings(&self) -> RenderSettings {
        RenderSettings {
            charset: self.effective_charset().to_string(),
            num_columns: self.num_columns,
            font_size: self.font_size,
            max_width: self.max_width,
            tone: self.tone(),
            dither: self.dither,
            dialect: self.dialect,
        }
    }

    /// Explicit media type, or the one detected from `src`.
    pub fn resolved_media_type(&self) -> Result<MediaType, ConfigError> {
        if let Some(media_type) = self.media_type {
            return Ok(media_type);
        }
        match &self.src {
            Some(src) => Ok(detect_media_type(src)),
            None => Err(ConfigError::MissingSource),
        }
    }

    /// Check every option. Options that are clamped at use (trail length,
    /// ripple speed) only log a warning.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.render_settings().validate()?;

        if self.trail_length as usize > MAX_TRAIL_LENGTH {
            log::warn!(
                "trail_length {} will be clamped to {}",
                self.trail_length,
                MAX_TRAIL_LENGTH
            );
        }
        if !(self.ripple_speed.is_finite() && self.ripple_speed > 0.0) {
            log::warn!(
                "ripple_speed {} is not positive, using {}",
                self.ripple_speed,
                DEFAULT_RIPPLE_SPEED
            );
        }
        for (name, value) in [
            ("audio_effect", self.audio_effect),
            ("audio_range", self.audio_range),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::OutOfRange {
                    name,
                    value: f64::from(value),
                    min: 0.0,
                    max: f64::from(f32::MAX),
                });
            }
        }
        Ok(())
    }
}

/// Errors that can occur when loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("charset must contain at least one glyph")]
    EmptyCharset,

    #[error("num_columns must be at least 1")]
    ZeroColumns,

    #[error("invalid glyph cell size {width}x{height}")]
    InvalidCellSize { width: u32, height: u32 },

    #[error("{name} = {value} is outside [{min}, {max}]")]
    OutOfRange {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("{glyphs} glyphs at {cell_width} px exceed the {max_width} px texture limit")]
    AtlasTooLarge {
        glyphs: usize,
        cell_width: u32,
        max_width: u32,
    },

    #[error("no source given and no media type set")]
    MissingSource,

    #[error("Failed to read config file '{}': {source}", .path.display())]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{}': {source}", .path.display())]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Failed to serialize config: {0}")]
    SerializeError(#[source] toml::ser::Error),
}

/// Get the default config file path.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("video2ascii").join("config.toml"))
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config/video2ascii/config.toml")
        })
}
