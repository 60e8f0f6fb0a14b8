//! Media sources the renderer samples from.
//!
//! Decoding is not done here. A source is anything that can hand out its
//! currently presented frame as RGBA8 pixels: a video element, a decoded
//! animation, or a still image.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Kind of media behind a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    #[default]
    Video,
    Image,
}

impl MediaType {
    pub fn name(&self) -> &'static str {
        match self {
            MediaType::Video => "video",
            MediaType::Image => "image",
        }
    }

    /// Parse from a string (case-insensitive)
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "video" => Some(MediaType::Video),
            "image" => Some(MediaType::Image),
            _ => None,
        }
    }
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

const IMAGE_EXTENSIONS: &[&str] = &[
    "gif", "png", "jpg", "jpeg", "webp", "bmp", "svg", "avif", "ico", "apng",
];

/// Lowercased file extension of a path or URL, ignoring query and fragment.
fn extension(src: &str) -> Option<String> {
    let path = src.split(['?', '#']).next().unwrap_or(src);
    let name = path.rsplit('/').next().unwrap_or(path);
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty() && ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Guess the media type of `src` from its extension or data URI.
///
/// Animated GIFs count as images. Anything unrecognized is treated as
/// video.
pub fn detect_media_type(src: &str) -> MediaType {
    let src = src.trim();
    if let Some(rest) = src.strip_prefix("data:") {
        return if rest.to_ascii_lowercase().starts_with("image/") {
            MediaType::Image
        } else {
            MediaType::Video
        };
    }
    match extension(src) {
        Some(ext) if IMAGE_EXTENSIONS.contains(&ext.as_str()) => MediaType::Image,
        _ => MediaType::Video,
    }
}

/// True when `src` names a GIF.
pub fn is_gif(src: &str) -> bool {
    let src = src.trim();
    if let Some(rest) = src.strip_prefix("data:") {
        return rest.to_ascii_lowercase().starts_with("image/gif");
    }
    extension(src).is_some_and(|ext| ext == "gif")
}

/// Borrowed view of one RGBA8 frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameView<'a> {
    pub width: u32,
    pub height: u32,
    /// Row-major RGBA8, top row first
    pub pixels: &'a [u8],
}

/// A source the render core samples each tick.
pub trait Drawable {
    /// True when a frame with known, non-zero dimensions is available.
    fn has_frame(&self) -> bool;

    /// Intrinsic size in pixels; `(0, 0)` while unknown.
    fn size(&self) -> (u32, u32);

    /// The currently presented frame.
    fn frame(&self) -> Option<FrameView<'_>>;

    /// Start or stop the underlying media. Still images ignore this.
    fn set_playing(&mut self, _playing: bool) {}
}

/// An already-decoded RGBA8 still image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StillImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl StillImage {
    /// Wrap raw RGBA8 pixels. A buffer whose length does not match
    /// `width * height * 4` never reports a frame.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Decode an image file.
    pub fn open(path: &Path) -> image::ImageResult<Self> {
        Ok(image::open(path)?.to_rgba8().into())
    }

    /// Replace the pixels, e.g. with the next decoded animation frame.
    pub fn replace(&mut self, width: u32, height: u32, pixels: Vec<u8>) {
        self.width = width;
        self.height = height;
        self.pixels = pixels;
    }

    fn is_valid(&self) -> bool {
        self.width > 0
            && self.height > 0
            && self.pixels.len() == self.width as usize * self.height as usize * 4
    }
}

impl From<image::RgbaImage> for StillImage {
    fn from(image: image::RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self::new(width, height, image.into_raw())
    }
}

impl Drawable for StillImage {
    fn has_frame(&self) -> bool {
        self.is_valid()
    }

    fn size(&self) -> (u32, u32) {
        if self.is_valid() {
            (self.width, self.height)
        } else {
            (0, 0)
        }
    }

    fn frame(&self) -> Option<FrameView<'_>> {
        self.is_valid().then_some(FrameView {
            width: self.width,
            height: self.height,
            pixels: &self.pixels,
        })
    }
}
