//! Dither modes for luminance-to-glyph quantization.
//!
//! The thresholding itself happens in the fragment shader; the host only
//! selects the mode and forwards it as `u_ditherMode`.

use serde::{Deserialize, Serialize};

/// How per-cell luminance is quantized into a glyph index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DitherMode {
    /// Direct linear mapping (bands at low column counts)
    #[default]
    None,
    /// 4x4 ordered Bayer pattern keyed by cell coordinate
    Bayer,
    /// Per-cell pseudo-random offset seeded by cell coordinate and time
    Random,
}

impl DitherMode {
    /// Integer value written to the `u_ditherMode` uniform.
    pub fn shader_value(self) -> i32 {
        match self {
            DitherMode::None => 0,
            DitherMode::Bayer => 1,
            DitherMode::Random => 2,
        }
    }

    /// Parse a dither mode name.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "none" => Some(Self::None),
            "bayer" => Some(Self::Bayer),
            "random" => Some(Self::Random),
            _ => None,
        }
    }
}

impl std::fmt::Display for DitherMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Bayer => write!(f, "bayer"),
            Self::Random => write!(f, "random"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shader_values_are_distinct() {
        assert_eq!(DitherMode::None.shader_value(), 0);
        assert_eq!(DitherMode::Bayer.shader_value(), 1);
        assert_eq!(DitherMode::Random.shader_value(), 2);
    }

    #[test]
    fn test_from_str_roundtrips_display() {
        for mode in [DitherMode::None, DitherMode::Bayer, DitherMode::Random] {
            assert_eq!(DitherMode::from_str(&mode.to_string()), Some(mode));
        }
        assert_eq!(DitherMode::from_str("floyd"), None);
    }
}
