//! CLI enum types for charset, dither and shader dialect options.

use clap::ValueEnum;

use video2ascii::ascii::{CharsetKey, DitherMode};
use video2ascii::render::ShaderDialect;

/// ASCII character set for rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum CharacterSet {
    #[default]
    Standard,
    Detailed,
    Blocks,
    Minimal,
    Binary,
    Dots,
}

impl From<CharacterSet> for CharsetKey {
    fn from(c: CharacterSet) -> Self {
        match c {
            CharacterSet::Standard => CharsetKey::Standard,
            CharacterSet::Detailed => CharsetKey::Detailed,
            CharacterSet::Blocks => CharsetKey::Blocks,
            CharacterSet::Minimal => CharsetKey::Minimal,
            CharacterSet::Binary => CharsetKey::Binary,
            CharacterSet::Dots => CharsetKey::Dots,
        }
    }
}

/// Luminance dithering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Dither {
    #[default]
    None,
    Bayer,
    Random,
}

impl From<Dither> for DitherMode {
    fn from(d: Dither) -> Self {
        match d {
            Dither::None => DitherMode::None,
            Dither::Bayer => DitherMode::Bayer,
            Dither::Random => DitherMode::Random,
        }
    }
}

/// GLSL dialect for the shader sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Dialect {
    /// GLSL ES 3.00 (WebGL2, GLES)
    #[default]
    Gles300,
    /// GLSL 3.30 core (desktop GL)
    Glsl330,
}

impl From<Dialect> for ShaderDialect {
    fn from(d: Dialect) -> Self {
        match d {
            Dialect::Gles300 => ShaderDialect::Gles300,
            Dialect::Glsl330 => ShaderDialect::Glsl330,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_charset_to_charset_key() {
        assert_eq!(CharsetKey::from(CharacterSet::Standard), CharsetKey::Standard);
        assert_eq!(CharsetKey::from(CharacterSet::Detailed), CharsetKey::Detailed);
        assert_eq!(CharsetKey::from(CharacterSet::Blocks), CharsetKey::Blocks);
        assert_eq!(CharsetKey::from(CharacterSet::Minimal), CharsetKey::Minimal);
        assert_eq!(CharsetKey::from(CharacterSet::Binary), CharsetKey::Binary);
        assert_eq!(CharsetKey::from(CharacterSet::Dots), CharsetKey::Dots);
    }

    #[test]
    fn test_dither_to_dither_mode() {
        assert_eq!(DitherMode::from(Dither::None), DitherMode::None);
        assert_eq!(DitherMode::from(Dither::Bayer), DitherMode::Bayer);
        assert_eq!(DitherMode::from(Dither::Random), DitherMode::Random);
    }

    #[test]
    fn test_dialect_to_shader_dialect() {
        assert_eq!(ShaderDialect::from(Dialect::Gles300), ShaderDialect::Gles300);
        assert_eq!(ShaderDialect::from(Dialect::Glsl330), ShaderDialect::Glsl330);
    }
}
