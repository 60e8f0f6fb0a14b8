//! Character set definitions for the glyph atlas.
//!
//! Every charset is ordered from sparsest to densest visual weight, so the
//! glyph index chosen by the shader grows with cell luminance.

use serde::{Deserialize, Serialize};

/// Standard ASCII density ramp (10 levels).
pub const STANDARD_CHARSET: &str = " .:-=+*#%@";

/// Long ramp with 70 levels for smooth gradients at high column counts.
pub const DETAILED_CHARSET: &str =
    " .'`^\",:;Il!i><~+_-?][}{1)(|\\/tfjrxnuvczXYUJCLQ0OZmwqpdbkhao*#MW&8%B@$";

/// Block character set (5 levels).
/// Uses Unicode block characters for higher perceived resolution.
pub const BLOCKS_CHARSET: &str = " ░▒▓█";

/// Minimal character set (4 levels).
/// Clean, less noisy look.
pub const MINIMAL_CHARSET: &str = " .:#";

/// Two-glyph "matrix" look.
pub const BINARY_CHARSET: &str = " 01";

/// Dot ramp for a halftone look.
pub const DOTS_CHARSET: &str = " ·•●";

/// Built-in charset key selecting the glyph set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CharsetKey {
    /// Standard ASCII density ramp (10 levels)
    #[default]
    Standard,
    /// 70-level ASCII ramp
    Detailed,
    /// Unicode blocks (5 levels)
    Blocks,
    /// Minimal ramp (4 levels)
    Minimal,
    /// Space, zero, one
    Binary,
    /// Halftone dots
    Dots,
}

impl CharsetKey {
    /// All built-in keys in display order.
    pub const ALL: [CharsetKey; 6] = [
        CharsetKey::Standard,
        CharsetKey::Detailed,
        CharsetKey::Blocks,
        CharsetKey::Minimal,
        CharsetKey::Binary,
        CharsetKey::Dots,
    ];

    /// Get the ordered glyph string for this charset.
    pub fn chars(&self) -> &'static str {
        match self {
            CharsetKey::Standard => STANDARD_CHARSET,
            CharsetKey::Detailed => DETAILED_CHARSET,
            CharsetKey::Blocks => BLOCKS_CHARSET,
            CharsetKey::Minimal => MINIMAL_CHARSET,
            CharsetKey::Binary => BINARY_CHARSET,
            CharsetKey::Dots => DOTS_CHARSET,
        }
    }

    /// Cycle to the next character set.
    ///
    /// Order: Standard -> Detailed -> Blocks -> Minimal -> Binary -> Dots -> Standard
    pub fn next(&self) -> Self {
        match self {
            CharsetKey::Standard => CharsetKey::Detailed,
            CharsetKey::Detailed => CharsetKey::Blocks,
            CharsetKey::Blocks => CharsetKey::Minimal,
            CharsetKey::Minimal => CharsetKey::Binary,
            CharsetKey::Binary => CharsetKey::Dots,
            CharsetKey::Dots => CharsetKey::Standard,
        }
    }

    /// Get a human-readable name for the charset.
    pub fn name(&self) -> &'static str {
        match self {
            CharsetKey::Standard => "standard",
            CharsetKey::Detailed => "detailed",
            CharsetKey::Blocks => "blocks",
            CharsetKey::Minimal => "minimal",
            CharsetKey::Binary => "binary",
            CharsetKey::Dots => "dots",
        }
    }

    /// Parse a charset key by name (case-insensitive).
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        let lower = s.to_lowercase();
        Self::ALL.into_iter().find(|key| key.name() == lower)
    }
}

impl std::fmt::Display for CharsetKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
