//! Color values for layer painting.
//!
//! Colors travel as `#rrggbb` hex strings at every external boundary
//! (catalogs, saved states, serialized layer markup) and as a compact RGB
//! value inside the engine. The `darker`/`lighter` helpers implement the
//! fixed-magnitude luminance shift used by derived color rules.

use palette::Srgb;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Magnitude of the `darker`/`lighter` luminance shift (30%).
const MODIFIER_SHIFT: f32 = 0.3;

/// An opaque RGB color.
///
/// Parses from hex strings (`#rrggbb`, `#rgb`, with or without the leading
/// `#`) and serializes back to the six-digit lowercase form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    /// The default layer color.
    pub const WHITE: Color = Color {
        r: 255,
        g: 255,
        b: 255,
    };

    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses a hex color string.
    pub fn from_hex(value: &str) -> Result<Self> {
        let rgb: Srgb<u8> = value
            .trim()
            .parse()
            .map_err(|e| Error::invalid_color(value, format!("{e:?}")))?;
        Ok(Self {
            r: rgb.red,
            g: rgb.green,
            b: rgb.blue,
        })
    }

    /// Formats as a lowercase `#rrggbb` string.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Shifts each channel by `amount` of its own value, clamped to the
    /// displayable range. `amount` is a fraction: `-0.3` darkens by 30%,
    /// `0.3` lightens by 30%.
    ///
    /// Pure black is a fixed point of the shift in both directions.
    pub fn shift_luminance(self, amount: f32) -> Self {
        let shift = |c: u8| {
            let c = c as f32;
            (c + c * amount).clamp(0.0, 255.0).round() as u8
        };
        Self {
            r: shift(self.r),
            g: shift(self.g),
            b: shift(self.b),
        }
    }

    /// The color shifted 30% darker.
    pub fn darker(self) -> Self {
        self.shift_luminance(-MODIFIER_SHIFT)
    }

    /// The color shifted 30% lighter.
    pub fn lighter(self) -> Self {
        self.shift_luminance(MODIFIER_SHIFT)
    }

    /// A uniformly random color.
    pub fn random(rng: &mut dyn rand::RngCore) -> Self {
        let bits = rng.next_u32();
        Self {
            r: (bits >> 16) as u8,
            g: (bits >> 8) as u8,
            b: bits as u8,
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl TryFrom<String> for Color {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::from_hex(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

// ============================================================================
// Tests
// ============================================================================
