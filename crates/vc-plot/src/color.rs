//! Named RGB colours.

use plotters::style::RGBColor;
use serde::{Deserialize, Serialize};
use vc_types::{validation_error, VcError, VcResult};

/// An opaque sRGB colour. Serialized as `#rrggbb`; deserialized from a
/// colour name or hex literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const DARK_ORANGE: Rgb = Rgb::new(255, 140, 0);
    pub const NAVY: Rgb = Rgb::new(0, 0, 128);
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Resolve a CSS colour name or a `#rrggbb` literal.
    pub fn from_name(name: &str) -> VcResult<Self> {
        let lowered = name.trim().to_ascii_lowercase();
        if let Some(hex) = lowered.strip_prefix('#') {
            return Self::from_hex(hex).ok_or_else(|| validation_error!("invalid hex colour '{}'", name));
        }
        let rgb = match lowered.as_str() {
            "darkorange" => Self::DARK_ORANGE,
            "navy" => Self::NAVY,
            "black" => Self::BLACK,
            "white" => Self::WHITE,
            "red" => Self::new(255, 0, 0),
            "green" => Self::new(0, 128, 0),
            "blue" => Self::new(0, 0, 255),
            "orange" => Self::new(255, 165, 0),
            "purple" => Self::new(128, 0, 128),
            "gray" | "grey" => Self::new(128, 128, 128),
            "crimson" => Self::new(220, 20, 60),
            "teal" => Self::new(0, 128, 128),
            "darkgreen" => Self::new(0, 100, 0),
            "steelblue" => Self::new(70, 130, 180),
            _ => return Err(validation_error!("unknown colour name '{}'", name)),
        };
        Ok(rgb)
    }

    fn from_hex(hex: &str) -> Option<Self> {
        if hex.len() != 6 {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
        Some(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }

    pub fn to_plotters(self) -> RGBColor {
        RGBColor(self.r, self.g, self.b)
    }
}

impl TryFrom<String> for Rgb {
    type Error = VcError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_name(&value)
    }
}

impl From<Rgb> for String {
    fn from(rgb: Rgb) -> Self {
        rgb.to_string()
    }
}

impl std::fmt::Display for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}
