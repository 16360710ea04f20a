//! Color representation used by palettes and rendered bitmaps.

use serde::{Deserialize, Serialize};

/// An 8-bit RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Fully opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn transparent() -> Self {
        Self {
            r: 0,
            g: 0,
            b: 0,
            a: 0,
        }
    }

    /// Parse `"RRGGBB"` or `"RRGGBBAA"`, with or without a leading `#`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        if !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        match hex.len() {
            6 => Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?)),
            8 => Some(Self::new(channel(0)?, channel(2)?, channel(4)?, channel(6)?)),
            _ => None,
        }
    }

    /// Lowercase `"rrggbb"` (alpha is dropped).
    pub fn to_hex(&self) -> String {
        format!("{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Channel-wise linear interpolation, rounded to the nearest integer.
    pub fn lerp(&self, other: &Color, t: f64) -> Color {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| -> u8 { (a as f64 + (b as f64 - a as f64) * t).round() as u8 };
        Color {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
            a: mix(self.a, other.a),
        }
    }

    pub fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_hex() {
        assert_eq!(Color::from_hex("B3E5FC"), Some(Color::rgb(0xb3, 0xe5, 0xfc)));
        assert_eq!(Color::from_hex("#00000a"), Some(Color::rgb(0, 0, 10)));
        assert_eq!(Color::from_hex("ff000080"), Some(Color::new(255, 0, 0, 128)));
        assert_eq!(Color::from_hex("fff"), None);
        assert_eq!(Color::from_hex("zz0000"), None);
    }

    #[test]
    fn test_hex_roundtrip() {
        assert_eq!(Color::rgb(0x39, 0x49, 0xab).to_hex(), "3949ab");
    }

    #[test]
    fn test_lerp_rounds() {
        let black = Color::rgb(0, 0, 0);
        let white = Color::rgb(255, 255, 255);
        assert_eq!(black.lerp(&white, 1.0 / 3.0).r, 85);
        assert_eq!(black.lerp(&white, 2.0 / 3.0).r, 170);
        assert_eq!(black.lerp(&white, 2.0), white);
    }
}
