//! Value-to-color palettes.
//!
//! Stops are evenly spaced over the normalized domain `[0, 1]`. A raw
//! value is normalized against `[domain_min, domain_max]` and clamped
//! before the two bracketing stops are interpolated.

use serde::{Deserialize, Serialize};
use solar_common::Color;

use crate::error::{RenderError, RenderResult};

/// How a palette turns raster values into pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PaletteKind {
    /// Interpolated gradient over the domain
    Continuous,
    /// Exactly two colors, picked by a threshold
    Binary,
    /// The first three bands are used as R, G, B directly
    RgbPassthrough,
}

/// Dark gray to light blue, roof mask.
pub const BINARY: [Color; 2] = [Color::rgb(0x21, 0x21, 0x21), Color::rgb(0xB3, 0xE5, 0xFC)];

/// Blue through green to red, elevation.
pub const RAINBOW: [Color; 5] = [
    Color::rgb(0x39, 0x49, 0xAB),
    Color::rgb(0x81, 0xD4, 0xFA),
    Color::rgb(0x66, 0xBB, 0x6A),
    Color::rgb(0xFF, 0xE0, 0x82),
    Color::rgb(0xE5, 0x39, 0x35),
];

/// Black through purple and orange to white, solar flux.
pub const IRON: [Color; 5] = [
    Color::rgb(0x00, 0x00, 0x0A),
    Color::rgb(0x91, 0x00, 0x9C),
    Color::rgb(0xE6, 0x46, 0x16),
    Color::rgb(0xFE, 0xB4, 0x00),
    Color::rgb(0xFF, 0xFF, 0xF6),
];

/// Dark gray to amber, hourly shade.
pub const SUNLIGHT: [Color; 2] = [Color::rgb(0x21, 0x21, 0x21), Color::rgb(0xFF, 0xCA, 0x28)];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Palette {
    kind: PaletteKind,
    colors: Vec<Color>,
    domain_min: f32,
    domain_max: f32,
}

impl Palette {
    pub fn new(
        kind: PaletteKind,
        colors: Vec<Color>,
        domain_min: f32,
        domain_max: f32,
    ) -> RenderResult<Self> {
        match kind {
            PaletteKind::Binary if colors.len() != 2 => {
                return Err(RenderError::InvalidPalette(format!(
                    "binary palette needs exactly 2 colors, got {}",
                    colors.len()
                )))
            }
            PaletteKind::Continuous if colors.len() < 2 => {
                return Err(RenderError::InvalidPalette(format!(
                    "continuous palette needs at least 2 colors, got {}",
                    colors.len()
                )))
            }
            _ => {}
        }
        if !domain_min.is_finite() || !domain_max.is_finite() {
            return Err(RenderError::InvalidPalette(format!(
                "domain [{}, {}] is not finite",
                domain_min, domain_max
            )));
        }
        if domain_min > domain_max {
            return Err(RenderError::InvalidPalette(format!(
                "domain min {} exceeds max {}",
                domain_min, domain_max
            )));
        }
        Ok(Self {
            kind,
            colors,
            domain_min,
            domain_max,
        })
    }

    pub fn continuous(colors: &[Color], domain_min: f32, domain_max: f32) -> RenderResult<Self> {
        Self::new(PaletteKind::Continuous, colors.to_vec(), domain_min, domain_max)
    }

    /// Two-color palette; values above the threshold take `on`.
    pub fn binary(off: Color, on: Color) -> Self {
        Self {
            kind: PaletteKind::Binary,
            colors: vec![off, on],
            domain_min: 0.0,
            domain_max: 1.0,
        }
    }

    pub fn rgb_passthrough() -> Self {
        Self {
            kind: PaletteKind::RgbPassthrough,
            colors: Vec::new(),
            domain_min: 0.0,
            domain_max: 255.0,
        }
    }

    /// Build from hex stops such as `"#3949AB"`.
    pub fn from_hex(
        kind: PaletteKind,
        stops: &[&str],
        domain_min: f32,
        domain_max: f32,
    ) -> RenderResult<Self> {
        let colors = stops
            .iter()
            .map(|s| {
                Color::from_hex(s)
                    .ok_or_else(|| RenderError::InvalidPalette(format!("bad color stop '{}'", s)))
            })
            .collect::<RenderResult<Vec<_>>>()?;
        Self::new(kind, colors, domain_min, domain_max)
    }

    /// Same stops over a different domain.
    pub fn with_domain(self, domain_min: f32, domain_max: f32) -> RenderResult<Self> {
        Self::new(self.kind, self.colors, domain_min, domain_max)
    }

    pub fn kind(&self) -> PaletteKind {
        self.kind
    }

    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    pub fn domain_min(&self) -> f32 {
        self.domain_min
    }

    pub fn domain_max(&self) -> f32 {
        self.domain_max
    }

    /// Normalized position of `value` in `[0, 1]`.
    ///
    /// A degenerate domain maps everything to 0.
    pub fn position(&self, value: f32) -> f64 {
        let range = self.domain_max as f64 - self.domain_min as f64;
        if range <= 0.0 {
            return 0.0;
        }
        ((value as f64 - self.domain_min as f64) / range).clamp(0.0, 1.0)
    }

    /// Interpolated color for a raw value.
    pub fn color_at(&self, value: f32) -> Color {
        let t = self.position(value);
        let last = self.colors.len().saturating_sub(1);
        if last == 0 {
            return self.colors.first().copied().unwrap_or(Color::transparent());
        }
        let scaled = t * last as f64;
        let lower = (scaled.floor() as usize).min(last - 1);
        self.colors[lower].lerp(&self.colors[lower + 1], scaled - lower as f64)
    }

    /// Binary classification: `colors[1]` above the threshold, else `colors[0]`.
    pub fn classify(&self, value: f32, threshold: f32) -> Color {
        let index = usize::from(value > threshold).min(self.colors.len().saturating_sub(1));
        self.colors.get(index).copied().unwrap_or(Color::transparent())
    }
}

/// Roof mask palette.
pub fn binary() -> Palette {
    Palette::binary(BINARY[0], BINARY[1])
}

/// Hourly shade palette.
pub fn sunlight() -> Palette {
    Palette::binary(SUNLIGHT[0], SUNLIGHT[1])
}

/// Elevation palette over `[min, max]`.
pub fn rainbow(domain_min: f32, domain_max: f32) -> RenderResult<Palette> {
    Palette::continuous(&RAINBOW, domain_min, domain_max)
}

/// Solar flux palette over `[min, max]`.
pub fn iron(domain_min: f32, domain_max: f32) -> RenderResult<Palette> {
    Palette::continuous(&IRON, domain_min, domain_max)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gray() -> Palette {
        Palette::continuous(&[Color::rgb(0, 0, 0), Color::rgb(255, 255, 255)], 0.0, 30.0).unwrap()
    }

    #[test]
    fn test_two_stop_interpolation() {
        let p = gray();
        let channels: Vec<u8> = [0.0, 10.0, 20.0, 30.0]
            .iter()
            .map(|&v| p.color_at(v).r)
            .collect();
        assert_eq!(channels, vec![0, 85, 170, 255]);
    }

    #[test]
    fn test_values_outside_domain_clamp() {
        let p = gray();
        assert_eq!(p.color_at(-100.0), Color::rgb(0, 0, 0));
        assert_eq!(p.color_at(1e9), Color::rgb(255, 255, 255));
    }

    #[test]
    fn test_multi_stop_hits_each_stop() {
        let p = iron(0.0, 4.0).unwrap();
        for (i, stop) in IRON.iter().enumerate() {
            assert_eq!(p.color_at(i as f32), *stop);
        }
    }

    #[test]
    fn test_degenerate_domain_uses_first_stop() {
        let p = rainbow(7.0, 7.0).unwrap();
        assert_eq!(p.color_at(7.0), RAINBOW[0]);
        assert_eq!(p.color_at(100.0), RAINBOW[0]);
    }

    #[test]
    fn test_classify() {
        let p = binary();
        assert_eq!(p.classify(0.0, 0.0), BINARY[0]);
        assert_eq!(p.classify(1.0, 0.0), BINARY[1]);
        assert_eq!(p.classify(f32::NAN, 0.0), BINARY[0]);
    }

    #[test]
    fn test_from_hex() {
        let p = Palette::from_hex(
            PaletteKind::Continuous,
            &["3949AB", "#81D4FA", "66BB6A", "FFE082", "E53935"],
            0.0,
            1.0,
        )
        .unwrap();
        assert_eq!(p.colors(), &RAINBOW);
        assert!(Palette::from_hex(PaletteKind::Continuous, &["nope", "000000"], 0.0, 1.0).is_err());
    }

    #[test]
    fn test_invalid_palettes() {
        assert!(Palette::continuous(&[Color::rgb(0, 0, 0)], 0.0, 1.0).is_err());
        assert!(Palette::continuous(&IRON, 2.0, 1.0).is_err());
        assert!(Palette::continuous(&IRON, f32::NAN, 1.0).is_err());
        assert!(Palette::new(PaletteKind::Binary, IRON.to_vec(), 0.0, 1.0).is_err());
    }

    #[test]
    fn test_position_is_monotonic() {
        let p = iron(0.0, 1000.0).unwrap();
        let mut last = -1.0;
        for v in (0..=1000).step_by(7) {
            let t = p.position(v as f32);
            assert!(t >= last);
            last = t;
        }
    }
}
