//! RGBA bitmap surface.

use solar_common::Color;

use crate::error::{RenderError, RenderResult};
use crate::png;

/// Row-major RGBA8 pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

impl Bitmap {
    /// Fully transparent bitmap.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width * height * 4],
        }
    }

    pub fn from_rgba(width: usize, height: usize, pixels: Vec<u8>) -> RenderResult<Self> {
        let expected = width * height * 4;
        if pixels.len() != expected {
            return Err(RenderError::DimensionMismatch {
                width,
                height,
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y * self.width + x) * 4;
        Some(Color::new(
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ))
    }

    pub fn set_pixel(&mut self, x: usize, y: usize, color: Color) {
        if x < self.width && y < self.height {
            let i = (y * self.width + x) * 4;
            self.pixels[i..i + 4].copy_from_slice(&color.to_array());
        }
    }

    /// Iterate pixels in row-major order.
    pub fn colors(&self) -> impl Iterator<Item = Color> + '_ {
        self.pixels
            .chunks_exact(4)
            .map(|p| Color::new(p[0], p[1], p[2], p[3]))
    }

    /// True when every pixel has alpha 0.
    pub fn is_fully_transparent(&self) -> bool {
        self.pixels.chunks_exact(4).all(|p| p[3] == 0)
    }

    pub fn to_png(&self) -> RenderResult<Vec<u8>> {
        png::create_png_auto(&self.pixels, self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_access() {
        let mut bitmap = Bitmap::new(3, 2);
        assert!(bitmap.is_fully_transparent());
        bitmap.set_pixel(2, 1, Color::rgb(1, 2, 3));
        assert_eq!(bitmap.pixel(2, 1), Some(Color::rgb(1, 2, 3)));
        assert_eq!(bitmap.pixel(3, 0), None);
        assert!(!bitmap.is_fully_transparent());
    }

    #[test]
    fn test_from_rgba_checks_length() {
        assert!(Bitmap::from_rgba(2, 2, vec![0; 16]).is_ok());
        assert_eq!(
            Bitmap::from_rgba(2, 2, vec![0; 15]),
            Err(RenderError::DimensionMismatch {
                width: 2,
                height: 2,
                expected: 16,
                actual: 15
            })
        );
    }

    #[test]
    fn test_to_png() {
        let png = Bitmap::new(4, 4).to_png().unwrap();
        assert_eq!(&png[1..4], b"PNG");
    }
}
