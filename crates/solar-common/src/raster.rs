//! In-memory raster representation shared by the decoder, renderer and orchestrator.

use crate::{GeoBounds, RasterError, RasterResult};

/// A decoded multi-band raster.
///
/// Bands are stored as separate row-major `f32` arrays of `width * height`
/// samples each, in the native units of the source (meters, kWh/m², 0-255
/// color values, ...).
#[derive(Debug, Clone, PartialEq)]
pub struct RasterImage {
    width: usize,
    height: usize,
    bands: Vec<Vec<f32>>,
    bounds: GeoBounds,
    no_data: Option<f64>,
}

impl RasterImage {
    /// Build a raster, checking the band length and bounds invariants.
    pub fn new(
        width: usize,
        height: usize,
        bands: Vec<Vec<f32>>,
        bounds: GeoBounds,
    ) -> RasterResult<Self> {
        if width == 0 || height == 0 {
            return Err(RasterError::EmptyRaster { width, height });
        }
        if bands.is_empty() {
            return Err(RasterError::NoBands);
        }
        let expected = width * height;
        for (band, data) in bands.iter().enumerate() {
            if data.len() != expected {
                return Err(RasterError::BandLength {
                    band,
                    expected,
                    actual: data.len(),
                });
            }
        }
        if !bounds.is_valid() {
            return Err(RasterError::InvalidBounds(format!(
                "north={} south={} east={} west={}",
                bounds.north, bounds.south, bounds.east, bounds.west
            )));
        }

        Ok(Self {
            width,
            height,
            bands,
            bounds,
            no_data: None,
        })
    }

    /// Attach a "no data" sentinel value.
    pub fn with_no_data(mut self, no_data: Option<f64>) -> Self {
        self.no_data = no_data;
        self
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of pixels per band.
    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    pub fn band_count(&self) -> usize {
        self.bands.len()
    }

    pub fn bands(&self) -> &[Vec<f32>] {
        &self.bands
    }

    /// A single band, or `None` when the index is out of range.
    pub fn band(&self, index: usize) -> Option<&[f32]> {
        self.bands.get(index).map(Vec::as_slice)
    }

    pub fn bounds(&self) -> GeoBounds {
        self.bounds
    }

    pub fn no_data(&self) -> Option<f64> {
        self.no_data
    }

    /// Sample at column `x`, row `y` of `band`.
    pub fn value(&self, band: usize, x: usize, y: usize) -> Option<f32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.band(band)?.get(y * self.width + x).copied()
    }

    /// True for NaN/infinite samples and samples equal to the no-data sentinel.
    pub fn is_missing(&self, value: f32) -> bool {
        if !value.is_finite() {
            return true;
        }
        // Sentinels are compared at band precision.
        self.no_data.map_or(false, |nd| value == nd as f32)
    }

    /// Minimum and maximum of the valid samples of `band`.
    ///
    /// Missing samples (see [`RasterImage::is_missing`]) are skipped. Returns
    /// `None` for an unknown band or a band with no valid samples.
    pub fn value_range(&self, band: usize) -> Option<(f32, f32)> {
        self.band(band)?
            .iter()
            .copied()
            .filter(|v| !self.is_missing(*v))
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds() -> GeoBounds {
        GeoBounds::new(1.0, 0.0, 1.0, 0.0)
    }

    #[test]
    fn test_band_length_invariant() {
        let err = RasterImage::new(2, 2, vec![vec![0.0; 4], vec![0.0; 3]], bounds()).unwrap_err();
        assert_eq!(
            err,
            RasterError::BandLength {
                band: 1,
                expected: 4,
                actual: 3
            }
        );
    }

    #[test]
    fn test_rejects_empty_and_invalid_bounds() {
        assert!(matches!(
            RasterImage::new(0, 2, vec![vec![]], bounds()),
            Err(RasterError::EmptyRaster { .. })
        ));
        assert_eq!(
            RasterImage::new(1, 1, vec![], bounds()).unwrap_err(),
            RasterError::NoBands
        );
        let flipped = GeoBounds::new(0.0, 1.0, 1.0, 0.0);
        assert!(matches!(
            RasterImage::new(1, 1, vec![vec![1.0]], flipped),
            Err(RasterError::InvalidBounds(_))
        ));
    }

    #[test]
    fn test_value_lookup() {
        let raster =
            RasterImage::new(3, 2, vec![(0..6).map(|v| v as f32).collect()], bounds()).unwrap();
        assert_eq!(raster.value(0, 2, 1), Some(5.0));
        assert_eq!(raster.value(0, 3, 0), None);
        assert_eq!(raster.value(1, 0, 0), None);
    }

    #[test]
    fn test_value_range_skips_missing() {
        let raster = RasterImage::new(
            5,
            1,
            vec![vec![f32::NAN, -9999.0, 12.5, 3.0, f32::INFINITY]],
            bounds(),
        )
        .unwrap()
        .with_no_data(Some(-9999.0));
        assert_eq!(raster.value_range(0), Some((3.0, 12.5)));
    }

    #[test]
    fn test_value_range_all_missing() {
        let raster = RasterImage::new(2, 1, vec![vec![f32::NAN, f32::NAN]], bounds()).unwrap();
        assert_eq!(raster.value_range(0), None);
    }
}
