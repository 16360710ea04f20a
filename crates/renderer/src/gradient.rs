//! Raster-to-bitmap rendering.
//!
//! Rendering modes follow the palette kind:
//! - Continuous: one band normalized against the palette domain and
//!   interpolated between stops
//! - Binary: one band thresholded into one of two colors
//! - RGB passthrough: bands 0-2 copied into the color channels
//!
//! In every mode a pixel whose co-registered mask value is at or below
//! the mask threshold is fully transparent.

use rayon::prelude::*;
use solar_common::{Color, RasterImage};
use tracing::warn;

use crate::bitmap::Bitmap;
use crate::error::{RenderError, RenderResult};
use crate::palette::{Palette, PaletteKind};

/// Per-call rendering knobs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderOptions {
    /// Band rendered in continuous and binary mode
    pub band_index: usize,
    /// Mask values at or below this hide the pixel
    pub mask_threshold: f32,
    /// Binary mode picks the second color above this
    pub binary_threshold: f32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            band_index: 0,
            mask_threshold: 0.0,
            binary_threshold: 0.0,
        }
    }
}

impl RenderOptions {
    pub fn with_band(self, band_index: usize) -> Self {
        Self { band_index, ..self }
    }
}

/// Nearest-neighbour resampling of a row-major grid.
pub fn resample_nearest(
    data: &[f32],
    src_width: usize,
    src_height: usize,
    dst_width: usize,
    dst_height: usize,
) -> Vec<f32> {
    if src_width == dst_width && src_height == dst_height {
        return data.to_vec();
    }

    let mut output = Vec::with_capacity(dst_width * dst_height);
    for y in 0..dst_height {
        let sy = (((y as f64 + 0.5) * src_height as f64 / dst_height as f64) as usize)
            .min(src_height.saturating_sub(1));
        for x in 0..dst_width {
            let sx = (((x as f64 + 0.5) * src_width as f64 / dst_width as f64) as usize)
                .min(src_width.saturating_sub(1));
            output.push(data.get(sy * src_width + sx).copied().unwrap_or(0.0));
        }
    }
    output
}

/// Per-pixel visibility from the mask's first band, on the raster's grid.
fn visibility(raster: &RasterImage, mask: &RasterImage, threshold: f32) -> Vec<bool> {
    let band = mask.band(0).unwrap_or(&[]);
    let values = if mask.width() == raster.width() && mask.height() == raster.height() {
        band.to_vec()
    } else {
        warn!(
            mask_width = mask.width(),
            mask_height = mask.height(),
            width = raster.width(),
            height = raster.height(),
            "Mask grid differs from data grid, resampling"
        );
        resample_nearest(band, mask.width(), mask.height(), raster.width(), raster.height())
    };
    values.into_iter().map(|v| v > threshold).collect()
}

fn channel(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

/// Render one bitmap from `raster`, optionally masked.
pub fn render(
    raster: &RasterImage,
    mask: Option<&RasterImage>,
    palette: &Palette,
    options: &RenderOptions,
) -> RenderResult<Bitmap> {
    let width = raster.width();
    let bands: Vec<&[f32]> = match palette.kind() {
        PaletteKind::RgbPassthrough => {
            if raster.band_count() < 3 {
                return Err(RenderError::MissingBands {
                    required: 3,
                    available: raster.band_count(),
                });
            }
            raster.bands()[..3].iter().map(Vec::as_slice).collect()
        }
        PaletteKind::Continuous | PaletteKind::Binary => {
            let band = raster
                .band(options.band_index)
                .ok_or(RenderError::BandIndexOutOfRange {
                    index: options.band_index,
                    band_count: raster.band_count(),
                })?;
            vec![band]
        }
    };
    let visible = mask.map(|m| visibility(raster, m, options.mask_threshold));

    let mut pixels = vec![0u8; raster.pixel_count() * 4];
    pixels
        .par_chunks_mut(width * 4)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, out) in row.chunks_exact_mut(4).enumerate() {
                let i = y * width + x;
                if visible.as_ref().is_some_and(|v| !v[i]) {
                    continue;
                }
                let color = match palette.kind() {
                    PaletteKind::Continuous => {
                        let v = bands[0][i];
                        if raster.is_missing(v) {
                            continue;
                        }
                        palette.color_at(v)
                    }
                    PaletteKind::Binary => palette.classify(bands[0][i], options.binary_threshold),
                    PaletteKind::RgbPassthrough => {
                        let (r, g, b) = (bands[0][i], bands[1][i], bands[2][i]);
                        if raster.is_missing(r) || raster.is_missing(g) || raster.is_missing(b) {
                            continue;
                        }
                        Color::rgb(channel(r), channel(g), channel(b))
                    }
                };
                out.copy_from_slice(&color.to_array());
            }
        });

    Bitmap::from_rgba(width, raster.height(), pixels)
}

/// Render several bands, one bitmap each, in parallel.
///
/// Every index is validated before any rendering starts.
pub fn render_bands(
    raster: &RasterImage,
    mask: Option<&RasterImage>,
    palette: &Palette,
    options: &RenderOptions,
    band_indices: &[usize],
) -> RenderResult<Vec<Bitmap>> {
    if let Some(&index) = band_indices.iter().find(|&&i| i >= raster.band_count()) {
        return Err(RenderError::BandIndexOutOfRange {
            index,
            band_count: raster.band_count(),
        });
    }
    band_indices
        .par_iter()
        .map(|&index| render(raster, mask, palette, &options.with_band(index)))
        .collect()
}
