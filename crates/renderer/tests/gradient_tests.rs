//! Tests for palette rendering, masking and multi-band output.

use renderer::palette::{self, BINARY, IRON};
use renderer::{render, render_bands, Palette, RenderError, RenderOptions};
use solar_common::{Color, GeoBounds, RasterImage};

fn bounds() -> GeoBounds {
    GeoBounds::new(37.4224, 37.4223, -122.0840, -122.0841)
}

fn raster(width: usize, height: usize, bands: Vec<Vec<f32>>) -> RasterImage {
    RasterImage::new(width, height, bands, bounds()).unwrap()
}

fn black_to_white(min: f32, max: f32) -> Palette {
    Palette::continuous(&[Color::rgb(0, 0, 0), Color::rgb(255, 255, 255)], min, max).unwrap()
}

// ============================================================================
// Continuous mode
// ============================================================================

#[test]
fn test_round_trip_2x2() {
    let r = raster(2, 2, vec![vec![0.0, 10.0, 20.0, 30.0]]);
    let bitmap = render(&r, None, &black_to_white(0.0, 30.0), &RenderOptions::default()).unwrap();

    let reds: Vec<u8> = bitmap.colors().map(|c| c.r).collect();
    assert_eq!(reds, vec![0, 85, 170, 255]);
    for c in bitmap.colors() {
        assert_eq!(c.r, c.g);
        assert_eq!(c.g, c.b);
        assert_eq!(c.a, 255);
    }
}

#[test]
fn test_continuous_is_monotonic() {
    let values: Vec<f32> = (0..100).map(|v| v as f32).collect();
    let r = raster(100, 1, vec![values]);
    let bitmap = render(&r, None, &black_to_white(0.0, 99.0), &RenderOptions::default()).unwrap();

    let reds: Vec<u8> = bitmap.colors().map(|c| c.r).collect();
    assert!(reds.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn test_band_selection() {
    let r = raster(1, 1, vec![vec![0.0], vec![30.0]]);
    let options = RenderOptions::default().with_band(1);
    let bitmap = render(&r, None, &black_to_white(0.0, 30.0), &options).unwrap();
    assert_eq!(bitmap.pixel(0, 0), Some(Color::rgb(255, 255, 255)));
}

#[test]
fn test_band_index_out_of_range() {
    let r = raster(1, 1, vec![vec![0.0]]);
    let err = render(
        &r,
        None,
        &black_to_white(0.0, 1.0),
        &RenderOptions::default().with_band(12),
    )
    .unwrap_err();
    assert_eq!(
        err,
        RenderError::BandIndexOutOfRange {
            index: 12,
            band_count: 1
        }
    );
}

// ============================================================================
// Binary mode
// ============================================================================

#[test]
fn test_binary_is_two_valued() {
    let values: Vec<f32> = (0..64).map(|v| (v as f32 * 0.37).sin()).collect();
    let r = raster(8, 8, vec![values]);
    let bitmap = render(&r, None, &palette::binary(), &RenderOptions::default()).unwrap();
    assert!(bitmap.colors().all(|c| c == BINARY[0] || c == BINARY[1]));
    assert!(bitmap.colors().any(|c| c == BINARY[0]));
    assert!(bitmap.colors().any(|c| c == BINARY[1]));
}

#[test]
fn test_binary_threshold() {
    let r = raster(3, 1, vec![vec![0.2, 0.5, 0.8]]);
    let options = RenderOptions {
        binary_threshold: 0.5,
        ..Default::default()
    };
    let bitmap = render(&r, None, &palette::sunlight(), &options).unwrap();
    let on = palette::SUNLIGHT[1];
    let off = palette::SUNLIGHT[0];
    assert_eq!(bitmap.colors().collect::<Vec<_>>(), vec![off, off, on]);
}

// ============================================================================
// Masking
// ============================================================================

#[test]
fn test_all_zero_mask_is_fully_transparent() {
    let data = raster(4, 4, vec![(0..16).map(|v| v as f32).collect(); 3]);
    let mask = raster(4, 4, vec![vec![0.0; 16]]);
    let options = RenderOptions::default();

    let palettes = [
        black_to_white(0.0, 15.0),
        palette::binary(),
        Palette::rgb_passthrough(),
    ];
    for palette in &palettes {
        let bitmap = render(&data, Some(&mask), palette, &options).unwrap();
        assert!(bitmap.is_fully_transparent(), "{:?}", palette.kind());
    }
}

#[test]
fn test_mask_hides_only_unmasked_pixels() {
    let data = raster(2, 2, vec![vec![5.0; 4]]);
    let mask = raster(2, 2, vec![vec![1.0, 0.0, 0.0, 1.0]]);
    let iron = palette::iron(0.0, 10.0).unwrap();
    let bitmap = render(&data, Some(&mask), &iron, &RenderOptions::default()).unwrap();
    let alphas: Vec<u8> = bitmap.colors().map(|c| c.a).collect();
    assert_eq!(alphas, vec![255, 0, 0, 255]);
}

#[test]
fn test_mask_on_coarser_grid_is_resampled() {
    let data = raster(4, 4, vec![vec![1.0; 16]]);
    // Left column of a 2x2 mask is roof
    let mask = raster(2, 2, vec![vec![1.0, 0.0, 1.0, 0.0]]);
    let bitmap = render(&data, Some(&mask), &palette::binary(), &RenderOptions::default()).unwrap();
    for y in 0..4 {
        assert_eq!(bitmap.pixel(0, y).unwrap().a, 255);
        assert_eq!(bitmap.pixel(1, y).unwrap().a, 255);
        assert_eq!(bitmap.pixel(2, y).unwrap().a, 0);
        assert_eq!(bitmap.pixel(3, y).unwrap().a, 0);
    }
}

// ============================================================================
// RGB passthrough and multi-band
// ============================================================================

#[test]
fn test_rgb_passthrough() {
    let r = raster(1, 1, vec![vec![10.0], vec![20.0], vec![30.0]]);
    let bitmap = render(&r, None, &Palette::rgb_passthrough(), &RenderOptions::default()).unwrap();
    assert_eq!(bitmap.pixel(0, 0), Some(Color::rgb(10, 20, 30)));
}

#[test]
fn test_rgb_needs_three_bands() {
    let r = raster(1, 1, vec![vec![10.0], vec![20.0]]);
    assert_eq!(
        render(&r, None, &Palette::rgb_passthrough(), &RenderOptions::default()).unwrap_err(),
        RenderError::MissingBands {
            required: 3,
            available: 2
        }
    );
}

#[test]
fn test_render_bands_one_bitmap_per_band() {
    let bands: Vec<Vec<f32>> = (0..12).map(|m| vec![m as f32 * 10.0; 4]).collect();
    let r = raster(2, 2, bands);
    let palette = palette::iron(0.0, 200.0).unwrap();
    let indices: Vec<usize> = (0..12).collect();

    let bitmaps = render_bands(&r, None, &palette, &RenderOptions::default(), &indices).unwrap();
    assert_eq!(bitmaps.len(), 12);
    assert_eq!(bitmaps[0].pixel(0, 0), Some(IRON[0]));
    // Order follows the requested indices
    for (m, bitmap) in bitmaps.iter().enumerate() {
        assert_eq!(bitmap.pixel(1, 1), Some(palette.color_at(m as f32 * 10.0)));
    }
}

#[test]
fn test_render_bands_rejects_bad_index_up_front() {
    let r = raster(1, 1, vec![vec![0.0]; 12]);
    let err = render_bands(
        &r,
        None,
        &palette::iron(0.0, 200.0).unwrap(),
        &RenderOptions::default(),
        &[0, 5, 12],
    )
    .unwrap_err();
    assert_eq!(
        err,
        RenderError::BandIndexOutOfRange {
            index: 12,
            band_count: 12
        }
    );
}

#[test]
fn test_render_is_pure() {
    let r = raster(3, 3, vec![(0..9).map(|v| v as f32).collect()]);
    let p = palette::rainbow(0.0, 8.0).unwrap();
    let a = render(&r, None, &p, &RenderOptions::default()).unwrap();
    let b = render(&r, None, &p, &RenderOptions::default()).unwrap();
    assert_eq!(a, b);
}
