//! Test data generators for synthetic solar rasters.
//!
//! Every generator is deterministic and returns row-major `f64` values
//! ready for [`crate::GeoTiffBuilder::with_band`].

/// Creates a grid with predictable values.
///
/// Each cell value is calculated as: `col * 1000 + row`
///
/// ```
/// use test_utils::create_test_grid;
///
/// let grid = create_test_grid(10, 5);
/// assert_eq!(grid.len(), 50);
/// assert_eq!(grid[1], 1000.0);
/// assert_eq!(grid[10], 1.0);
/// ```
pub fn create_test_grid(width: usize, height: usize) -> Vec<f64> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            data.push((col * 1000 + row) as f64);
        }
    }
    data
}

/// Roof mask: 1 inside a centered rectangle covering the middle half, 0 elsewhere.
pub fn create_roof_mask(width: usize, height: usize) -> Vec<f64> {
    let (x0, x1) = (width / 4, width - width / 4);
    let (y0, y1) = (height / 4, height - height / 4);
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            let inside = (x0..x1).contains(&col) && (y0..y1).contains(&row);
            data.push(if inside { 1.0 } else { 0.0 });
        }
    }
    data
}

/// Surface model in meters: ground at 10 m with a gable roof ridge peaking
/// at 18 m along the middle row.
pub fn create_dsm_grid(width: usize, height: usize) -> Vec<f64> {
    let mask = create_roof_mask(width, height);
    let mid = (height.max(1) - 1) as f64 / 2.0;
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            let roof = mask[row * width + col] > 0.0;
            let slope = 1.0 - ((row as f64 - mid).abs() / mid.max(1.0));
            data.push(if roof { 14.0 + 4.0 * slope } else { 10.0 });
        }
    }
    data
}

/// Annual flux in kWh/m²/year, rising from 400 at the west edge to 1600
/// at the east edge.
pub fn create_annual_flux_grid(width: usize, height: usize) -> Vec<f64> {
    let span = (width.max(2) - 1) as f64;
    let mut data = Vec::with_capacity(width * height);
    for _row in 0..height {
        for col in 0..width {
            data.push(400.0 + 1200.0 * col as f64 / span);
        }
    }
    data
}

/// Twelve monthly flux bands in kWh/m²/month with a summer peak.
pub fn create_monthly_flux_bands(width: usize, height: usize) -> Vec<Vec<f64>> {
    (0..12)
        .map(|month| {
            let season = (std::f64::consts::PI * (month as f64 + 0.5) / 12.0).sin();
            let base = 40.0 + 140.0 * season;
            create_test_grid(width, height)
                .iter()
                .map(|v| base + (v % 7.0))
                .collect()
        })
        .collect()
}

/// Three 8-bit color bands: red ramps left to right, green top to bottom,
/// blue is constant.
pub fn create_rgb_bands(width: usize, height: usize) -> Vec<Vec<f64>> {
    let x_span = width.saturating_sub(1).max(1);
    let y_span = height.saturating_sub(1).max(1);
    let mut red = Vec::with_capacity(width * height);
    let mut green = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            red.push((col * 255 / x_span) as f64);
            green.push((row * 255 / y_span) as f64);
        }
    }
    let blue = vec![128.0; width * height];
    vec![red, green, blue]
}

/// Single hourly shade frame: a pixel is sunlit (1) when its column is at
/// or east of a shadow edge that moves with the hour.
pub fn create_shade_frame(width: usize, height: usize, hour: u32) -> Vec<f64> {
    let edge = (width as f64 * (hour as f64 / 24.0)).round() as usize;
    let mut data = Vec::with_capacity(width * height);
    for _row in 0..height {
        for col in 0..width {
            data.push(if col >= edge { 1.0 } else { 0.0 });
        }
    }
    data
}
