//! Shared fixtures: locations and data layer descriptors.

/// Upper-left corners used by the generated rasters.
pub mod locations {
    /// (west, north) in degrees, Mountain View, CA
    pub const MOUNTAIN_VIEW: (f64, f64) = (-122.0841, 37.4223);

    /// (west, north) in UTM zone 10N meters, same building
    pub const MOUNTAIN_VIEW_UTM: (f64, f64) = (581_041.2, 4_142_114.8);

    /// EPSG code for WGS84 / UTM zone 10N
    pub const UTM_10N: u16 = 32610;

    /// Pixel size of HIGH quality imagery, in meters
    pub const HIGH_QUALITY_PIXEL_METERS: f64 = 0.1;
}

/// Hourly shade layout of the descriptor.
pub mod shade {
    /// Number of hourly shade URLs in a full year
    pub const HOURS_PER_YEAR: usize = 365 * 24;
}

/// Data layers descriptor JSON whose URLs all live under `base_url`.
///
/// Layer URLs are `{base_url}/{layer}.tif`; hourly shade URLs are
/// `{base_url}/hourly/{index}.tif` for every index of the year.
pub fn data_layers_json(base_url: &str) -> String {
    let hourly: Vec<String> = (0..shade::HOURS_PER_YEAR)
        .map(|i| format!("{}/hourly/{}.tif", base_url, i))
        .collect();
    serde_json::json!({
        "imageryDate": { "year": 2022, "month": 4, "day": 6 },
        "imageryProcessedDate": { "year": 2023, "month": 8, "day": 4 },
        "dsmUrl": format!("{}/dsm.tif", base_url),
        "rgbUrl": format!("{}/rgb.tif", base_url),
        "maskUrl": format!("{}/mask.tif", base_url),
        "annualFluxUrl": format!("{}/annualFlux.tif", base_url),
        "monthlyFluxUrl": format!("{}/monthlyFlux.tif", base_url),
        "hourlyShadeUrls": hourly,
        "imageryQuality": "HIGH"
    })
    .to_string()
}

/// URL of one hourly shade frame in [`data_layers_json`].
pub fn hourly_shade_url(base_url: &str, index: usize) -> String {
    format!("{}/hourly/{}.tif", base_url, index)
}
