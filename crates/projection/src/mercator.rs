//! Spherical ("Web") Mercator, EPSG:3857.

use std::f64::consts::PI;

use crate::WGS84_A;

/// Web Mercator on a sphere of the WGS84 semi-major axis.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebMercator;

impl WebMercator {
    /// Latitude limit of the square world map.
    pub const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

    /// Convert meters to geographic `(lon, lat)` in degrees.
    pub fn to_geographic(&self, x: f64, y: f64) -> (f64, f64) {
        let lon = (x / WGS84_A).to_degrees();
        let lat = (2.0 * (y / WGS84_A).exp().atan() - PI / 2.0).to_degrees();
        (lon, lat)
    }

    /// Convert geographic `(lon, lat)` in degrees to meters.
    pub fn from_geographic(&self, lon_deg: f64, lat_deg: f64) -> (f64, f64) {
        let lat = lat_deg.clamp(-Self::MAX_LATITUDE, Self::MAX_LATITUDE);
        let x = WGS84_A * lon_deg.to_radians();
        let y = WGS84_A * (PI / 4.0 + lat.to_radians() / 2.0).tan().ln();
        (x, y)
    }
}
