//! Universal Transverse Mercator on the WGS84 ellipsoid.
//!
//! Uses the series expansions from Snyder, "Map Projections: A Working
//! Manual" (USGS PP 1395), pp. 60-64. Accuracy is well below a centimeter
//! inside a zone, which is far more than needed for overlay bounds.
//!
//! Coordinates:
//! - Easting carries a 500 000 m false easting
//! - Northing carries a 10 000 000 m false northing in the southern hemisphere

use std::f64::consts::PI;

use crate::{WGS84_A, WGS84_F};

/// Scale factor on the central meridian.
const K0: f64 = 0.9996;
const FALSE_EASTING: f64 = 500_000.0;
const FALSE_NORTHING_SOUTH: f64 = 10_000_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hemisphere {
    North,
    South,
}

/// A single UTM zone.
#[derive(Debug, Clone)]
pub struct Utm {
    /// Zone number, 1-60
    pub zone: u8,
    pub hemisphere: Hemisphere,
    /// Central meridian in radians
    lon0: f64,
    /// First eccentricity squared
    e2: f64,
    /// Second eccentricity squared
    ep2: f64,
}

impl Utm {
    /// Create a zone projection. Returns `None` for zones outside 1-60.
    pub fn new(zone: u8, hemisphere: Hemisphere) -> Option<Self> {
        if !(1..=60).contains(&zone) {
            return None;
        }
        let e2 = WGS84_F * (2.0 - WGS84_F);
        let lon0_deg = (zone as f64 - 1.0) * 6.0 - 180.0 + 3.0;

        Some(Self {
            zone,
            hemisphere,
            lon0: lon0_deg.to_radians(),
            e2,
            ep2: e2 / (1.0 - e2),
        })
    }

    /// Zone for a WGS84 UTM EPSG code (32601-32660 north, 32701-32760 south).
    pub fn from_epsg(code: u32) -> Option<Self> {
        match code {
            32601..=32660 => Self::new((code - 32600) as u8, Hemisphere::North),
            32701..=32760 => Self::new((code - 32700) as u8, Hemisphere::South),
            _ => None,
        }
    }

    /// Central meridian in degrees.
    pub fn central_meridian(&self) -> f64 {
        self.lon0.to_degrees()
    }

    /// Meridian arc length from the equator to latitude `phi` (radians).
    fn meridian_arc(&self, phi: f64) -> f64 {
        let e2 = self.e2;
        let e4 = e2 * e2;
        let e6 = e4 * e2;
        WGS84_A
            * ((1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0) * phi
                - (3.0 * e2 / 8.0 + 3.0 * e4 / 32.0 + 45.0 * e6 / 1024.0) * (2.0 * phi).sin()
                + (15.0 * e4 / 256.0 + 45.0 * e6 / 1024.0) * (4.0 * phi).sin()
                - (35.0 * e6 / 3072.0) * (6.0 * phi).sin())
    }

    /// Convert geographic coordinates (degrees) to `(easting, northing)` in meters.
    pub fn from_geographic(&self, lon_deg: f64, lat_deg: f64) -> (f64, f64) {
        let phi = lat_deg.to_radians();
        let mut dlon = lon_deg.to_radians() - self.lon0;
        while dlon > PI {
            dlon -= 2.0 * PI;
        }
        while dlon < -PI {
            dlon += 2.0 * PI;
        }

        let sin_phi = phi.sin();
        let cos_phi = phi.cos();
        let tan_phi = phi.tan();

        let n = WGS84_A / (1.0 - self.e2 * sin_phi * sin_phi).sqrt();
        let t = tan_phi * tan_phi;
        let c = self.ep2 * cos_phi * cos_phi;
        let a = cos_phi * dlon;
        let m = self.meridian_arc(phi);

        let x = K0
            * n
            * (a + (1.0 - t + c) * a.powi(3) / 6.0
                + (5.0 - 18.0 * t + t * t + 72.0 * c - 58.0 * self.ep2) * a.powi(5) / 120.0);
        let y = K0
            * (m + n
                * tan_phi
                * (a * a / 2.0
                    + (5.0 - t + 9.0 * c + 4.0 * c * c) * a.powi(4) / 24.0
                    + (61.0 - 58.0 * t + t * t + 600.0 * c - 330.0 * self.ep2) * a.powi(6)
                        / 720.0));

        let northing = match self.hemisphere {
            Hemisphere::North => y,
            Hemisphere::South => y + FALSE_NORTHING_SOUTH,
        };
        (x + FALSE_EASTING, northing)
    }

    /// Convert `(easting, northing)` in meters to geographic `(lon, lat)` in degrees.
    pub fn to_geographic(&self, easting: f64, northing: f64) -> (f64, f64) {
        let e2 = self.e2;
        let x = easting - FALSE_EASTING;
        let y = match self.hemisphere {
            Hemisphere::North => northing,
            Hemisphere::South => northing - FALSE_NORTHING_SOUTH,
        };

        // Footpoint latitude
        let m = y / K0;
        let mu = m / (WGS84_A * (1.0 - e2 / 4.0 - 3.0 * e2 * e2 / 64.0 - 5.0 * e2.powi(3) / 256.0));
        let e1 = (1.0 - (1.0 - e2).sqrt()) / (1.0 + (1.0 - e2).sqrt());
        let phi1 = mu
            + (3.0 * e1 / 2.0 - 27.0 * e1.powi(3) / 32.0) * (2.0 * mu).sin()
            + (21.0 * e1 * e1 / 16.0 - 55.0 * e1.powi(4) / 32.0) * (4.0 * mu).sin()
            + (151.0 * e1.powi(3) / 96.0) * (6.0 * mu).sin()
            + (1097.0 * e1.powi(4) / 512.0) * (8.0 * mu).sin();

        let sin_phi1 = phi1.sin();
        let cos_phi1 = phi1.cos();
        let tan_phi1 = phi1.tan();

        let n1 = WGS84_A / (1.0 - e2 * sin_phi1 * sin_phi1).sqrt();
        let t1 = tan_phi1 * tan_phi1;
        let c1 = self.ep2 * cos_phi1 * cos_phi1;
        let r1 = WGS84_A * (1.0 - e2) / (1.0 - e2 * sin_phi1 * sin_phi1).powf(1.5);
        let d = x / (n1 * K0);

        let lat = phi1
            - (n1 * tan_phi1 / r1)
                * (d * d / 2.0
                    - (5.0 + 3.0 * t1 + 10.0 * c1 - 4.0 * c1 * c1 - 9.0 * self.ep2) * d.powi(4)
                        / 24.0
                    + (61.0 + 90.0 * t1 + 298.0 * c1 + 45.0 * t1 * t1
                        - 252.0 * self.ep2
                        - 3.0 * c1 * c1)
                        * d.powi(6)
                        / 720.0);
        let lon = self.lon0
            + (d - (1.0 + 2.0 * t1 + c1) * d.powi(3) / 6.0
                + (5.0 - 2.0 * c1 + 28.0 * t1 - 3.0 * c1 * c1 + 8.0 * self.ep2 + 24.0 * t1 * t1)
                    * d.powi(5)
                    / 120.0)
                / cos_phi1;

        (lon.to_degrees(), lat.to_degrees())
    }
}
