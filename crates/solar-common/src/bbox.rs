//! Geographic bounding boxes.

use serde::{Deserialize, Serialize};

/// A geographic bounding box in WGS84 degrees.
///
/// A valid box has `north > south` and `east > west`. Boxes crossing the
/// antimeridian are not represented.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl GeoBounds {
    /// Create a new bounding box from its four edges.
    pub fn new(north: f64, south: f64, east: f64, west: f64) -> Self {
        Self {
            north,
            south,
            east,
            west,
        }
    }

    /// Smallest box enclosing every `(lon, lat)` point.
    ///
    /// Returns `None` for an empty iterator or when any coordinate is not finite.
    pub fn enclosing<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let mut iter = points.into_iter();
        let (lon, lat) = iter.next()?;
        if !lon.is_finite() || !lat.is_finite() {
            return None;
        }
        let mut bounds = Self::new(lat, lat, lon, lon);
        for (lon, lat) in iter {
            if !lon.is_finite() || !lat.is_finite() {
                return None;
            }
            bounds.north = bounds.north.max(lat);
            bounds.south = bounds.south.min(lat);
            bounds.east = bounds.east.max(lon);
            bounds.west = bounds.west.min(lon);
        }
        Some(bounds)
    }

    /// True when the box has positive extent in both directions.
    pub fn is_valid(&self) -> bool {
        self.north > self.south && self.east > self.west
    }

    /// East-west extent in degrees.
    pub fn width(&self) -> f64 {
        self.east - self.west
    }

    /// North-south extent in degrees.
    pub fn height(&self) -> f64 {
        self.north - self.south
    }

    /// Center point as `(lon, lat)`.
    pub fn center(&self) -> (f64, f64) {
        (
            (self.west + self.east) / 2.0,
            (self.south + self.north) / 2.0,
        )
    }

    /// Check if a point is contained within this box (edges inclusive).
    pub fn contains_point(&self, lon: f64, lat: f64) -> bool {
        lon >= self.west && lon <= self.east && lat >= self.south && lat <= self.north
    }
}
