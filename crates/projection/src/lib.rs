//! Coordinate reference system transformations.
//!
//! Inverse UTM and Web Mercator projections on the WGS84 ellipsoid, used to
//! place projected GeoTIFF rasters on geographic coordinates. `ProjectedCrs`
//! maps an EPSG code to the matching projection.

pub mod crs;
pub mod mercator;
pub mod utm;

pub use crs::{ProjectedCrs, ProjectionError};
pub use mercator::WebMercator;
pub use utm::{Hemisphere, Utm};

/// WGS84 semi-major axis (meters).
pub const WGS84_A: f64 = 6378137.0;

/// WGS84 flattening.
pub const WGS84_F: f64 = 1.0 / 298.257223563;
