//! Projected coordinate reference systems identified by EPSG code.

use thiserror::Error;

use crate::{Utm, WebMercator};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProjectionError {
    #[error("Unsupported projected CRS: EPSG:{0}")]
    UnsupportedEpsg(u32),
}

/// A projected CRS whose coordinates can be converted back to WGS84 degrees.
#[derive(Debug, Clone)]
pub enum ProjectedCrs {
    Utm(Utm),
    WebMercator(WebMercator),
}

impl ProjectedCrs {
    /// Look up a supported CRS by EPSG code.
    pub fn from_epsg(code: u32) -> Result<Self, ProjectionError> {
        match code {
            3857 | 900913 => Ok(ProjectedCrs::WebMercator(WebMercator)),
            _ => Utm::from_epsg(code)
                .map(ProjectedCrs::Utm)
                .ok_or(ProjectionError::UnsupportedEpsg(code)),
        }
    }

    /// Convert projected `(x, y)` to geographic `(lon, lat)` in degrees.
    pub fn to_geographic(&self, x: f64, y: f64) -> (f64, f64) {
        match self {
            ProjectedCrs::Utm(utm) => utm.to_geographic(x, y),
            ProjectedCrs::WebMercator(merc) => merc.to_geographic(x, y),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        assert!(matches!(
            ProjectedCrs::from_epsg(32618),
            Ok(ProjectedCrs::Utm(_))
        ));
        assert!(matches!(
            ProjectedCrs::from_epsg(3857),
            Ok(ProjectedCrs::WebMercator(_))
        ));
        assert_eq!(
            ProjectedCrs::from_epsg(27700).unwrap_err(),
            ProjectionError::UnsupportedEpsg(27700)
        );
    }
}
