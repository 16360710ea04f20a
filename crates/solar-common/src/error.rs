//! Error types for raster construction.

use thiserror::Error;

/// Result type alias using RasterError.
pub type RasterResult<T> = Result<T, RasterError>;

/// Violations of the raster data model invariants.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RasterError {
    #[error("Raster dimensions must be positive, got {width}x{height}")]
    EmptyRaster { width: usize, height: usize },

    #[error("Raster has no bands")]
    NoBands,

    #[error("Band {band} has {actual} samples, expected {expected}")]
    BandLength {
        band: usize,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid bounds: {0}")]
    InvalidBounds(String),
}
