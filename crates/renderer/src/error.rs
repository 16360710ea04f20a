//! Error types for rendering.

use thiserror::Error;

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    /// Requested band does not exist in the raster
    #[error("Band index {index} out of range for raster with {band_count} bands")]
    BandIndexOutOfRange { index: usize, band_count: usize },

    /// RGB passthrough needs three bands
    #[error("Rendering needs {required} bands, raster has {available}")]
    MissingBands { required: usize, available: usize },

    #[error("Invalid palette: {0}")]
    InvalidPalette(String),

    /// Pixel buffer length does not match the bitmap dimensions
    #[error("Pixel buffer holds {actual} bytes, {width}x{height} RGBA needs {expected}")]
    DimensionMismatch {
        width: usize,
        height: usize,
        expected: usize,
        actual: usize,
    },

    #[error("PNG encoding failed: {0}")]
    Encode(String),
}
