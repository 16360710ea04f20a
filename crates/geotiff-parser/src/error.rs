//! Error types for GeoTIFF decoding.

use solar_common::RasterError;
use thiserror::Error;

/// Result type for GeoTIFF decoder operations.
pub type DecodeResult<T> = Result<T, DecodeError>;

/// Malformed or unsupported binary structure.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecodeError {
    /// Byte-order marker is neither `II` nor `MM`
    #[error("Invalid byte order marker: {0:02x?}")]
    InvalidByteOrder([u8; 2]),

    /// Version number is neither 42 (TIFF) nor 43 (BigTIFF)
    #[error("Invalid TIFF magic number: {0}")]
    InvalidMagic(u16),

    /// Read past the end of the stream
    #[error("Truncated data: need {needed} bytes at offset {offset}, stream has {len}")]
    Truncated { offset: u64, needed: u64, len: u64 },

    /// Structural problem in the IFD chain
    #[error("Invalid IFD: {0}")]
    InvalidIfd(String),

    /// A tag the decoder needs is absent
    #[error("Missing required tag: {0}")]
    MissingTag(&'static str),

    /// A tag holds a value of the wrong type or count
    #[error("Invalid value for tag {tag}: {reason}")]
    InvalidTag { tag: &'static str, reason: String },

    #[error("Unsupported sample format {format} with {bits} bits per sample")]
    UnsupportedSampleFormat { format: u16, bits: u16 },

    #[error("Unsupported compression scheme: {0}")]
    UnsupportedCompression(u16),

    #[error("Unsupported predictor: {0}")]
    UnsupportedPredictor(u16),

    #[error("Unsupported coordinate reference system: {0}")]
    UnsupportedCrs(String),

    /// Decompression produced the wrong amount of data
    #[error("Byte count mismatch in {chunk}: expected {expected} bytes, got {actual}")]
    ByteCountMismatch {
        chunk: String,
        expected: usize,
        actual: usize,
    },

    #[error("Decompression failed: {0}")]
    Decompression(String),

    #[error("Invalid georeferencing: {0}")]
    InvalidGeoreference(String),

    /// Decoded dimensions or bands violate the raster model
    #[error("Invalid raster: {0}")]
    InvalidRaster(String),
}

impl From<RasterError> for DecodeError {
    fn from(err: RasterError) -> Self {
        match err {
            RasterError::InvalidBounds(msg) => DecodeError::InvalidGeoreference(msg),
            other => DecodeError::InvalidRaster(other.to_string()),
        }
    }
}
