//! Error types for layer orchestration.

use geotiff_parser::DecodeError;
use renderer::RenderError;
use solar_common::LayerId;
use thiserror::Error;

/// Result type alias using LayerError.
pub type LayerResult<T> = Result<T, LayerError>;

/// Errors that fail a whole layer request.
#[derive(Debug, Error)]
pub enum LayerError {
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Unsupported layer: {0}")]
    UnsupportedLayer(String),

    #[error("Failed to fetch {url}: {message}")]
    Transport { url: String, message: String },

    #[error("Fetching {url} timed out after {seconds}s")]
    Timeout { url: String, seconds: f64 },

    #[error("Index {index} out of range (len {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Descriptor has no URL for layer {0}")]
    MissingUrl(LayerId),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Background task failed: {0}")]
    Task(String),
}

impl LayerError {
    /// Retrieval failures, including timeouts.
    pub fn is_transport(&self) -> bool {
        matches!(self, LayerError::Transport { .. } | LayerError::Timeout { .. })
    }

    /// Band or hour index outside its declared range.
    pub fn is_index_error(&self) -> bool {
        matches!(
            self,
            LayerError::IndexOutOfRange { .. }
                | LayerError::Render(RenderError::BandIndexOutOfRange { .. })
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        let timeout = LayerError::Timeout {
            url: "u".into(),
            seconds: 1.0,
        };
        assert!(timeout.is_transport());
        assert!(!timeout.is_index_error());

        let band = LayerError::from(RenderError::BandIndexOutOfRange {
            index: 12,
            band_count: 12,
        });
        assert!(band.is_index_error());
        assert!(LayerError::IndexOutOfRange { index: 9000, len: 8760 }.is_index_error());
        assert!(!LayerError::UnsupportedLayer("bogus".into()).is_transport());
    }

    #[test]
    fn test_display() {
        let err = LayerError::MissingUrl(LayerId::Dsm);
        assert_eq!(err.to_string(), "Descriptor has no URL for layer dsm");
    }
}
