//! Common types shared across the solar data layer pipeline.

pub mod bbox;
pub mod descriptor;
pub mod error;
pub mod layer;
pub mod raster;
pub mod style;

pub use bbox::GeoBounds;
pub use descriptor::{DataLayersResponse, ImageryDate, ImageryQuality};
pub use error::{RasterError, RasterResult};
pub use layer::{LayerId, ParseLayerIdError};
pub use raster::RasterImage;
pub use style::Color;
