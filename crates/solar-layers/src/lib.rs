//! Layer orchestration for solar data layers.
//!
//! Given a [`DataLayersResponse`](solar_common::DataLayersResponse), the
//! [`LayerOrchestrator`] retrieves the rasters a layer needs, decodes them
//! and renders them into bitmaps with a legend.

pub mod cache;
pub mod config;
pub mod error;
pub mod generation;
pub mod orchestrator;
pub mod plan;
pub mod shade;
pub mod source;

pub use cache::{CacheStats, RasterCache};
pub use config::LayerConfig;
pub use error::{LayerError, LayerResult};
pub use generation::{Generation, RequestGenerations};
pub use orchestrator::{Layer, LayerOrchestrator};
pub use plan::{BandSelection, DomainPolicy, LayerPlan, LegendPolicy, PaletteChoice};
pub use shade::ShadeSampling;
pub use source::{HttpSource, MemorySource, RasterSource};
