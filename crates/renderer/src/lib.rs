//! Rendering of decoded rasters into map overlay bitmaps.
//!
//! Implements the palette modes used by the data layers:
//! - Continuous gradients (elevation, solar flux)
//! - Binary two-color classification (roof mask, hourly shade)
//! - RGB passthrough (aerial imagery)
//!
//! plus mask compositing, legends and PNG encoding.

pub mod bitmap;
pub mod error;
pub mod gradient;
pub mod legend;
pub mod palette;
pub mod png;

pub use bitmap::Bitmap;
pub use error::{RenderError, RenderResult};
pub use gradient::{render, render_bands, RenderOptions};
pub use legend::Legend;
pub use palette::{Palette, PaletteKind};
