//! GeoTIFF decoder.
//!
//! Turns a TIFF or BigTIFF byte stream into a [`RasterImage`]: one `f32`
//! band per sample plus the WGS84 bounds derived from the GeoTIFF tags.
//! Only the first IFD is decoded; overviews and masks that follow it are
//! ignored.

pub mod error;
pub mod geo;
pub mod header;
pub mod ifd;
pub mod image;
pub mod samples;
pub mod tags;
pub mod unpacking;

pub use error::{DecodeError, DecodeResult};
pub use image::{Chunking, ImageLayout, MAX_SAMPLES};
pub use samples::SampleType;

use solar_common::RasterImage;
use tracing::{debug, warn};

use header::{parse_header, ByteReader};
use ifd::{read_ifd_chain, Ifd};

/// Decode the first image of a GeoTIFF byte stream.
pub fn decode(data: &[u8]) -> DecodeResult<RasterImage> {
    let header = parse_header(data)?;
    let reader = ByteReader::new(data, header.byte_order);
    let ifds = read_ifd_chain(&reader, &header)?;
    if ifds.len() > 1 {
        warn!(
            ignored = ifds.len() - 1,
            "Decoding first IFD only, ignoring the rest"
        );
    }
    let ifd = ifds
        .first()
        .ok_or_else(|| DecodeError::InvalidIfd("file contains no IFD".to_string()))?;

    let layout = ImageLayout::from_ifd(ifd)?;
    debug!(
        width = layout.width,
        height = layout.height,
        samples = layout.samples_per_pixel,
        sample_type = ?layout.sample_type,
        compression = ?layout.compression,
        chunking = ?layout.chunking,
        big_tiff = header.big_tiff,
        "Decoding GeoTIFF"
    );

    let bands = layout.read_bands(&reader)?;
    let bounds = geo::compute_bounds(ifd, layout.width, layout.height)?;
    let raster = RasterImage::new(layout.width, layout.height, bands, bounds)?;

    Ok(raster.with_no_data(no_data(ifd)?))
}

/// GDAL_NODATA holds the sentinel as ASCII text.
fn no_data(ifd: &Ifd<'_>) -> DecodeResult<Option<f64>> {
    let Some(text) = ifd.ascii(tags::GDAL_NODATA)? else {
        return Ok(None);
    };
    match text.trim().parse::<f64>() {
        Ok(value) => Ok(Some(value)),
        Err(_) => {
            warn!(value = %text, "Ignoring unparseable GDAL_NODATA");
            Ok(None)
        }
    }
}
