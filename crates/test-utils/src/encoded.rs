//! GeoTIFF files written by the `tiff` crate encoder.
//!
//! These give the decoder input produced by an independent writer, in
//! particular real LZW streams. The encoder only writes chunky strips, so
//! tiles, planar layouts and BigTIFF stay with [`GeoTiffBuilder`].
//!
//! [`GeoTiffBuilder`]: crate::GeoTiffBuilder

use std::io::{Cursor, Seek, Write};

use tiff::encoder::colortype::ColorType;
use tiff::encoder::{Compression, DeflateLevel, DirectoryEncoder, TiffEncoder, TiffKind, TiffValue};
use tiff::tags::Tag;

const MODEL_PIXEL_SCALE: u16 = 33550;
const MODEL_TIEPOINT: u16 = 33922;
const GEO_KEY_DIRECTORY: u16 = 34735;
const GDAL_NODATA: u16 = 42113;

/// Compression passed to the encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncoderCodec {
    None,
    Lzw,
    Deflate,
}

impl EncoderCodec {
    fn compression(self) -> Compression {
        match self {
            EncoderCodec::None => Compression::Uncompressed,
            EncoderCodec::Lzw => Compression::Lzw,
            EncoderCodec::Deflate => Compression::Deflate(DeflateLevel::Fast),
        }
    }
}

/// Geographic (EPSG:4326) GeoTIFF written through `TiffEncoder`.
///
/// ```
/// use test_utils::{colortype::Gray32Float, EncodedGeoTiff, EncoderCodec};
///
/// let tiff = EncodedGeoTiff::new(2, 2)
///     .with_codec(EncoderCodec::Lzw)
///     .encode::<Gray32Float>(&[0.0, 1.0, 2.0, 3.0]);
/// assert_eq!(&tiff[..4], b"II*\0");
/// ```
#[derive(Debug, Clone)]
pub struct EncodedGeoTiff {
    width: u32,
    height: u32,
    codec: EncoderCodec,
    west: f64,
    north: f64,
    pixel_size: f64,
    no_data: Option<String>,
}

impl EncodedGeoTiff {
    /// Uncompressed, at the same origin and pixel size as `GeoTiffBuilder::new`.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            codec: EncoderCodec::None,
            west: -122.0841,
            north: 37.4223,
            pixel_size: 1e-5,
            no_data: None,
        }
    }

    pub fn with_codec(mut self, codec: EncoderCodec) -> Self {
        self.codec = codec;
        self
    }

    pub fn with_origin(mut self, west: f64, north: f64, pixel_size: f64) -> Self {
        self.west = west;
        self.north = north;
        self.pixel_size = pixel_size;
        self
    }

    pub fn with_no_data(mut self, value: &str) -> Self {
        self.no_data = Some(value.to_string());
        self
    }

    /// Encode pixel-interleaved samples of color type `C`.
    pub fn encode<C>(&self, data: &[C::Inner]) -> Vec<u8>
    where
        C: ColorType,
        [C::Inner]: TiffValue,
    {
        let mut out = Cursor::new(Vec::new());
        {
            let mut encoder = TiffEncoder::new(&mut out)
                .expect("in-memory writer")
                .with_compression(self.codec.compression());
            let mut image = encoder
                .new_image::<C>(self.width, self.height)
                .expect("valid dimensions");
            self.write_georeference(image.encoder());
            image.write_data(data).expect("in-memory write");
        }
        out.into_inner()
    }

    fn write_georeference<W: Write + Seek, K: TiffKind>(&self, dir: &mut DirectoryEncoder<W, K>) {
        let scale = [self.pixel_size, self.pixel_size, 0.0];
        let tiepoint = [0.0, 0.0, 0.0, self.west, self.north, 0.0];
        // Model type geographic, raster type area, WGS84
        let keys: Vec<u16> = vec![1, 1, 0, 3, 1024, 0, 1, 2, 1025, 0, 1, 1, 2048, 0, 1, 4326];

        dir.write_tag(Tag::Unknown(MODEL_PIXEL_SCALE), scale.as_slice())
            .expect("pixel scale");
        dir.write_tag(Tag::Unknown(MODEL_TIEPOINT), tiepoint.as_slice())
            .expect("tiepoint");
        dir.write_tag(Tag::Unknown(GEO_KEY_DIRECTORY), keys.as_slice())
            .expect("geokeys");
        if let Some(no_data) = &self.no_data {
            dir.write_tag(Tag::Unknown(GDAL_NODATA), no_data.as_str())
                .expect("nodata");
        }
    }
}
