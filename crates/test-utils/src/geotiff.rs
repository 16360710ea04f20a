//! Synthetic GeoTIFF writer.
//!
//! Creates small but structurally valid GeoTIFF files for decoder and
//! pipeline tests. Layout: header, chunk data, then the IFD with its
//! out-of-line values.

use std::io::Write;

use flate2::write::ZlibEncoder;

/// Stored sample representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleKind {
    U8,
    U16,
    I16,
    F32,
    F64,
}

impl SampleKind {
    fn size(self) -> usize {
        match self {
            SampleKind::U8 => 1,
            SampleKind::U16 | SampleKind::I16 => 2,
            SampleKind::F32 => 4,
            SampleKind::F64 => 8,
        }
    }

    fn bits(self) -> u16 {
        self.size() as u16 * 8
    }

    fn format(self) -> u16 {
        match self {
            SampleKind::U8 | SampleKind::U16 => 1,
            SampleKind::I16 => 2,
            SampleKind::F32 | SampleKind::F64 => 3,
        }
    }
}

/// Chunk compression written by the builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Codec {
    None,
    Deflate,
    PackBits,
}

impl Codec {
    fn code(self) -> u16 {
        match self {
            Codec::None => 1,
            Codec::Deflate => 8,
            Codec::PackBits => 32773,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Layout {
    Strips { rows_per_strip: usize },
    Tiles { width: usize, height: usize },
}

#[derive(Debug, Clone, PartialEq)]
enum Georef {
    None,
    /// Upper-left corner plus pixel size, in degrees
    Geographic {
        west: f64,
        north: f64,
        pixel_width: f64,
        pixel_height: f64,
    },
    /// Upper-left corner plus square pixel size, in projected meters
    Projected {
        epsg: u16,
        west: f64,
        north: f64,
        pixel_size: f64,
    },
    Transformation([f64; 16]),
}

// Field type codes
const SHORT: u16 = 3;
const LONG: u16 = 4;
const ASCII: u16 = 2;
const DOUBLE: u16 = 12;
const LONG8: u16 = 16;

struct Field {
    tag: u16,
    field_type: u16,
    count: u64,
    bytes: Vec<u8>,
}

/// Build a GeoTIFF byte stream.
///
/// ```
/// use test_utils::GeoTiffBuilder;
///
/// let tiff = GeoTiffBuilder::new(2, 2)
///     .with_band(vec![0.0, 10.0, 20.0, 30.0])
///     .build();
/// assert_eq!(&tiff[..4], b"II*\0");
/// ```
#[derive(Debug, Clone)]
pub struct GeoTiffBuilder {
    width: usize,
    height: usize,
    bands: Vec<Vec<f64>>,
    sample: SampleKind,
    big_endian: bool,
    big_tiff: bool,
    layout: Layout,
    planar: bool,
    codec: Codec,
    horizontal_predictor: bool,
    georef: Georef,
    pixel_is_point: bool,
    no_data: Option<String>,
    extra_ifd: bool,
}

impl GeoTiffBuilder {
    /// Little-endian, single strip, uncompressed f32, placed near Mountain View
    /// at 1e-5 degree pixels.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            bands: Vec::new(),
            sample: SampleKind::F32,
            big_endian: false,
            big_tiff: false,
            layout: Layout::Strips {
                rows_per_strip: height.max(1),
            },
            planar: false,
            codec: Codec::None,
            horizontal_predictor: false,
            georef: Georef::Geographic {
                west: -122.0841,
                north: 37.4223,
                pixel_width: 1e-5,
                pixel_height: 1e-5,
            },
            pixel_is_point: false,
            no_data: None,
            extra_ifd: false,
        }
    }

    pub fn with_band(mut self, values: Vec<f64>) -> Self {
        self.bands.push(values);
        self
    }

    pub fn with_bands(mut self, bands: Vec<Vec<f64>>) -> Self {
        self.bands.extend(bands);
        self
    }

    pub fn with_sample(mut self, sample: SampleKind) -> Self {
        self.sample = sample;
        self
    }

    pub fn big_endian(mut self) -> Self {
        self.big_endian = true;
        self
    }

    pub fn big_tiff(mut self) -> Self {
        self.big_tiff = true;
        self
    }

    pub fn with_strips(mut self, rows_per_strip: usize) -> Self {
        self.layout = Layout::Strips { rows_per_strip };
        self
    }

    pub fn with_tiles(mut self, width: usize, height: usize) -> Self {
        self.layout = Layout::Tiles { width, height };
        self
    }

    pub fn planar(mut self) -> Self {
        self.planar = true;
        self
    }

    pub fn with_codec(mut self, codec: Codec) -> Self {
        self.codec = codec;
        self
    }

    /// Horizontal differencing; integer sample kinds only.
    pub fn with_horizontal_predictor(mut self) -> Self {
        self.horizontal_predictor = true;
        self
    }

    pub fn with_geographic(
        mut self,
        west: f64,
        north: f64,
        pixel_width: f64,
        pixel_height: f64,
    ) -> Self {
        self.georef = Georef::Geographic {
            west,
            north,
            pixel_width,
            pixel_height,
        };
        self
    }

    /// Projected CRS, for example 32610 for UTM zone 10N.
    pub fn with_projected(mut self, epsg: u16, west: f64, north: f64, pixel_size: f64) -> Self {
        self.georef = Georef::Projected {
            epsg,
            west,
            north,
            pixel_size,
        };
        self
    }

    /// Row-major 4x4 ModelTransformation, geographic coordinates.
    pub fn with_transformation(mut self, matrix: [f64; 16]) -> Self {
        self.georef = Georef::Transformation(matrix);
        self
    }

    pub fn without_georeference(mut self) -> Self {
        self.georef = Georef::None;
        self
    }

    pub fn pixel_is_point(mut self) -> Self {
        self.pixel_is_point = true;
        self
    }

    pub fn with_no_data(mut self, value: &str) -> Self {
        self.no_data = Some(value.to_string());
        self
    }

    /// Append a tiny second IFD, like an overview.
    pub fn with_extra_ifd(mut self) -> Self {
        self.extra_ifd = true;
        self
    }

    /// Build the complete file.
    pub fn build(&self) -> Vec<u8> {
        assert!(!self.bands.is_empty(), "GeoTiffBuilder needs at least one band");
        assert!(
            !(self.horizontal_predictor
                && matches!(self.sample, SampleKind::F32 | SampleKind::F64)),
            "horizontal predictor requires integer samples"
        );

        let mut file = Vec::new();
        if self.big_tiff {
            file.extend_from_slice(if self.big_endian { b"MM" } else { b"II" });
            self.put_u16(&mut file, 43);
            self.put_u16(&mut file, 8);
            self.put_u16(&mut file, 0);
            self.put_u64(&mut file, 0);
        } else {
            file.extend_from_slice(if self.big_endian { b"MM" } else { b"II" });
            self.put_u16(&mut file, 42);
            self.put_u32(&mut file, 0);
        }

        let mut offsets = Vec::new();
        let mut counts = Vec::new();
        for chunk in self.encode_chunks() {
            offsets.push(file.len() as u64);
            counts.push(chunk.len() as u64);
            file.extend_from_slice(&chunk);
        }
        if file.len() % 2 == 1 {
            file.push(0);
        }

        let fields = self.fields(&offsets, &counts);
        let ifd_at = file.len() as u64;
        let extra_at = ifd_at + self.ifd_size(&fields);
        let next = if self.extra_ifd { extra_at } else { 0 };
        let ifd = self.encode_ifd(&fields, ifd_at, next);
        file.extend_from_slice(&ifd);

        if self.extra_ifd {
            let overview = vec![self.field(256, SHORT, &[1])];
            let bytes = self.encode_ifd(&overview, extra_at, 0);
            file.extend_from_slice(&bytes);
        }

        // Patch the first IFD offset into the header.
        let mut pointer = Vec::new();
        if self.big_tiff {
            self.put_u64(&mut pointer, ifd_at);
            file[8..16].copy_from_slice(&pointer);
        } else {
            self.put_u32(&mut pointer, ifd_at as u32);
            file[4..8].copy_from_slice(&pointer);
        }
        file
    }

    fn put_u16(&self, out: &mut Vec<u8>, v: u16) {
        out.extend_from_slice(&if self.big_endian { v.to_be_bytes() } else { v.to_le_bytes() });
    }

    fn put_u32(&self, out: &mut Vec<u8>, v: u32) {
        out.extend_from_slice(&if self.big_endian { v.to_be_bytes() } else { v.to_le_bytes() });
    }

    fn put_u64(&self, out: &mut Vec<u8>, v: u64) {
        out.extend_from_slice(&if self.big_endian { v.to_be_bytes() } else { v.to_le_bytes() });
    }

    fn put_sample(&self, out: &mut Vec<u8>, v: f64) {
        match self.sample {
            SampleKind::U8 => out.push(v as u8),
            SampleKind::U16 => self.put_u16(out, v as u16),
            SampleKind::I16 => self.put_u16(out, v as i16 as u16),
            SampleKind::F32 => self.put_u32(out, (v as f32).to_bits()),
            SampleKind::F64 => self.put_u64(out, v.to_bits()),
        }
    }

    fn chunk_rects(&self) -> Vec<(usize, usize, usize, usize)> {
        match self.layout {
            Layout::Strips { rows_per_strip } => (0..self.height)
                .step_by(rows_per_strip)
                .map(|y0| (0, y0, self.width, rows_per_strip.min(self.height - y0)))
                .collect(),
            Layout::Tiles { width, height } => {
                let mut rects = Vec::new();
                for y0 in (0..self.height).step_by(height) {
                    for x0 in (0..self.width).step_by(width) {
                        rects.push((x0, y0, width, height));
                    }
                }
                rects
            }
        }
    }

    fn encode_chunks(&self) -> Vec<Vec<u8>> {
        let planes: Vec<Vec<usize>> = if self.planar {
            (0..self.bands.len()).map(|b| vec![b]).collect()
        } else {
            vec![(0..self.bands.len()).collect()]
        };

        let mut chunks = Vec::new();
        for bands in &planes {
            for (x0, y0, w, h) in self.chunk_rects() {
                let mut raw = Vec::new();
                for row in 0..h {
                    let mut row_bytes = Vec::new();
                    for col in 0..w {
                        let (x, y) = (x0 + col, y0 + row);
                        for &band in bands {
                            let value = if x < self.width && y < self.height {
                                self.bands[band][y * self.width + x]
                            } else {
                                0.0
                            };
                            self.put_sample(&mut row_bytes, value);
                        }
                    }
                    if self.horizontal_predictor {
                        self.difference_row(&mut row_bytes, bands.len());
                    }
                    raw.extend_from_slice(&row_bytes);
                }
                chunks.push(self.compress(&raw));
            }
        }
        chunks
    }

    fn difference_row(&self, row: &mut [u8], stride: usize) {
        let size = self.sample.size();
        let samples = row.len() / size;
        for i in (stride..samples).rev() {
            let (cur, prev) = (i * size, (i - stride) * size);
            if size == 1 {
                row[cur] = row[cur].wrapping_sub(row[prev]);
                continue;
            }
            let read = |b: &[u8]| {
                if self.big_endian {
                    u16::from_be_bytes([b[0], b[1]])
                } else {
                    u16::from_le_bytes([b[0], b[1]])
                }
            };
            let diff = read(&row[cur..]).wrapping_sub(read(&row[prev..]));
            let bytes = if self.big_endian { diff.to_be_bytes() } else { diff.to_le_bytes() };
            row[cur..cur + 2].copy_from_slice(&bytes);
        }
    }

    fn compress(&self, raw: &[u8]) -> Vec<u8> {
        match self.codec {
            Codec::None => raw.to_vec(),
            Codec::Deflate => {
                let mut encoder = ZlibEncoder::new(Vec::new(), flate2::Compression::default());
                encoder.write_all(raw).expect("in-memory write");
                encoder.finish().expect("in-memory deflate")
            }
            Codec::PackBits => packbits(raw),
        }
    }

    fn field(&self, tag: u16, field_type: u16, values: &[u64]) -> Field {
        let mut bytes = Vec::new();
        for &v in values {
            match field_type {
                SHORT => self.put_u16(&mut bytes, v as u16),
                LONG => self.put_u32(&mut bytes, v as u32),
                _ => self.put_u64(&mut bytes, v),
            }
        }
        Field {
            tag,
            field_type,
            count: values.len() as u64,
            bytes,
        }
    }

    fn doubles(&self, tag: u16, values: &[f64]) -> Field {
        let mut bytes = Vec::new();
        for v in values {
            self.put_u64(&mut bytes, v.to_bits());
        }
        Field {
            tag,
            field_type: DOUBLE,
            count: values.len() as u64,
            bytes,
        }
    }

    fn fields(&self, offsets: &[u64], counts: &[u64]) -> Vec<Field> {
        let n = self.bands.len();
        let offset_type = if self.big_tiff { LONG8 } else { LONG };
        let mut fields = vec![
            self.field(256, LONG, &[self.width as u64]),
            self.field(257, LONG, &[self.height as u64]),
            self.field(258, SHORT, &vec![self.sample.bits() as u64; n]),
            self.field(259, SHORT, &[self.codec.code() as u64]),
            self.field(262, SHORT, &[if n == 3 { 2 } else { 1 }]),
            self.field(277, SHORT, &[n as u64]),
            self.field(284, SHORT, &[if self.planar { 2 } else { 1 }]),
            self.field(339, SHORT, &vec![self.sample.format() as u64; n]),
        ];
        if self.horizontal_predictor {
            fields.push(self.field(317, SHORT, &[2]));
        }
        match self.layout {
            Layout::Strips { rows_per_strip } => {
                fields.push(self.field(273, offset_type, offsets));
                fields.push(self.field(278, LONG, &[rows_per_strip as u64]));
                fields.push(self.field(279, offset_type, counts));
            }
            Layout::Tiles { width, height } => {
                fields.push(self.field(322, LONG, &[width as u64]));
                fields.push(self.field(323, LONG, &[height as u64]));
                fields.push(self.field(324, offset_type, offsets));
                fields.push(self.field(325, offset_type, counts));
            }
        }

        let raster_type = if self.pixel_is_point { 2 } else { 1 };
        match self.georef {
            Georef::None => {}
            Georef::Geographic {
                west,
                north,
                pixel_width,
                pixel_height,
            } => {
                fields.push(self.doubles(33550, &[pixel_width, pixel_height, 0.0]));
                fields.push(self.doubles(33922, &[0.0, 0.0, 0.0, west, north, 0.0]));
                fields.push(self.field(
                    34735,
                    SHORT,
                    &[1, 1, 0, 3, 1024, 0, 1, 2, 1025, 0, 1, raster_type, 2048, 0, 1, 4326],
                ));
            }
            Georef::Projected {
                epsg,
                west,
                north,
                pixel_size,
            } => {
                fields.push(self.doubles(33550, &[pixel_size, pixel_size, 0.0]));
                fields.push(self.doubles(33922, &[0.0, 0.0, 0.0, west, north, 0.0]));
                fields.push(self.field(
                    34735,
                    SHORT,
                    &[
                        1, 1, 0, 3, 1024, 0, 1, 1, 1025, 0, 1, raster_type, 3072, 0, 1,
                        epsg as u64,
                    ],
                ));
            }
            Georef::Transformation(matrix) => {
                fields.push(self.doubles(34264, &matrix));
            }
        }

        if let Some(no_data) = &self.no_data {
            let mut bytes = no_data.as_bytes().to_vec();
            bytes.push(0);
            fields.push(Field {
                tag: 42113,
                field_type: ASCII,
                count: bytes.len() as u64,
                bytes,
            });
        }

        fields.sort_by_key(|f| f.tag);
        fields
    }

    fn slot_size(&self) -> usize {
        if self.big_tiff {
            8
        } else {
            4
        }
    }

    fn ifd_size(&self, fields: &[Field]) -> u64 {
        let (count, entry, next) = if self.big_tiff { (8, 20, 8) } else { (2, 12, 4) };
        let external: usize = fields
            .iter()
            .filter(|f| f.bytes.len() > self.slot_size())
            .map(|f| f.bytes.len() + f.bytes.len() % 2)
            .sum();
        (count + entry * fields.len() + next + external) as u64
    }

    fn encode_ifd(&self, fields: &[Field], at: u64, next: u64) -> Vec<u8> {
        let mut out = Vec::new();
        let mut external = Vec::new();
        let (header, entry) = if self.big_tiff { (8u64, 20u64) } else { (2u64, 12u64) };
        let next_size = if self.big_tiff { 8 } else { 4 };
        let external_at = at + header + entry * fields.len() as u64 + next_size;

        if self.big_tiff {
            self.put_u64(&mut out, fields.len() as u64);
        } else {
            self.put_u16(&mut out, fields.len() as u16);
        }
        for field in fields {
            self.put_u16(&mut out, field.tag);
            self.put_u16(&mut out, field.field_type);
            if self.big_tiff {
                self.put_u64(&mut out, field.count);
            } else {
                self.put_u32(&mut out, field.count as u32);
            }

            if field.bytes.len() <= self.slot_size() {
                let mut slot = field.bytes.clone();
                slot.resize(self.slot_size(), 0);
                out.extend_from_slice(&slot);
            } else {
                let offset = external_at + external.len() as u64;
                if self.big_tiff {
                    self.put_u64(&mut out, offset);
                } else {
                    self.put_u32(&mut out, offset as u32);
                }
                external.extend_from_slice(&field.bytes);
                if external.len() % 2 == 1 {
                    external.push(0);
                }
            }
        }
        if self.big_tiff {
            self.put_u64(&mut out, next);
        } else {
            self.put_u32(&mut out, next as u32);
        }
        out.extend_from_slice(&external);
        out
    }
}

/// PackBits encoder: runs of 2+ equal bytes become repeat runs.
fn packbits(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    let mut i = 0;
    while i < data.len() {
        let mut run = 1;
        while i + run < data.len() && data[i + run] == data[i] && run < 128 {
            run += 1;
        }
        if run >= 2 {
            out.push((1i16 - run as i16) as i8 as u8);
            out.push(data[i]);
            i += run;
            continue;
        }

        let start = i;
        while i < data.len()
            && i - start < 128
            && !(i + 1 < data.len() && data[i + 1] == data[i])
        {
            i += 1;
        }
        if i == start {
            // Next byte starts a run, emit it as a single literal
            i += 1;
        }
        out.push((i - start - 1) as u8);
        out.extend_from_slice(&data[start..i]);
    }
    out
}
