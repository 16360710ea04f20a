//! Pixel data layout and band assembly.
//!
//! Image data is split into chunks, either horizontal strips spanning the
//! full width or fixed-size tiles. With chunky configuration each chunk
//! holds every sample of a pixel side by side; with planar configuration
//! each band has its own run of chunks.

use tracing::debug;

use crate::header::ByteReader;
use crate::ifd::Ifd;
use crate::samples::{convert_samples, SampleType};
use crate::tags::{self, tag_name, Compression, PlanarConfiguration, Predictor};
use crate::unpacking::{decompress, undo_predictor};
use crate::{DecodeError, DecodeResult};

/// How the image is cut into chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Chunking {
    Strips { rows_per_strip: usize },
    Tiles { tile_width: usize, tile_height: usize },
}

/// Everything needed to turn the chunk bytes of one IFD into bands.
#[derive(Debug, Clone)]
pub struct ImageLayout {
    pub width: usize,
    pub height: usize,
    pub samples_per_pixel: usize,
    pub sample_type: SampleType,
    pub compression: Compression,
    pub predictor: Predictor,
    pub planar: PlanarConfiguration,
    pub chunking: Chunking,
    chunks_per_plane: usize,
    chunk_bytes: usize,
    offsets: Vec<u64>,
    byte_counts: Vec<u64>,
}

/// Upper bound on decoded samples per image or per chunk (1 GiB of `f32`).
pub const MAX_SAMPLES: usize = 1 << 28;

fn positive(tag: u16, value: u64) -> DecodeResult<usize> {
    if value == 0 {
        return Err(DecodeError::InvalidTag {
            tag: tag_name(tag),
            reason: "must be positive".to_string(),
        });
    }
    usize::try_from(value).map_err(|_| DecodeError::InvalidTag {
        tag: tag_name(tag),
        reason: format!("{} does not fit in memory", value),
    })
}

/// Product of `factors`, rejecting overflow and anything above [`MAX_SAMPLES`].
fn sample_count(factors: &[usize], what: &str) -> DecodeResult<usize> {
    let total = factors
        .iter()
        .try_fold(1usize, |acc, &f| acc.checked_mul(f))
        .ok_or_else(|| DecodeError::InvalidRaster(format!("{} size overflows", what)))?;
    if total > MAX_SAMPLES {
        return Err(DecodeError::InvalidRaster(format!(
            "{} holds {} samples, limit is {}",
            what, total, MAX_SAMPLES
        )));
    }
    Ok(total)
}

fn code_u16(tag: u16, value: u64) -> DecodeResult<u16> {
    u16::try_from(value).map_err(|_| DecodeError::InvalidTag {
        tag: tag_name(tag),
        reason: format!("value {} out of range", value),
    })
}

/// Per-sample tag values must agree across samples.
fn uniform(values: Vec<u64>, samples: usize, tag: u16) -> DecodeResult<u16> {
    let first = *values.first().ok_or(DecodeError::InvalidTag {
        tag: tag_name(tag),
        reason: "empty value".to_string(),
    })?;
    if values.len() != 1 && values.len() != samples {
        return Err(DecodeError::InvalidTag {
            tag: tag_name(tag),
            reason: format!("{} values for {} samples per pixel", values.len(), samples),
        });
    }
    if values.iter().any(|&v| v != first) {
        return Err(DecodeError::InvalidTag {
            tag: tag_name(tag),
            reason: format!("mixed values {:?} are not supported", values),
        });
    }
    u16::try_from(first).map_err(|_| DecodeError::InvalidTag {
        tag: tag_name(tag),
        reason: format!("value {} out of range", first),
    })
}

impl ImageLayout {
    pub fn from_ifd(ifd: &Ifd<'_>) -> DecodeResult<Self> {
        let width = positive(tags::IMAGE_WIDTH, ifd.required_u64(tags::IMAGE_WIDTH)?)?;
        let height = positive(tags::IMAGE_LENGTH, ifd.required_u64(tags::IMAGE_LENGTH)?)?;
        let samples_per_pixel = positive(
            tags::SAMPLES_PER_PIXEL,
            ifd.u64_value(tags::SAMPLES_PER_PIXEL)?.unwrap_or(1),
        )?;

        let bits = uniform(
            ifd.u64_list(tags::BITS_PER_SAMPLE)?.unwrap_or_else(|| vec![1]),
            samples_per_pixel,
            tags::BITS_PER_SAMPLE,
        )?;
        let format = uniform(
            ifd.u64_list(tags::SAMPLE_FORMAT)?.unwrap_or_else(|| vec![1]),
            samples_per_pixel,
            tags::SAMPLE_FORMAT,
        )?;
        let sample_type = SampleType::from_format(format, bits)?;

        let compression_code =
            code_u16(tags::COMPRESSION, ifd.u64_value(tags::COMPRESSION)?.unwrap_or(1))?;
        let compression = Compression::from_code(compression_code)
            .ok_or(DecodeError::UnsupportedCompression(compression_code))?;

        let predictor_code =
            code_u16(tags::PREDICTOR, ifd.u64_value(tags::PREDICTOR)?.unwrap_or(1))?;
        let predictor = Predictor::from_code(predictor_code)
            .ok_or(DecodeError::UnsupportedPredictor(predictor_code))?;

        let planar_code = code_u16(
            tags::PLANAR_CONFIGURATION,
            ifd.u64_value(tags::PLANAR_CONFIGURATION)?.unwrap_or(1),
        )?;
        let planar = PlanarConfiguration::from_code(planar_code).ok_or_else(|| {
            DecodeError::InvalidTag {
                tag: tag_name(tags::PLANAR_CONFIGURATION),
                reason: format!("unknown value {}", planar_code),
            }
        })?;

        let (chunking, offsets_tag, counts_tag) = if ifd.contains(tags::TILE_WIDTH) {
            let tile_width =
                positive(tags::TILE_WIDTH, ifd.required_u64(tags::TILE_WIDTH)?)?;
            let tile_height =
                positive(tags::TILE_LENGTH, ifd.required_u64(tags::TILE_LENGTH)?)?;
            (
                Chunking::Tiles {
                    tile_width,
                    tile_height,
                },
                tags::TILE_OFFSETS,
                tags::TILE_BYTE_COUNTS,
            )
        } else {
            let rows = ifd
                .u64_value(tags::ROWS_PER_STRIP)?
                .unwrap_or(height as u64)
                .min(height as u64);
            (
                Chunking::Strips {
                    rows_per_strip: positive(tags::ROWS_PER_STRIP, rows)?,
                },
                tags::STRIP_OFFSETS,
                tags::STRIP_BYTE_COUNTS,
            )
        };

        sample_count(&[width, height, samples_per_pixel], "image")?;
        let chunk_spp = match planar {
            PlanarConfiguration::Chunky => samples_per_pixel,
            PlanarConfiguration::Planar => 1,
        };
        let (chunk_w, chunk_h, chunks_per_plane) = match chunking {
            Chunking::Strips { rows_per_strip } => {
                (width, rows_per_strip, height.div_ceil(rows_per_strip))
            }
            Chunking::Tiles {
                tile_width,
                tile_height,
            } => {
                let across = width.div_ceil(tile_width);
                let down = height.div_ceil(tile_height);
                let grid = across
                    .checked_mul(down)
                    .ok_or_else(|| DecodeError::InvalidRaster("tile grid overflows".to_string()))?;
                (tile_width, tile_height, grid)
            }
        };
        let chunk_bytes = sample_count(&[chunk_w, chunk_h, chunk_spp], "chunk")?
            .checked_mul(sample_type.size())
            .ok_or_else(|| DecodeError::InvalidRaster("chunk size overflows".to_string()))?;

        let offsets = ifd
            .u64_list(offsets_tag)?
            .ok_or(DecodeError::MissingTag(tag_name(offsets_tag)))?;
        let byte_counts = ifd
            .u64_list(counts_tag)?
            .ok_or(DecodeError::MissingTag(tag_name(counts_tag)))?;

        let layout = Self {
            width,
            height,
            samples_per_pixel,
            sample_type,
            compression,
            predictor,
            planar,
            chunking,
            chunks_per_plane,
            chunk_bytes,
            offsets,
            byte_counts,
        };

        let expected = layout
            .chunks_per_plane
            .checked_mul(layout.planes())
            .ok_or_else(|| DecodeError::InvalidRaster("chunk count overflows".to_string()))?;
        if layout.offsets.len() != expected {
            return Err(DecodeError::InvalidTag {
                tag: tag_name(offsets_tag),
                reason: format!("expected {} chunks, found {}", expected, layout.offsets.len()),
            });
        }
        if layout.byte_counts.len() != expected {
            return Err(DecodeError::InvalidTag {
                tag: tag_name(counts_tag),
                reason: format!(
                    "expected {} chunks, found {}",
                    expected,
                    layout.byte_counts.len()
                ),
            });
        }

        Ok(layout)
    }

    fn planes(&self) -> usize {
        match self.planar {
            PlanarConfiguration::Chunky => 1,
            PlanarConfiguration::Planar => self.samples_per_pixel,
        }
    }

    fn samples_per_chunk_pixel(&self) -> usize {
        match self.planar {
            PlanarConfiguration::Chunky => self.samples_per_pixel,
            PlanarConfiguration::Planar => 1,
        }
    }

    pub fn chunks_per_plane(&self) -> usize {
        self.chunks_per_plane
    }

    /// Origin and stored size of a chunk, as `(x0, y0, width, height)`.
    ///
    /// Tiles always store their full size; the last strip stores only the
    /// rows that remain.
    fn chunk_rect(&self, chunk: usize) -> (usize, usize, usize, usize) {
        match self.chunking {
            Chunking::Strips { rows_per_strip } => {
                let y0 = chunk * rows_per_strip;
                (0, y0, self.width, rows_per_strip.min(self.height - y0))
            }
            Chunking::Tiles {
                tile_width,
                tile_height,
            } => {
                let across = self.width.div_ceil(tile_width);
                let (tx, ty) = (chunk % across, chunk / across);
                (tx * tile_width, ty * tile_height, tile_width, tile_height)
            }
        }
    }

    fn chunk_label(&self, index: usize) -> String {
        match self.chunking {
            Chunking::Strips { .. } => format!("strip {}", index),
            Chunking::Tiles { .. } => format!("tile {}", index),
        }
    }

    /// Decode every chunk into one row-major `f32` array per band.
    pub fn read_bands(&self, reader: &ByteReader<'_>) -> DecodeResult<Vec<Vec<f32>>> {
        let pixels = sample_count(&[self.width, self.height], "band")?;
        // Chunks absent from a sparse file keep this value.
        let fill = if self.sample_type.is_float() { f32::NAN } else { 0.0 };
        let mut bands = Vec::with_capacity(self.samples_per_pixel);
        for _ in 0..self.samples_per_pixel {
            let mut band = Vec::new();
            band.try_reserve_exact(pixels).map_err(|e| {
                DecodeError::InvalidRaster(format!("cannot allocate {} pixels: {}", pixels, e))
            })?;
            band.resize(pixels, fill);
            bands.push(band);
        }

        let order = reader.order();
        let size = self.sample_type.size();
        let chunk_spp = self.samples_per_chunk_pixel();
        let per_plane = self.chunks_per_plane;
        let mut row_values = Vec::new();

        for plane in 0..self.planes() {
            for chunk in 0..per_plane {
                let index = plane * per_plane + chunk;
                let (x0, y0, chunk_w, chunk_h) = self.chunk_rect(chunk);

                if self.byte_counts[index] == 0 {
                    debug!(chunk = index, "Skipping empty chunk");
                    continue;
                }
                let raw = reader.bytes(self.offsets[index], self.byte_counts[index])?;
                let expected = self.chunk_bytes;
                let mut buf = decompress(self.compression, raw, expected)?;
                if buf.len() < expected {
                    return Err(DecodeError::ByteCountMismatch {
                        chunk: self.chunk_label(index),
                        expected,
                        actual: buf.len(),
                    });
                }
                buf.truncate(expected);
                undo_predictor(
                    self.predictor,
                    &mut buf,
                    chunk_w,
                    chunk_spp,
                    self.sample_type,
                    order,
                )?;

                // Edge tiles extend past the image and are cropped here.
                let visible_w = chunk_w.min(self.width - x0);
                let visible_h = chunk_h.min(self.height.saturating_sub(y0));
                let row_bytes = chunk_w * chunk_spp * size;
                for row in 0..visible_h {
                    let start = row * row_bytes;
                    let row_buf = buf
                        .get(start..start + visible_w * chunk_spp * size)
                        .ok_or_else(|| DecodeError::ByteCountMismatch {
                            chunk: self.chunk_label(index),
                            expected,
                            actual: buf.len(),
                        })?;
                    row_values.clear();
                    convert_samples(row_buf, self.sample_type, order, &mut row_values);
                    let dst_row = (y0 + row) * self.width + x0;
                    for (i, value) in row_values.iter().enumerate() {
                        let (col, sample) = (i / chunk_spp, i % chunk_spp);
                        let band = match self.planar {
                            PlanarConfiguration::Chunky => sample,
                            PlanarConfiguration::Planar => plane,
                        };
                        bands[band][dst_row + col] = *value;
                    }
                }
            }
        }

        Ok(bands)
    }
}
