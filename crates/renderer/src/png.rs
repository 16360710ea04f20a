//! PNG encoding for RGBA bitmaps.
//!
//! Supports two encoding modes:
//! - **Indexed PNG (color type 3)**: used when the image has ≤256 unique
//!   colors, which is always the case for binary and masked layers.
//! - **RGBA PNG (color type 6)**: fallback for continuous gradients and
//!   aerial imagery with more colors.

use rayon::prelude::*;
use std::collections::HashMap;
use std::io::Write;

use crate::error::{RenderError, RenderResult};

/// Maximum colors for indexed PNG (PNG8)
const MAX_PALETTE_SIZE: usize = 256;

/// Minimum pixels to benefit from parallel palette extraction
const PARALLEL_THRESHOLD: usize = 4096;

const SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

/// Encode RGBA pixels, choosing indexed output when the colors fit.
pub fn create_png_auto(pixels: &[u8], width: usize, height: usize) -> RenderResult<Vec<u8>> {
    let palette = if pixels.len() / 4 >= PARALLEL_THRESHOLD {
        extract_palette_parallel(pixels)
    } else {
        extract_palette_sequential(pixels)
    };

    match palette {
        Some((palette, indices)) => create_png_indexed(width, height, &palette, &indices),
        None => create_png(pixels, width, height),
    }
}

#[inline(always)]
fn pack_color(px: &[u8]) -> u32 {
    u32::from_le_bytes([px[0], px[1], px[2], px[3]])
}

/// Unique colors in first-seen order plus one index per pixel, or `None`
/// when there are more than 256 colors.
fn extract_palette_sequential(pixels: &[u8]) -> Option<(Vec<[u8; 4]>, Vec<u8>)> {
    let mut lookup: HashMap<u32, u8> = HashMap::with_capacity(MAX_PALETTE_SIZE);
    let mut palette: Vec<[u8; 4]> = Vec::with_capacity(MAX_PALETTE_SIZE);
    let mut indices = Vec::with_capacity(pixels.len() / 4);

    for px in pixels.chunks_exact(4) {
        let packed = pack_color(px);
        let index = match lookup.get(&packed) {
            Some(&idx) => idx,
            None => {
                if palette.len() >= MAX_PALETTE_SIZE {
                    return None;
                }
                let idx = palette.len() as u8;
                palette.push([px[0], px[1], px[2], px[3]]);
                lookup.insert(packed, idx);
                idx
            }
        };
        indices.push(index);
    }

    Some((palette, indices))
}

/// Parallel variant: gather unique colors per chunk, merge, then map
/// pixels to indices in parallel.
fn extract_palette_parallel(pixels: &[u8]) -> Option<(Vec<[u8; 4]>, Vec<u8>)> {
    let chunk_pixels = (pixels.len() / 4 / rayon::current_num_threads()).max(256);

    let unique: Vec<u32> = pixels
        .par_chunks(chunk_pixels * 4)
        .flat_map_iter(|chunk| {
            let mut local: HashMap<u32, ()> = HashMap::with_capacity(MAX_PALETTE_SIZE);
            for px in chunk.chunks_exact(4) {
                local.insert(pack_color(px), ());
                if local.len() > MAX_PALETTE_SIZE {
                    break;
                }
            }
            local.into_keys()
        })
        .collect();

    let mut lookup: HashMap<u32, u8> = HashMap::with_capacity(MAX_PALETTE_SIZE);
    let mut palette = Vec::with_capacity(MAX_PALETTE_SIZE);
    for packed in unique {
        if lookup.contains_key(&packed) {
            continue;
        }
        if palette.len() >= MAX_PALETTE_SIZE {
            return None;
        }
        lookup.insert(packed, palette.len() as u8);
        palette.push(packed.to_le_bytes());
    }

    let indices = pixels
        .par_chunks_exact(4)
        .map(|px| lookup.get(&pack_color(px)).copied().unwrap_or(0))
        .collect();

    Some((palette, indices))
}

/// Indexed PNG (color type 3) with a tRNS chunk when any entry is translucent.
pub fn create_png_indexed(
    width: usize,
    height: usize,
    palette: &[[u8; 4]],
    indices: &[u8],
) -> RenderResult<Vec<u8>> {
    let mut png = SIGNATURE.to_vec();
    write_chunk(&mut png, b"IHDR", &ihdr(width, height, 3));

    let plte: Vec<u8> = palette.iter().flat_map(|c| [c[0], c[1], c[2]]).collect();
    write_chunk(&mut png, b"PLTE", &plte);

    if palette.iter().any(|c| c[3] < 255) {
        let trns: Vec<u8> = palette.iter().map(|c| c[3]).collect();
        write_chunk(&mut png, b"tRNS", &trns);
    }

    write_chunk(&mut png, b"IDAT", &deflate_scanlines(indices, width, height)?);
    write_chunk(&mut png, b"IEND", &[]);
    Ok(png)
}

/// Truecolor PNG with alpha (color type 6).
pub fn create_png(pixels: &[u8], width: usize, height: usize) -> RenderResult<Vec<u8>> {
    let mut png = SIGNATURE.to_vec();
    write_chunk(&mut png, b"IHDR", &ihdr(width, height, 6));
    write_chunk(&mut png, b"IDAT", &deflate_scanlines(pixels, width * 4, height)?);
    write_chunk(&mut png, b"IEND", &[]);
    Ok(png)
}

fn ihdr(width: usize, height: usize, color_type: u8) -> Vec<u8> {
    let mut data = Vec::with_capacity(13);
    data.extend_from_slice(&(width as u32).to_be_bytes());
    data.extend_from_slice(&(height as u32).to_be_bytes());
    // bit depth, color type, compression, filter, interlace
    data.extend_from_slice(&[8, color_type, 0, 0, 0]);
    data
}

/// Length, type, data, CRC over type + data.
fn write_chunk(png: &mut Vec<u8>, chunk_type: &[u8; 4], data: &[u8]) {
    png.extend_from_slice(&(data.len() as u32).to_be_bytes());
    png.extend_from_slice(chunk_type);
    png.extend_from_slice(data);

    let mut hasher = crc32fast::Hasher::new();
    hasher.update(chunk_type);
    hasher.update(data);
    png.extend_from_slice(&hasher.finalize().to_be_bytes());
}

/// Prefix every scanline with filter type 0 and zlib-compress.
fn deflate_scanlines(data: &[u8], row_bytes: usize, height: usize) -> RenderResult<Vec<u8>> {
    if data.len() < row_bytes * height {
        return Err(RenderError::Encode(format!(
            "{} bytes of image data for {} rows of {} bytes",
            data.len(),
            height,
            row_bytes
        )));
    }
    let mut raw = Vec::with_capacity(height * (row_bytes + 1));
    for row in data.chunks_exact(row_bytes.max(1)).take(height) {
        raw.push(0);
        raw.extend_from_slice(row);
    }

    let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::fast());
    encoder
        .write_all(&raw)
        .map_err(|e| RenderError::Encode(format!("IDAT compression failed: {}", e)))?;
    encoder
        .finish()
        .map_err(|e| RenderError::Encode(format!("IDAT compression failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_palette_simple() {
        let pixels = [
            255, 0, 0, 255, // red
            0, 255, 0, 255, // green
            0, 0, 0, 0, // transparent
            255, 0, 0, 255, // red again
        ];
        let (palette, indices) = extract_palette_sequential(&pixels).unwrap();
        assert_eq!(palette.len(), 3);
        assert_eq!(indices, vec![0, 1, 2, 0]);
    }

    #[test]
    fn test_extract_palette_parallel_matches_colors() {
        // 128x128 with two colors, above PARALLEL_THRESHOLD
        let pixels: Vec<u8> = (0..128 * 128)
            .flat_map(|i| if i % 3 == 0 { [33, 33, 33, 255] } else { [0, 0, 0, 0] })
            .collect();
        let (palette, indices) = extract_palette_parallel(&pixels).unwrap();
        assert_eq!(palette.len(), 2);
        assert_eq!(indices.len(), 128 * 128);
        for (i, idx) in indices.iter().enumerate() {
            let px = &pixels[i * 4..i * 4 + 4];
            assert_eq!(palette[*idx as usize], [px[0], px[1], px[2], px[3]]);
        }
    }

    #[test]
    fn test_too_many_colors_falls_back_to_rgba() {
        let pixels: Vec<u8> = (0..300u32)
            .flat_map(|i| [(i % 256) as u8, (i / 256) as u8, 7, 255])
            .collect();
        assert!(extract_palette_sequential(&pixels).is_none());

        let png = create_png_auto(&pixels, 300, 1).unwrap();
        // Color type byte of IHDR
        assert_eq!(png[25], 6);
    }

    #[test]
    fn test_indexed_png_structure() {
        let pixels = [0, 0, 0, 0, 255, 202, 40, 255];
        let png = create_png_auto(&pixels, 2, 1).unwrap();
        assert_eq!(&png[..8], &SIGNATURE);
        assert_eq!(&png[12..16], b"IHDR");
        assert_eq!(png[25], 3);
        // PLTE follows IHDR (8 + 25 bytes), then tRNS for the transparent entry
        assert_eq!(&png[37..41], b"PLTE");
        assert!(png.windows(4).any(|w| w == b"tRNS"));
        assert_eq!(&png[png.len() - 8..png.len() - 4], b"IEND");
    }

    #[test]
    fn test_short_buffer_is_error() {
        assert!(matches!(
            create_png(&[0u8; 8], 4, 4),
            Err(RenderError::Encode(_))
        ));
    }
}
