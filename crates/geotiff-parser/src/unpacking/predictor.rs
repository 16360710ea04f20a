//! Reversal of the horizontal (2) and floating point (3) predictors.
//!
//! Both operate row by row within a decompressed chunk. `samples_per_pixel`
//! is the number of interleaved samples in the chunk, which is 1 for
//! planar chunks.

use crate::header::ByteOrder;
use crate::samples::SampleType;
use crate::tags::Predictor;
use crate::{DecodeError, DecodeResult};

pub fn undo_predictor(
    predictor: Predictor,
    data: &mut [u8],
    row_pixels: usize,
    samples_per_pixel: usize,
    sample_type: SampleType,
    order: ByteOrder,
) -> DecodeResult<()> {
    let row_bytes = row_pixels * samples_per_pixel * sample_type.size();
    if row_bytes == 0 {
        return Ok(());
    }
    match predictor {
        Predictor::None => Ok(()),
        Predictor::Horizontal => {
            if sample_type.is_float() {
                return Err(DecodeError::UnsupportedPredictor(2));
            }
            for row in data.chunks_exact_mut(row_bytes) {
                horizontal_row(row, samples_per_pixel, sample_type.size(), order);
            }
            Ok(())
        }
        Predictor::FloatingPoint => {
            if !sample_type.is_float() {
                return Err(DecodeError::UnsupportedPredictor(3));
            }
            let mut scratch = vec![0u8; row_bytes];
            for row in data.chunks_exact_mut(row_bytes) {
                floating_point_row(row, &mut scratch, samples_per_pixel, sample_type.size(), order);
            }
            Ok(())
        }
    }
}

/// Cumulative wrapping sum of each sample with the one `stride` samples back.
fn horizontal_row(row: &mut [u8], stride: usize, size: usize, order: ByteOrder) {
    let samples = row.len() / size;
    for i in stride..samples {
        let (cur, prev) = (i * size, (i - stride) * size);
        match size {
            1 => row[cur] = row[cur].wrapping_add(row[prev]),
            2 => {
                let a = order.u16([row[prev], row[prev + 1]]);
                let b = order.u16([row[cur], row[cur + 1]]);
                let sum = b.wrapping_add(a);
                let bytes = match order {
                    ByteOrder::LittleEndian => sum.to_le_bytes(),
                    ByteOrder::BigEndian => sum.to_be_bytes(),
                };
                row[cur..cur + 2].copy_from_slice(&bytes);
            }
            _ => {
                let a = order.u32([row[prev], row[prev + 1], row[prev + 2], row[prev + 3]]);
                let b = order.u32([row[cur], row[cur + 1], row[cur + 2], row[cur + 3]]);
                let sum = b.wrapping_add(a);
                let bytes = match order {
                    ByteOrder::LittleEndian => sum.to_le_bytes(),
                    ByteOrder::BigEndian => sum.to_be_bytes(),
                };
                row[cur..cur + 4].copy_from_slice(&bytes);
            }
        }
    }
}

/// Undo byte differencing, then regroup the most-significant-first byte
/// planes into samples stored in the file's byte order.
fn floating_point_row(
    row: &mut [u8],
    scratch: &mut [u8],
    stride: usize,
    size: usize,
    order: ByteOrder,
) {
    for i in stride..row.len() {
        row[i] = row[i].wrapping_add(row[i - stride]);
    }
    scratch.copy_from_slice(row);

    let samples = row.len() / size;
    for sample in 0..samples {
        for plane in 0..size {
            let byte = scratch[plane * samples + sample];
            let at = match order {
                ByteOrder::BigEndian => plane,
                ByteOrder::LittleEndian => size - 1 - plane,
            };
            row[sample * size + at] = byte;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_horizontal_u8_rgb() {
        // Two RGB pixels per row, second pixel stored as a delta
        let mut data = vec![10, 20, 30, 1, 2, 3];
        undo_predictor(
            Predictor::Horizontal,
            &mut data,
            2,
            3,
            SampleType::U8,
            ByteOrder::LittleEndian,
        )
        .unwrap();
        assert_eq!(data, vec![10, 20, 30, 11, 22, 33]);
    }

    #[test]
    fn test_horizontal_u16_wraps() {
        let mut data: Vec<u8> = [65535u16, 2, 3].iter().flat_map(|v| v.to_be_bytes()).collect();
        undo_predictor(
            Predictor::Horizontal,
            &mut data,
            3,
            1,
            SampleType::U16,
            ByteOrder::BigEndian,
        )
        .unwrap();
        let values: Vec<u16> = data
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        assert_eq!(values, vec![65535, 1, 4]);
    }

    #[test]
    fn test_floating_point_row() {
        let values = [1.5f32, -2.25, 100.0];
        // Encode: split into MSB-first byte planes, then byte-difference
        let n = values.len();
        let mut planes = vec![0u8; n * 4];
        for (i, v) in values.iter().enumerate() {
            for (p, b) in v.to_be_bytes().iter().enumerate() {
                planes[p * n + i] = *b;
            }
        }
        let mut encoded = planes.clone();
        for i in (1..encoded.len()).rev() {
            encoded[i] = planes[i].wrapping_sub(planes[i - 1]);
        }

        undo_predictor(
            Predictor::FloatingPoint,
            &mut encoded,
            n,
            1,
            SampleType::F32,
            ByteOrder::LittleEndian,
        )
        .unwrap();
        let decoded: Vec<f32> = encoded
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect();
        assert_eq!(decoded, values);
    }

    #[test]
    fn test_predictor_type_mismatch() {
        let mut data = vec![0u8; 8];
        assert_eq!(
            undo_predictor(
                Predictor::FloatingPoint,
                &mut data,
                8,
                1,
                SampleType::U8,
                ByteOrder::LittleEndian
            ),
            Err(DecodeError::UnsupportedPredictor(3))
        );
    }
}
