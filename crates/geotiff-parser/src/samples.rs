//! Sample type resolution and conversion to `f32`.

use num_traits::ToPrimitive;

use crate::header::ByteOrder;
use crate::{DecodeError, DecodeResult};

/// SampleFormat values (tag 339)
pub const SAMPLE_FORMAT_UINT: u16 = 1;
pub const SAMPLE_FORMAT_INT: u16 = 2;
pub const SAMPLE_FORMAT_IEEEFP: u16 = 3;

/// Numeric representation of a single stored sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleType {
    U8,
    U16,
    U32,
    I8,
    I16,
    I32,
    F32,
    F64,
}

impl SampleType {
    /// Resolve a (SampleFormat, BitsPerSample) pair.
    pub fn from_format(format: u16, bits: u16) -> DecodeResult<Self> {
        match (format, bits) {
            (SAMPLE_FORMAT_UINT, 8) => Ok(SampleType::U8),
            (SAMPLE_FORMAT_UINT, 16) => Ok(SampleType::U16),
            (SAMPLE_FORMAT_UINT, 32) => Ok(SampleType::U32),
            (SAMPLE_FORMAT_INT, 8) => Ok(SampleType::I8),
            (SAMPLE_FORMAT_INT, 16) => Ok(SampleType::I16),
            (SAMPLE_FORMAT_INT, 32) => Ok(SampleType::I32),
            (SAMPLE_FORMAT_IEEEFP, 32) => Ok(SampleType::F32),
            (SAMPLE_FORMAT_IEEEFP, 64) => Ok(SampleType::F64),
            _ => Err(DecodeError::UnsupportedSampleFormat { format, bits }),
        }
    }

    /// Bytes per sample.
    pub fn size(self) -> usize {
        match self {
            SampleType::U8 | SampleType::I8 => 1,
            SampleType::U16 | SampleType::I16 => 2,
            SampleType::U32 | SampleType::I32 | SampleType::F32 => 4,
            SampleType::F64 => 8,
        }
    }

    pub fn is_float(self) -> bool {
        matches!(self, SampleType::F32 | SampleType::F64)
    }

    /// Convert one sample stored in `order` to `f32`.
    ///
    /// `bytes` must be exactly `self.size()` long.
    pub fn read(self, bytes: &[u8], order: ByteOrder) -> f32 {
        let b2 = || [bytes[0], bytes[1]];
        let b4 = || [bytes[0], bytes[1], bytes[2], bytes[3]];
        match self {
            SampleType::U8 => to_f32(bytes[0]),
            SampleType::I8 => to_f32(bytes[0] as i8),
            SampleType::U16 => to_f32(order.u16(b2())),
            SampleType::I16 => to_f32(order.u16(b2()) as i16),
            SampleType::U32 => to_f32(order.u32(b4())),
            SampleType::I32 => to_f32(order.u32(b4()) as i32),
            SampleType::F32 => f32::from_bits(order.u32(b4())),
            SampleType::F64 => {
                let mut b = [0u8; 8];
                b.copy_from_slice(&bytes[..8]);
                to_f32(f64::from_bits(order.u64(b)))
            }
        }
    }
}

fn to_f32<T: ToPrimitive>(value: T) -> f32 {
    value.to_f32().unwrap_or(f32::NAN)
}

/// Convert a run of packed samples to `f32`, appending to `out`.
pub fn convert_samples(
    bytes: &[u8],
    sample_type: SampleType,
    order: ByteOrder,
    out: &mut Vec<f32>,
) {
    out.extend(
        bytes
            .chunks_exact(sample_type.size())
            .map(|chunk| sample_type.read(chunk, order)),
    );
}
