//! PackBits run-length decoding.

use crate::{DecodeError, DecodeResult};

/// Decode a PackBits stream.
///
/// Header byte `n`: 0..=127 copies the next `n + 1` bytes, -127..=-1
/// repeats the next byte `1 - n` times, -128 is a no-op.
pub fn decode_packbits(data: &[u8], expected_len: usize) -> DecodeResult<Vec<u8>> {
    let mut out = Vec::with_capacity(expected_len);
    let mut pos = 0;

    while pos < data.len() && out.len() < expected_len {
        let n = data[pos] as i8;
        pos += 1;
        match n {
            0..=127 => {
                let len = n as usize + 1;
                let literal = data.get(pos..pos + len).ok_or_else(|| {
                    DecodeError::Decompression(format!(
                        "packbits: literal run of {} bytes at offset {} overruns input",
                        len, pos
                    ))
                })?;
                out.extend_from_slice(literal);
                pos += len;
            }
            -128 => {}
            _ => {
                let byte = *data.get(pos).ok_or_else(|| {
                    DecodeError::Decompression("packbits: repeat run missing its byte".to_string())
                })?;
                let count = 1 - n as isize;
                out.extend(std::iter::repeat(byte).take(count as usize));
                pos += 1;
            }
        }
    }

    out.truncate(expected_len);
    Ok(out)
}
