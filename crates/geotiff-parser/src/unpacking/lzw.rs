//! TIFF flavoured LZW.
//!
//! Codes are packed MSB-first. Code 256 resets the table and 257 ends the
//! stream. The code width grows one code early (at 511, 1023 and 2047)
//! and never exceeds 12 bits.

use crate::{DecodeError, DecodeResult};

const CLEAR_CODE: u16 = 256;
const EOI_CODE: u16 = 257;
const FIRST_CODE: usize = 258;
const MAX_CODES: usize = 4096;

struct MsbBitReader<'a> {
    data: &'a [u8],
    bit_pos: usize,
}

impl<'a> MsbBitReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, bit_pos: 0 }
    }

    fn read(&mut self, width: u32) -> Option<u16> {
        if self.bit_pos + width as usize > self.data.len() * 8 {
            return None;
        }
        let byte = self.bit_pos / 8;
        let shift = self.bit_pos % 8;
        // A 12-bit code spans at most three bytes.
        let mut window = 0u32;
        for i in 0..3 {
            window = (window << 8) | *self.data.get(byte + i).unwrap_or(&0) as u32;
        }
        let code = (window >> (24 - shift as u32 - width)) & ((1 << width) - 1);
        self.bit_pos += width as usize;
        Some(code as u16)
    }
}

fn code_width(next_code: usize) -> u32 {
    match next_code {
        0..=510 => 9,
        511..=1022 => 10,
        1023..=2046 => 11,
        _ => 12,
    }
}

/// Decode an LZW stream.
///
/// Table entries are stored as ranges into the output, since every
/// string in the table has already been emitted at least once. Decoding
/// stops once `expected_len` bytes are out.
pub fn decode_lzw(data: &[u8], expected_len: usize) -> DecodeResult<Vec<u8>> {
    let mut out: Vec<u8> = Vec::with_capacity(expected_len);
    let mut table: Vec<(usize, usize)> = Vec::with_capacity(MAX_CODES - FIRST_CODE);
    let mut bits = MsbBitReader::new(data);
    let mut width = 9;
    let mut prev: Option<(usize, usize)> = None;

    // A stream missing its EOI code ends at the last full code.
    while let Some(code) = bits.read(width) {
        if out.len() >= expected_len {
            break;
        }
        if code == CLEAR_CODE {
            table.clear();
            width = 9;
            prev = None;
            continue;
        }
        if code == EOI_CODE {
            break;
        }

        let start = out.len();
        let entry = if code < CLEAR_CODE {
            out.push(code as u8);
            (start, 1)
        } else {
            let index = code as usize - FIRST_CODE;
            if let Some(&(s, len)) = table.get(index) {
                out.extend_from_within(s..s + len);
                (start, len)
            } else if index == table.len() {
                // The code being defined right now: previous string plus its own first byte
                let (s, len) = prev.ok_or_else(|| {
                    DecodeError::Decompression(format!("lzw: code {} before any literal", code))
                })?;
                out.extend_from_within(s..s + len);
                out.push(out[s]);
                (start, len + 1)
            } else {
                return Err(DecodeError::Decompression(format!(
                    "lzw: code {} not in table of {} entries",
                    code,
                    FIRST_CODE + table.len()
                )));
            }
        };

        if let Some((s, len)) = prev {
            if FIRST_CODE + table.len() < MAX_CODES {
                table.push((s, len + 1));
            }
        }
        prev = Some(entry);
        width = code_width(FIRST_CODE + table.len());
    }

    out.truncate(expected_len);
    Ok(out)
}
