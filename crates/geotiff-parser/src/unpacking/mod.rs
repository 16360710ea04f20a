//! Chunk decompression and predictor reversal.
//!
//! Supported compression schemes:
//! - None (1)
//! - LZW (5), MSB-first with early code-width change
//! - Deflate (8 and the legacy 32946)
//! - PackBits (32773)

mod lzw;
mod packbits;
mod predictor;

use std::io::Read;

use flate2::read::ZlibDecoder;

use crate::tags::Compression;
use crate::{DecodeError, DecodeResult};

pub use lzw::decode_lzw;
pub use packbits::decode_packbits;
pub use predictor::undo_predictor;

/// Decompress one strip or tile.
///
/// Output stops at `expected_len` bytes; callers reject anything shorter.
pub fn decompress(
    compression: Compression,
    data: &[u8],
    expected_len: usize,
) -> DecodeResult<Vec<u8>> {
    match compression {
        Compression::None => Ok(data[..data.len().min(expected_len)].to_vec()),
        Compression::Lzw => decode_lzw(data, expected_len),
        Compression::PackBits => decode_packbits(data, expected_len),
        Compression::Deflate => {
            let mut out = Vec::with_capacity(expected_len);
            ZlibDecoder::new(data)
                .take(expected_len as u64)
                .read_to_end(&mut out)
                .map_err(|e| DecodeError::Decompression(format!("deflate: {}", e)))?;
            Ok(out)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::ZlibEncoder;
    use std::io::Write;

    #[test]
    fn test_deflate_chunk() {
        let raw: Vec<u8> = (0..=255u8).cycle().take(1000).collect();
        let mut encoder = ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(&raw).unwrap();
        let packed = encoder.finish().unwrap();

        assert_eq!(decompress(Compression::Deflate, &packed, raw.len()).unwrap(), raw);
    }

    #[test]
    fn test_corrupt_deflate() {
        let result = decompress(Compression::Deflate, &[0x78, 0x9c, 0xff, 0xff], 16);
        assert!(matches!(result, Err(DecodeError::Decompression(_))));
    }

    #[test]
    fn test_deflate_output_is_bounded() {
        // 1 MiB of zeros compresses to about a kilobyte.
        let mut encoder = ZlibEncoder::new(Vec::new(), flate2::Compression::best());
        encoder.write_all(&vec![0u8; 1 << 20]).unwrap();
        let packed = encoder.finish().unwrap();

        let out = decompress(Compression::Deflate, &packed, 64).unwrap();
        assert_eq!(out.len(), 64);
    }

    #[test]
    fn test_uncompressed_passthrough() {
        assert_eq!(
            decompress(Compression::None, &[1, 2, 3], 3).unwrap(),
            vec![1, 2, 3]
        );
    }
}
