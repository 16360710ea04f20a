//! TIFF header parsing and bounds-checked byte access.
//!
//! Layout of the header:
//! - Bytes 0-1: byte order, `II` (little endian) or `MM` (big endian)
//! - Bytes 2-3: version, 42 for classic TIFF or 43 for BigTIFF
//! - Classic: bytes 4-7 hold the offset of the first IFD
//! - BigTIFF: bytes 4-5 offset size (8), bytes 6-7 zero, bytes 8-15 first IFD offset

use crate::{DecodeError, DecodeResult};

/// Byte order of every multi-byte value in the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    LittleEndian,
    BigEndian,
}

impl ByteOrder {
    pub fn u16(self, b: [u8; 2]) -> u16 {
        match self {
            ByteOrder::LittleEndian => u16::from_le_bytes(b),
            ByteOrder::BigEndian => u16::from_be_bytes(b),
        }
    }

    pub fn u32(self, b: [u8; 4]) -> u32 {
        match self {
            ByteOrder::LittleEndian => u32::from_le_bytes(b),
            ByteOrder::BigEndian => u32::from_be_bytes(b),
        }
    }

    pub fn u64(self, b: [u8; 8]) -> u64 {
        match self {
            ByteOrder::LittleEndian => u64::from_le_bytes(b),
            ByteOrder::BigEndian => u64::from_be_bytes(b),
        }
    }
}

/// Parsed file header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub byte_order: ByteOrder,
    pub big_tiff: bool,
    pub first_ifd_offset: u64,
}

/// Bounds-checked reads over the whole file.
#[derive(Debug, Clone, Copy)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    order: ByteOrder,
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8], order: ByteOrder) -> Self {
        Self { data, order }
    }

    pub fn order(&self) -> ByteOrder {
        self.order
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// `len` bytes starting at `offset`.
    pub fn bytes(&self, offset: u64, len: u64) -> DecodeResult<&'a [u8]> {
        let truncated = || DecodeError::Truncated {
            offset,
            needed: len,
            len: self.data.len() as u64,
        };
        let start = usize::try_from(offset).map_err(|_| truncated())?;
        let len_usize = usize::try_from(len).map_err(|_| truncated())?;
        let end = start.checked_add(len_usize).ok_or_else(truncated)?;
        self.data.get(start..end).ok_or_else(truncated)
    }

    fn array<const N: usize>(&self, offset: u64) -> DecodeResult<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.bytes(offset, N as u64)?);
        Ok(out)
    }

    pub fn u16_at(&self, offset: u64) -> DecodeResult<u16> {
        Ok(self.order.u16(self.array(offset)?))
    }

    pub fn u32_at(&self, offset: u64) -> DecodeResult<u32> {
        Ok(self.order.u32(self.array(offset)?))
    }

    pub fn u64_at(&self, offset: u64) -> DecodeResult<u64> {
        Ok(self.order.u64(self.array(offset)?))
    }
}

/// Parse the byte-order marker, version and first IFD offset.
pub fn parse_header(data: &[u8]) -> DecodeResult<Header> {
    if data.len() < 8 {
        return Err(DecodeError::Truncated {
            offset: 0,
            needed: 8,
            len: data.len() as u64,
        });
    }

    let byte_order = match [data[0], data[1]] {
        [b'I', b'I'] => ByteOrder::LittleEndian,
        [b'M', b'M'] => ByteOrder::BigEndian,
        other => return Err(DecodeError::InvalidByteOrder(other)),
    };
    let reader = ByteReader::new(data, byte_order);

    match reader.u16_at(2)? {
        42 => Ok(Header {
            byte_order,
            big_tiff: false,
            first_ifd_offset: reader.u32_at(4)? as u64,
        }),
        43 => {
            let offset_size = reader.u16_at(4)?;
            if offset_size != 8 {
                return Err(DecodeError::InvalidIfd(format!(
                    "BigTIFF offset size must be 8, got {}",
                    offset_size
                )));
            }
            Ok(Header {
                byte_order,
                big_tiff: true,
                first_ifd_offset: reader.u64_at(8)?,
            })
        }
        magic => Err(DecodeError::InvalidMagic(magic)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_little_endian_header() {
        let data = [b'I', b'I', 42, 0, 8, 0, 0, 0];
        let header = parse_header(&data).unwrap();
        assert_eq!(header.byte_order, ByteOrder::LittleEndian);
        assert!(!header.big_tiff);
        assert_eq!(header.first_ifd_offset, 8);
    }

    #[test]
    fn test_parse_big_endian_header() {
        let data = [b'M', b'M', 0, 42, 0, 0, 1, 0];
        let header = parse_header(&data).unwrap();
        assert_eq!(header.byte_order, ByteOrder::BigEndian);
        assert_eq!(header.first_ifd_offset, 256);
    }

    #[test]
    fn test_parse_bigtiff_header() {
        let data = [b'I', b'I', 43, 0, 8, 0, 0, 0, 16, 0, 0, 0, 0, 0, 0, 0];
        let header = parse_header(&data).unwrap();
        assert!(header.big_tiff);
        assert_eq!(header.first_ifd_offset, 16);
    }

    #[test]
    fn test_rejects_bad_marker_and_magic() {
        assert_eq!(
            parse_header(b"PK\x03\x04\x00\x00\x00\x00"),
            Err(DecodeError::InvalidByteOrder([b'P', b'K']))
        );
        assert_eq!(
            parse_header(&[b'I', b'I', 41, 0, 8, 0, 0, 0]),
            Err(DecodeError::InvalidMagic(41))
        );
    }

    #[test]
    fn test_reader_bounds() {
        let data = [1u8, 2, 3, 4];
        let reader = ByteReader::new(&data, ByteOrder::BigEndian);
        assert_eq!(reader.u16_at(2).unwrap(), 0x0304);
        assert!(matches!(
            reader.u32_at(2),
            Err(DecodeError::Truncated { offset: 2, needed: 4, .. })
        ));
        assert!(reader.bytes(u64::MAX, 2).is_err());
    }
}
