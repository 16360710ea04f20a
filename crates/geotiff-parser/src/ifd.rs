//! Image File Directory parsing.
//!
//! An IFD is a count followed by fixed-size entries and the offset of the
//! next IFD (0 terminates the chain). Each entry holds a tag, a field
//! type, a value count and either the value itself (when it fits in the
//! entry's value slot) or the offset of the value.

use std::collections::{BTreeMap, HashSet};

use tracing::debug;

use crate::header::{ByteOrder, ByteReader, Header};
use crate::tags::tag_name;
use crate::{DecodeError, DecodeResult};

/// Upper bound on the IFD chain length, guards against hostile files.
const MAX_IFDS: usize = 4096;

/// TIFF field types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Byte,
    Ascii,
    Short,
    Long,
    Rational,
    SByte,
    Undefined,
    SShort,
    SLong,
    SRational,
    Float,
    Double,
    Ifd,
    Long8,
    SLong8,
    Ifd8,
}

impl FieldType {
    pub fn from_code(code: u16) -> Option<Self> {
        Some(match code {
            1 => FieldType::Byte,
            2 => FieldType::Ascii,
            3 => FieldType::Short,
            4 => FieldType::Long,
            5 => FieldType::Rational,
            6 => FieldType::SByte,
            7 => FieldType::Undefined,
            8 => FieldType::SShort,
            9 => FieldType::SLong,
            10 => FieldType::SRational,
            11 => FieldType::Float,
            12 => FieldType::Double,
            13 => FieldType::Ifd,
            16 => FieldType::Long8,
            17 => FieldType::SLong8,
            18 => FieldType::Ifd8,
            _ => return None,
        })
    }

    /// Size in bytes of a single value.
    pub fn size(self) -> u64 {
        match self {
            FieldType::Byte | FieldType::Ascii | FieldType::SByte | FieldType::Undefined => 1,
            FieldType::Short | FieldType::SShort => 2,
            FieldType::Long | FieldType::SLong | FieldType::Float | FieldType::Ifd => 4,
            FieldType::Rational
            | FieldType::SRational
            | FieldType::Double
            | FieldType::Long8
            | FieldType::SLong8
            | FieldType::Ifd8 => 8,
        }
    }

    fn is_unsigned_integer(self) -> bool {
        matches!(
            self,
            FieldType::Byte
                | FieldType::Short
                | FieldType::Long
                | FieldType::Long8
                | FieldType::Ifd
                | FieldType::Ifd8
                | FieldType::Undefined
        )
    }
}

/// A single directory entry with its value bytes resolved.
#[derive(Debug, Clone)]
pub struct Entry<'a> {
    pub tag: u16,
    pub field_type: FieldType,
    pub count: u64,
    /// Exactly `count * field_type.size()` bytes
    pub value: &'a [u8],
}

/// One parsed directory.
#[derive(Debug, Clone)]
pub struct Ifd<'a> {
    order: ByteOrder,
    entries: BTreeMap<u16, Entry<'a>>,
    /// Offset of this IFD within the file
    pub offset: u64,
}

impl<'a> Ifd<'a> {
    pub fn get(&self, tag: u16) -> Option<&Entry<'a>> {
        self.entries.get(&tag)
    }

    pub fn contains(&self, tag: u16) -> bool {
        self.entries.contains_key(&tag)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All values of an unsigned integer tag.
    pub fn u64_list(&self, tag: u16) -> DecodeResult<Option<Vec<u64>>> {
        let Some(entry) = self.get(tag) else {
            return Ok(None);
        };
        if !entry.field_type.is_unsigned_integer() {
            return Err(DecodeError::InvalidTag {
                tag: tag_name(tag),
                reason: format!("expected unsigned integer, found {:?}", entry.field_type),
            });
        }
        let size = entry.field_type.size() as usize;
        let order = self.order;
        let values = entry
            .value
            .chunks_exact(size)
            .map(|c| match size {
                1 => c[0] as u64,
                2 => order.u16([c[0], c[1]]) as u64,
                4 => order.u32([c[0], c[1], c[2], c[3]]) as u64,
                _ => order.u64([c[0], c[1], c[2], c[3], c[4], c[5], c[6], c[7]]),
            })
            .collect();
        Ok(Some(values))
    }

    /// First value of an unsigned integer tag.
    pub fn u64_value(&self, tag: u16) -> DecodeResult<Option<u64>> {
        match self.u64_list(tag)? {
            Some(values) => values.first().copied().map(Some).ok_or(DecodeError::InvalidTag {
                tag: tag_name(tag),
                reason: "empty value".to_string(),
            }),
            None => Ok(None),
        }
    }

    /// First value of an unsigned integer tag that must be present.
    pub fn required_u64(&self, tag: u16) -> DecodeResult<u64> {
        self.u64_value(tag)?
            .ok_or(DecodeError::MissingTag(tag_name(tag)))
    }

    /// All values of a numeric tag converted to `f64`.
    pub fn f64_list(&self, tag: u16) -> DecodeResult<Option<Vec<f64>>> {
        let Some(entry) = self.get(tag) else {
            return Ok(None);
        };
        let order = self.order;
        let u32_at = |c: &[u8], i: usize| order.u32([c[i], c[i + 1], c[i + 2], c[i + 3]]);
        let u64_at = |c: &[u8]| order.u64([c[0], c[1], c[2], c[3], c[4], c[5], c[6], c[7]]);

        let size = entry.field_type.size() as usize;
        let values = entry
            .value
            .chunks_exact(size)
            .map(|c| match entry.field_type {
                FieldType::Byte | FieldType::Undefined => Ok(c[0] as f64),
                FieldType::SByte => Ok(c[0] as i8 as f64),
                FieldType::Short => Ok(order.u16([c[0], c[1]]) as f64),
                FieldType::SShort => Ok(order.u16([c[0], c[1]]) as i16 as f64),
                FieldType::Long | FieldType::Ifd => Ok(u32_at(c, 0) as f64),
                FieldType::SLong => Ok(u32_at(c, 0) as i32 as f64),
                FieldType::Long8 | FieldType::Ifd8 => Ok(u64_at(c) as f64),
                FieldType::SLong8 => Ok(u64_at(c) as i64 as f64),
                FieldType::Float => Ok(f32::from_bits(u32_at(c, 0)) as f64),
                FieldType::Double => Ok(f64::from_bits(u64_at(c))),
                FieldType::Rational => Ok(u32_at(c, 0) as f64 / u32_at(c, 4) as f64),
                FieldType::SRational => {
                    Ok(u32_at(c, 0) as i32 as f64 / u32_at(c, 4) as i32 as f64)
                }
                FieldType::Ascii => Err(DecodeError::InvalidTag {
                    tag: tag_name(tag),
                    reason: "expected numeric value, found ASCII".to_string(),
                }),
            })
            .collect::<DecodeResult<Vec<f64>>>()?;
        Ok(Some(values))
    }

    /// ASCII tag value with the trailing NUL(s) removed.
    pub fn ascii(&self, tag: u16) -> DecodeResult<Option<String>> {
        let Some(entry) = self.get(tag) else {
            return Ok(None);
        };
        if entry.field_type != FieldType::Ascii {
            return Err(DecodeError::InvalidTag {
                tag: tag_name(tag),
                reason: format!("expected ASCII, found {:?}", entry.field_type),
            });
        }
        let text = String::from_utf8_lossy(entry.value);
        Ok(Some(text.trim_end_matches('\0').to_string()))
    }
}

/// Parse the IFD at `offset`, returning it and the offset of the next one.
pub fn parse_ifd<'a>(
    reader: &ByteReader<'a>,
    offset: u64,
    big_tiff: bool,
) -> DecodeResult<(Ifd<'a>, u64)> {
    let (count, entries_start, entry_size, slot_size) = if big_tiff {
        (reader.u64_at(offset)?, offset + 8, 20u64, 8u64)
    } else {
        (reader.u16_at(offset)? as u64, offset + 2, 12u64, 4u64)
    };
    if count == 0 {
        return Err(DecodeError::InvalidIfd(format!(
            "IFD at offset {} has no entries",
            offset
        )));
    }

    let table_len = count
        .checked_mul(entry_size)
        .ok_or_else(|| DecodeError::InvalidIfd(format!("entry count {} overflows", count)))?;
    // Reading the whole table up front fails fast on a truncated directory.
    reader.bytes(entries_start, table_len)?;

    let mut entries = BTreeMap::new();
    for i in 0..count {
        let at = entries_start + i * entry_size;
        let tag = reader.u16_at(at)?;
        let type_code = reader.u16_at(at + 2)?;
        let (value_count, slot) = if big_tiff {
            (reader.u64_at(at + 4)?, at + 12)
        } else {
            (reader.u32_at(at + 4)? as u64, at + 8)
        };

        let Some(field_type) = FieldType::from_code(type_code) else {
            debug!(tag, type_code, "Skipping entry with unknown field type");
            continue;
        };

        let byte_len = value_count.checked_mul(field_type.size()).ok_or_else(|| {
            DecodeError::InvalidIfd(format!("tag {} value length overflows", tag))
        })?;
        let value_offset = if byte_len <= slot_size {
            slot
        } else if big_tiff {
            reader.u64_at(slot)?
        } else {
            reader.u32_at(slot)? as u64
        };
        let value = reader.bytes(value_offset, byte_len)?;

        entries.insert(
            tag,
            Entry {
                tag,
                field_type,
                count: value_count,
                value,
            },
        );
    }

    let next_at = entries_start + table_len;
    let next = if big_tiff {
        reader.u64_at(next_at)?
    } else {
        reader.u32_at(next_at)? as u64
    };

    Ok((
        Ifd {
            order: reader.order(),
            entries,
            offset,
        },
        next,
    ))
}

/// Walk the full IFD chain starting at the header's first offset.
pub fn read_ifd_chain<'a>(reader: &ByteReader<'a>, header: &Header) -> DecodeResult<Vec<Ifd<'a>>> {
    let mut ifds = Vec::new();
    let mut visited = HashSet::new();
    let mut offset = header.first_ifd_offset;

    if offset == 0 {
        return Err(DecodeError::InvalidIfd("file contains no IFD".to_string()));
    }

    while offset != 0 {
        if !visited.insert(offset) {
            return Err(DecodeError::InvalidIfd(format!(
                "IFD chain loops back to offset {}",
                offset
            )));
        }
        if ifds.len() >= MAX_IFDS {
            return Err(DecodeError::InvalidIfd(format!(
                "more than {} IFDs in chain",
                MAX_IFDS
            )));
        }
        let (ifd, next) = parse_ifd(reader, offset, header.big_tiff)?;
        debug!(offset, entries = ifd.len(), next, "Parsed IFD");
        ifds.push(ifd);
        offset = next;
    }

    Ok(ifds)
}
