//! Per-field wire codecs
//!
//! All multi-byte integers are big-endian. Bit fields are read from and
//! written into a single shared byte; advancing past that byte is the
//! layout's job, not the codec's.

use bytes::{BufMut, Bytes, BytesMut};

use crate::message::FieldValue;

/// Wire representation of one field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldCodec {
    /// Big-endian unsigned integer, 1 to 4 bytes wide
    Uint(u8),
    /// One raw byte with a display name looked up in the name tables
    EnumByte,
    /// `width` bits located `offset` bits above the least significant bit
    Bits { width: u8, offset: u8 },
    /// Exactly `n` bytes
    FixedBytes(usize),
    /// Byte string whose length is the value of an earlier integer field
    LengthPrefixed(&'static str),
    /// Every remaining byte
    Greedy,
    /// Every remaining byte, as big-endian integers of the given width
    UintList(u8),
}

/// Low-level codec failure, turned into a `CodecError` by the layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum FieldFault {
    Short { needed: usize, available: usize },
    OutOfRange { value: u64, width_bits: u32 },
    LengthMismatch { declared: u64, actual: usize },
    TypeMismatch,
}

impl FieldCodec {
    /// True for codecs whose value can drive a presence predicate or a length
    pub fn is_integer(&self) -> bool {
        matches!(self, Self::Uint(_) | Self::EnumByte | Self::Bits { .. })
    }

    /// True for codecs that swallow the rest of the buffer
    pub fn is_greedy(&self) -> bool {
        self.greedy_unit().is_some()
    }

    /// Smallest run of remaining bytes a greedy codec takes in
    pub(crate) fn greedy_unit(&self) -> Option<usize> {
        match self {
            Self::Greedy => Some(1),
            Self::UintList(width) => Some(usize::from(*width)),
            _ => None,
        }
    }

    /// Decode a byte-aligned field at `offset`
    ///
    /// `prefixed_len` is the resolved length for [`FieldCodec::LengthPrefixed`]
    /// and ignored otherwise. Returns the value and the number of bytes
    /// consumed. Bit fields consume nothing here.
    pub(crate) fn decode(
        &self,
        buf: &[u8],
        offset: usize,
        prefixed_len: usize,
    ) -> Result<(FieldValue, usize), FieldFault> {
        let rest = buf.get(offset..).unwrap_or_default();
        match self {
            Self::Uint(width) => {
                let width = usize::from(*width);
                let raw = take(rest, width)?;
                Ok((FieldValue::Uint(read_uint(raw)), width))
            }
            Self::EnumByte => {
                let raw = take(rest, 1)?;
                Ok((FieldValue::Uint(raw[0].into()), 1))
            }
            Self::Bits { width, offset: shift } => {
                let raw = take(rest, 1)?;
                Ok((FieldValue::Uint(extract_bits(raw[0], *width, *shift)), 0))
            }
            Self::FixedBytes(n) => {
                let raw = take(rest, *n)?;
                Ok((FieldValue::Bytes(Bytes::copy_from_slice(raw)), *n))
            }
            Self::LengthPrefixed(_) => {
                let raw = take(rest, prefixed_len)?;
                Ok((FieldValue::Bytes(Bytes::copy_from_slice(raw)), prefixed_len))
            }
            Self::Greedy => Ok((FieldValue::Bytes(Bytes::copy_from_slice(rest)), rest.len())),
            Self::UintList(width) => {
                // A partial item at the end is left to the trailing payload
                let items = rest.chunks_exact(usize::from(*width));
                let used = rest.len() - items.remainder().len();
                Ok((FieldValue::List(items.map(read_uint).collect()), used))
            }
        }
    }

    /// Append a byte-aligned field to `out`
    ///
    /// `prefixed_len` is the referenced length value for
    /// [`FieldCodec::LengthPrefixed`]. Bit fields go through [`insert_bits`].
    pub(crate) fn encode(
        &self,
        value: &FieldValue,
        prefixed_len: u64,
        out: &mut BytesMut,
    ) -> Result<(), FieldFault> {
        match (self, value) {
            (Self::Uint(width), FieldValue::Uint(v)) => write_uint(out, *v, *width),
            (Self::EnumByte, FieldValue::Uint(v)) => write_uint(out, *v, 1),
            (Self::FixedBytes(n), FieldValue::Bytes(b)) => {
                if b.len() != *n {
                    return Err(FieldFault::LengthMismatch {
                        declared: *n as u64,
                        actual: b.len(),
                    });
                }
                out.put_slice(b);
                Ok(())
            }
            (Self::LengthPrefixed(_), FieldValue::Bytes(b)) => {
                if b.len() as u64 != prefixed_len {
                    return Err(FieldFault::LengthMismatch {
                        declared: prefixed_len,
                        actual: b.len(),
                    });
                }
                out.put_slice(b);
                Ok(())
            }
            (Self::Greedy, FieldValue::Bytes(b)) => {
                out.put_slice(b);
                Ok(())
            }
            (Self::UintList(width), FieldValue::List(values)) => {
                values.iter().try_for_each(|v| write_uint(out, *v, *width))
            }
            _ => Err(FieldFault::TypeMismatch),
        }
    }
}

fn take(rest: &[u8], n: usize) -> Result<&[u8], FieldFault> {
    rest.get(..n).ok_or(FieldFault::Short {
        needed: n,
        available: rest.len(),
    })
}

/// Read a big-endian unsigned integer of up to 8 bytes
pub fn read_uint(raw: &[u8]) -> u64 {
    raw.iter().fold(0u64, |acc, b| (acc << 8) | u64::from(*b))
}

/// Append `value` as a big-endian integer of `width` bytes
pub(crate) fn write_uint(out: &mut BytesMut, value: u64, width: u8) -> Result<(), FieldFault> {
    let width_bits = u32::from(width) * 8;
    if width_bits < 64 && value >> width_bits != 0 {
        return Err(FieldFault::OutOfRange { value, width_bits });
    }
    let be = value.to_be_bytes();
    out.put_slice(&be[be.len() - usize::from(width)..]);
    Ok(())
}

/// Mask of `width` bits starting `offset` bits above the LSB
pub fn bit_mask(width: u8, offset: u8) -> u8 {
    let ones = if width >= 8 { 0xFF } else { (1u8 << width) - 1 };
    ones << offset
}

/// Read a sub-byte field
pub fn extract_bits(byte: u8, width: u8, offset: u8) -> u64 {
    u64::from((byte & bit_mask(width, offset)) >> offset)
}

/// Merge a sub-byte field into `byte`
pub(crate) fn insert_bits(byte: u8, value: u64, width: u8, offset: u8) -> Result<u8, FieldFault> {
    if value >> width != 0 {
        return Err(FieldFault::OutOfRange {
            value,
            width_bits: width.into(),
        });
    }
    // value < 2^width <= 256 here
    let v = value as u8;
    Ok((byte & !bit_mask(width, offset)) | (v << offset))
}
