//! Conditional field layout
//!
//! A message body is decoded in declaration order. Each field may carry a
//! presence predicate over fields decoded before it, and a length-prefixed
//! field reads its byte count from an earlier integer field. Shapes are
//! validated at construction so that every such reference points backwards.
//!
//! Greedy fields are optional on both sides: an empty remainder decodes to
//! an absent field, and an absent greedy field encodes to nothing. A message
//! whose trailing payload would be swallowed by a greedy field on decode is
//! rejected on encode.

use bytes::{Bytes, BytesMut};

use super::field::{insert_bits, FieldCodec, FieldFault};
use crate::error::CodecError;
use crate::message::{FieldMap, UdsMessage};
use crate::registry::MessageShape;

/// Test applied to an earlier integer field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    Equals(u64),
    OneOf(&'static [u64]),
    NoneOf(&'static [u64]),
    Odd,
    Even,
}

impl Condition {
    fn holds(&self, value: u64) -> bool {
        match self {
            Self::Equals(v) => value == *v,
            Self::OneOf(set) => set.contains(&value),
            Self::NoneOf(set) => !set.contains(&value),
            Self::Odd => value % 2 == 1,
            Self::Even => value % 2 == 0,
        }
    }
}

/// Presence predicate: the field exists iff `field` satisfies `condition`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Presence {
    pub field: &'static str,
    pub condition: Condition,
}

impl Presence {
    pub fn new(field: &'static str, condition: Condition) -> Self {
        Self { field, condition }
    }

    /// A missing or non-integer referenced field makes the predicate false
    pub fn evaluate(&self, fields: &FieldMap) -> bool {
        fields
            .uint(self.field)
            .is_some_and(|v| self.condition.holds(v))
    }
}

/// One entry of a message shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub codec: FieldCodec,
    pub presence: Option<Presence>,
    /// Set on the last bit field sharing a byte; the cursor advances after it
    pub(crate) closes_byte: bool,
}

impl FieldSpec {
    pub fn new(name: &'static str, codec: FieldCodec) -> Self {
        Self {
            name,
            codec,
            presence: None,
            closes_byte: false,
        }
    }

    pub fn when(mut self, field: &'static str, condition: Condition) -> Self {
        self.presence = Some(Presence::new(field, condition));
        self
    }

    pub fn is_present(&self, fields: &FieldMap) -> bool {
        self.presence.as_ref().map_or(true, |p| p.evaluate(fields))
    }

    /// Referenced length field, for length-prefixed codecs
    pub fn length_reference(&self) -> Option<&'static str> {
        match self.codec {
            FieldCodec::LengthPrefixed(r) => Some(r),
            _ => None,
        }
    }
}

/// Decode the body of `buf` (service id already matched) against `shape`
pub(crate) fn decode_body(shape: &MessageShape, buf: &[u8]) -> Result<UdsMessage, CodecError> {
    let mut fields = FieldMap::new();
    let mut cursor = 1usize;

    for spec in shape.fields() {
        if !spec.is_present(&fields) {
            continue;
        }

        let prefixed_len = match spec.length_reference() {
            Some(r) => {
                let declared = fields.uint(r).unwrap_or(0);
                usize::try_from(declared).unwrap_or(usize::MAX)
            }
            None => 0,
        };

        let (value, consumed) = spec
            .codec
            .decode(buf, cursor, prefixed_len)
            .map_err(|fault| fault_to_error(shape, spec, fault))?;

        // An exhausted greedy field is reported as absent
        if spec.codec.is_greedy() && consumed == 0 {
            continue;
        }

        cursor += consumed;
        if spec.closes_byte {
            cursor += 1;
        }
        fields.insert(spec.name, value);
    }

    let trailing = buf
        .get(cursor..)
        .map(Bytes::copy_from_slice)
        .unwrap_or_default();

    Ok(UdsMessage::from_parts(shape.service_id(), fields, trailing))
}

/// Encode the body of `message` after its service id
pub(crate) fn encode_body(
    shape: &MessageShape,
    message: &UdsMessage,
    out: &mut BytesMut,
) -> Result<(), CodecError> {
    let fields = message.fields();
    let mut pending_bits: u8 = 0;
    let mut greedy: Option<(&'static str, usize)> = None;

    for spec in shape.fields() {
        if !spec.is_present(fields) {
            continue;
        }
        if let Some(unit) = spec.codec.greedy_unit() {
            greedy = Some((spec.name, unit));
        }

        let value = match fields.get(spec.name) {
            Some(value) => value,
            None if spec.codec.is_greedy() => continue,
            None => {
                return Err(CodecError::MissingField {
                    service: shape.name(),
                    field: spec.name,
                })
            }
        };

        if let FieldCodec::Bits { width, offset } = spec.codec {
            let raw = value
                .as_uint()
                .ok_or(CodecError::TypeMismatch { field: spec.name })?;
            pending_bits = insert_bits(pending_bits, raw, width, offset)
                .map_err(|fault| fault_to_error(shape, spec, fault))?;
            if spec.closes_byte {
                out.extend_from_slice(&[pending_bits]);
                pending_bits = 0;
            }
            continue;
        }

        let prefixed_len = spec
            .length_reference()
            .and_then(|r| fields.uint(r))
            .unwrap_or(0);

        spec.codec
            .encode(value, prefixed_len, out)
            .map_err(|fault| fault_to_error(shape, spec, fault))?;
    }

    if let Some(trailing) = message.trailing() {
        if let Some((field, unit)) = greedy {
            if trailing.len() >= unit {
                return Err(CodecError::TrailingAfterGreedy {
                    service: shape.name(),
                    field,
                });
            }
        }
        out.extend_from_slice(trailing);
    }
    Ok(())
}

fn fault_to_error(shape: &MessageShape, spec: &FieldSpec, fault: FieldFault) -> CodecError {
    match fault {
        FieldFault::Short { needed, available } => CodecError::TruncatedInput {
            service: shape.name(),
            field: spec.name,
            needed,
            available,
        },
        FieldFault::OutOfRange { value, width_bits } => CodecError::ValueOutOfRange {
            field: spec.name,
            value,
            width_bits,
        },
        FieldFault::LengthMismatch { declared, actual } => CodecError::LengthMismatch {
            field: spec.name,
            declared,
            actual,
        },
        FieldFault::TypeMismatch => CodecError::TypeMismatch { field: spec.name },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::FieldValue;

    #[test]
    fn test_presence_evaluates_earlier_field() {
        let mut fields = FieldMap::new();
        fields.insert("memoryAddressLen", FieldValue::Uint(2));

        assert!(Presence::new("memoryAddressLen", Condition::Equals(2)).evaluate(&fields));
        assert!(!Presence::new("memoryAddressLen", Condition::Equals(3)).evaluate(&fields));
        assert!(Presence::new("memoryAddressLen", Condition::NoneOf(&[1, 3])).evaluate(&fields));
        assert!(Presence::new("memoryAddressLen", Condition::Even).evaluate(&fields));
    }

    #[test]
    fn test_presence_missing_reference_is_false() {
        let fields = FieldMap::new();
        assert!(!Presence::new("resetType", Condition::Equals(4)).evaluate(&fields));
        assert!(!Presence::new("resetType", Condition::NoneOf(&[4])).evaluate(&fields));
    }

    #[test]
    fn test_presence_ignores_byte_values() {
        let mut fields = FieldMap::new();
        fields.insert("securityAccessType", FieldValue::from(vec![1u8]));
        assert!(!Presence::new("securityAccessType", Condition::Odd).evaluate(&fields));
    }
}
