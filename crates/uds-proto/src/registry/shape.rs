//! Message shapes and their builder

use std::collections::HashSet;

use super::services::ServiceKind;
use crate::codec::field::{bit_mask, FieldCodec};
use crate::codec::layout::{Condition, FieldSpec, Presence};
use crate::error::RegistryError;

/// Direction of a shape on the bus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Request,
    PositiveResponse,
    NegativeResponse,
}

/// Ordered field layout of one message kind
///
/// Built once at startup and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageShape {
    service_id: u8,
    name: &'static str,
    kind: ServiceKind,
    direction: Direction,
    fields: Vec<FieldSpec>,
}

impl MessageShape {
    pub fn builder(
        service_id: u8,
        name: &'static str,
        kind: ServiceKind,
        direction: Direction,
    ) -> ShapeBuilder {
        ShapeBuilder {
            shape: MessageShape {
                service_id,
                name,
                kind,
                direction,
                fields: Vec::new(),
            },
            next_bit: 8,
        }
    }

    pub fn service_id(&self) -> u8 {
        self.service_id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn kind(&self) -> ServiceKind {
        self.kind
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Declarative builder for [`MessageShape`]
///
/// Consecutive [`ShapeBuilder::bits`] calls pack most-significant bit first
/// into one shared byte. [`ShapeBuilder::when`] attaches a presence predicate
/// to the most recently added field.
#[derive(Debug)]
pub struct ShapeBuilder {
    shape: MessageShape,
    /// Bits still free (counted from the MSB) in the byte being packed
    next_bit: u8,
}

impl ShapeBuilder {
    /// Add an arbitrary field
    pub fn field(mut self, spec: FieldSpec) -> Self {
        if !matches!(spec.codec, FieldCodec::Bits { .. }) {
            self.next_bit = 8;
        }
        self.shape.fields.push(spec);
        self
    }

    /// Plain byte
    pub fn byte(self, name: &'static str) -> Self {
        self.uint(name, 1)
    }

    /// Big-endian integer of `width` bytes
    pub fn uint(self, name: &'static str, width: u8) -> Self {
        self.field(FieldSpec::new(name, FieldCodec::Uint(width)))
    }

    /// Byte with a name table
    pub fn enum_byte(self, name: &'static str) -> Self {
        self.field(FieldSpec::new(name, FieldCodec::EnumByte))
    }

    /// Next `width` bits of the shared byte, most significant first
    pub fn bits(mut self, name: &'static str, width: u8) -> Self {
        if self.next_bit == 0 {
            self.next_bit = 8;
        }
        // Offsets past the byte are left for build() to reject
        let offset = self.next_bit.checked_sub(width).unwrap_or(8);
        self.next_bit = self.next_bit.saturating_sub(width);
        self.shape
            .fields
            .push(FieldSpec::new(name, FieldCodec::Bits { width, offset }));
        self
    }

    pub fn fixed(self, name: &'static str, len: usize) -> Self {
        self.field(FieldSpec::new(name, FieldCodec::FixedBytes(len)))
    }

    /// Byte string sized by the earlier integer field `length_field`
    pub fn length_prefixed(self, name: &'static str, length_field: &'static str) -> Self {
        self.field(FieldSpec::new(
            name,
            FieldCodec::LengthPrefixed(length_field),
        ))
    }

    /// Rest of the buffer as bytes
    pub fn greedy(self, name: &'static str) -> Self {
        self.field(FieldSpec::new(name, FieldCodec::Greedy))
    }

    /// Rest of the buffer as big-endian integers
    pub fn uint_list(self, name: &'static str, width: u8) -> Self {
        self.field(FieldSpec::new(name, FieldCodec::UintList(width)))
    }

    /// Make the last added field conditional
    pub fn when(mut self, field: &'static str, condition: Condition) -> Self {
        if let Some(last) = self.shape.fields.last_mut() {
            last.presence = Some(Presence::new(field, condition));
        }
        self
    }

    /// Validate the layout and mark bit-group boundaries
    pub fn build(mut self) -> Result<MessageShape, RegistryError> {
        let service = self.shape.name;
        let mut seen: HashSet<&'static str> = HashSet::new();
        let mut integers: HashSet<&'static str> = HashSet::new();

        let mut group_mask: u8 = 0;
        let mut group_presence: Option<Option<Presence>> = None;
        let count = self.shape.fields.len();

        for idx in 0..count {
            let spec = &self.shape.fields[idx];
            let field = spec.name;

            if !seen.insert(field) {
                return Err(RegistryError::DuplicateField { service, field });
            }

            let references = spec
                .presence
                .as_ref()
                .map(|p| p.field)
                .into_iter()
                .chain(spec.length_reference());
            for reference in references {
                if !integers.contains(reference) {
                    return Err(RegistryError::ForwardReference {
                        service,
                        field,
                        reference,
                    });
                }
            }

            match spec.codec {
                FieldCodec::Uint(width) | FieldCodec::UintList(width) if !(1..=4).contains(&width) => {
                    return Err(RegistryError::InvalidWidth {
                        service,
                        field,
                        width,
                    });
                }
                FieldCodec::Bits { width, offset } => {
                    if width == 0 || u16::from(width) + u16::from(offset) > 8 {
                        return Err(RegistryError::BitFieldOverflow { service, field });
                    }
                    let mask = bit_mask(width, offset);
                    if group_mask & mask != 0 {
                        return Err(RegistryError::BitFieldOverflow { service, field });
                    }
                    match &group_presence {
                        Some(p) if *p != spec.presence => {
                            return Err(RegistryError::InconsistentBitGroup { service, field });
                        }
                        Some(_) => {}
                        None => group_presence = Some(spec.presence.clone()),
                    }
                    group_mask |= mask;
                }
                _ => {}
            }

            if spec.codec.is_integer() {
                integers.insert(field);
            }

            let is_bits = matches!(spec.codec, FieldCodec::Bits { .. });
            let next_is_bits = self
                .shape
                .fields
                .get(idx + 1)
                .is_some_and(|f| matches!(f.codec, FieldCodec::Bits { .. }));
            if is_bits && (group_mask == 0xFF || !next_is_bits) {
                self.shape.fields[idx].closes_byte = true;
                group_mask = 0;
                group_presence = None;
            }
        }

        Ok(self.shape)
    }
}
