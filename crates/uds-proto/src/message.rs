//! In-memory representation of a decoded UDS message

use std::fmt;

use bytes::Bytes;

use crate::constants::service_id::{NEGATIVE_RESPONSE, RESPONSE_BIT};
use crate::nrc::NegativeResponseCode;
use crate::registry::{NameTables, Registry};

/// Decoded value of a single field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// Integer, enumerated byte or bit field
    Uint(u64),
    /// Byte string (fixed, length-prefixed or greedy)
    Bytes(Bytes),
    /// Sequence of integers of equal width
    List(Vec<u64>),
}

impl FieldValue {
    pub fn as_uint(&self) -> Option<u64> {
        match self {
            Self::Uint(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[u64]> {
        match self {
            Self::List(l) => Some(l),
            _ => None,
        }
    }

    /// True for a byte string or list with no items; such a value puts no
    /// bytes on the wire
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Uint(_) => false,
            Self::Bytes(b) => b.is_empty(),
            Self::List(l) => l.is_empty(),
        }
    }
}

impl From<u8> for FieldValue {
    fn from(v: u8) -> Self {
        Self::Uint(v.into())
    }
}

impl From<u16> for FieldValue {
    fn from(v: u16) -> Self {
        Self::Uint(v.into())
    }
}

impl From<u32> for FieldValue {
    fn from(v: u32) -> Self {
        Self::Uint(v.into())
    }
}

impl From<u64> for FieldValue {
    fn from(v: u64) -> Self {
        Self::Uint(v)
    }
}

impl From<Bytes> for FieldValue {
    fn from(v: Bytes) -> Self {
        Self::Bytes(v)
    }
}

impl From<Vec<u8>> for FieldValue {
    fn from(v: Vec<u8>) -> Self {
        Self::Bytes(Bytes::from(v))
    }
}

impl From<&[u8]> for FieldValue {
    fn from(v: &[u8]) -> Self {
        Self::Bytes(Bytes::copy_from_slice(v))
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        Self::Bytes(Bytes::copy_from_slice(v.as_bytes()))
    }
}

impl From<Vec<u16>> for FieldValue {
    fn from(v: Vec<u16>) -> Self {
        Self::List(v.into_iter().map(u64::from).collect())
    }
}

impl From<Vec<u64>> for FieldValue {
    fn from(v: Vec<u64>) -> Self {
        Self::List(v)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uint(v) => write!(f, "0x{:02X}", v),
            Self::Bytes(b) => write!(f, "[{}]", hex::encode_upper(b)),
            Self::List(l) => {
                f.write_str("[")?;
                for (i, v) in l.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "0x{:04X}", v)?;
                }
                f.write_str("]")
            }
        }
    }
}

/// Field name → value mapping
///
/// Messages carry a handful of fields, so a vector beats a hash map.
/// Iteration follows insertion order, which is shape order for decoded
/// messages. Equality ignores order, and an empty byte string or list
/// compares equal to an absent field.
#[derive(Debug, Clone, Default)]
pub struct FieldMap {
    entries: Vec<(&'static str, FieldValue)>,
}

impl PartialEq for FieldMap {
    fn eq(&self, other: &Self) -> bool {
        self.carried().count() == other.carried().count()
            && self
                .carried()
                .all(|(name, value)| other.get(name) == Some(value))
    }
}

impl Eq for FieldMap {}

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a field, keeping the original position on replace
    pub fn insert(&mut self, name: &'static str, value: FieldValue) {
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.entries
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v)
    }

    pub fn uint(&self, name: &str) -> Option<u64> {
        self.get(name).and_then(FieldValue::as_uint)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &FieldValue)> + '_ {
        self.entries.iter().map(|(n, v)| (*n, v))
    }

    /// Fields that contribute bytes on the wire
    fn carried(&self) -> impl Iterator<Item = (&'static str, &FieldValue)> + '_ {
        self.iter().filter(|(_, v)| !v.is_empty())
    }
}

/// A single UDS application-layer message
///
/// Treated as a value: re-encoding always derives bytes from the current
/// field values, never from the buffer the message was decoded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UdsMessage {
    service_id: u8,
    fields: FieldMap,
    trailing: Bytes,
}

impl UdsMessage {
    /// Create a message with no fields
    pub fn new(service_id: u8) -> Self {
        Self {
            service_id,
            fields: FieldMap::new(),
            trailing: Bytes::new(),
        }
    }

    pub(crate) fn from_parts(service_id: u8, fields: FieldMap, trailing: Bytes) -> Self {
        Self {
            service_id,
            fields,
            trailing,
        }
    }

    /// Add or replace a field value
    pub fn with(mut self, name: &'static str, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(name, value.into());
        self
    }

    /// Attach opaque bytes appended after all declared fields
    pub fn with_trailing(mut self, trailing: impl Into<Bytes>) -> Self {
        self.trailing = trailing.into();
        self
    }

    /// Build a negative response (0x7F) for `request_service_id`
    pub fn negative_response(request_service_id: u8, nrc: NegativeResponseCode) -> Self {
        Self::new(NEGATIVE_RESPONSE)
            .with("requestServiceId", request_service_id)
            .with("negativeResponseCode", u8::from(nrc))
    }

    pub fn service_id(&self) -> u8 {
        self.service_id
    }

    pub fn fields(&self) -> &FieldMap {
        &self.fields
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn uint(&self, name: &str) -> Option<u64> {
        self.fields.uint(name)
    }

    pub fn bytes(&self, name: &str) -> Option<&[u8]> {
        self.get(name).and_then(FieldValue::as_bytes)
    }

    pub fn list(&self, name: &str) -> Option<&[u64]> {
        self.get(name).and_then(FieldValue::as_list)
    }

    /// Opaque bytes after the declared fields, if any
    pub fn trailing(&self) -> Option<&[u8]> {
        if self.trailing.is_empty() {
            None
        } else {
            Some(&self.trailing)
        }
    }

    pub fn is_negative_response(&self) -> bool {
        self.service_id == NEGATIVE_RESPONSE
    }

    /// True for ids in the positive-response range (request id | 0x40)
    pub fn is_positive_response(&self) -> bool {
        !self.is_negative_response() && self.service_id & RESPONSE_BIT != 0
    }

    /// Echoed request service id of a negative response
    pub fn echoed_service_id(&self) -> Option<u8> {
        if !self.is_negative_response() {
            return None;
        }
        self.uint("requestServiceId")
            .and_then(|v| u8::try_from(v).ok())
    }

    /// Reason code of a negative response
    pub fn negative_response_code(&self) -> Option<NegativeResponseCode> {
        if !self.is_negative_response() {
            return None;
        }
        self.uint("negativeResponseCode")
            .and_then(|v| u8::try_from(v).ok())
            .map(NegativeResponseCode::from)
    }

    /// One-line summary with display names, e.g.
    /// `DiagnosticSessionControl diagnosticSessionType=programmingSession`
    pub fn describe(&self) -> String {
        self.describe_with(Registry::standard(), NameTables::global())
    }

    pub fn describe_with(&self, registry: &Registry, names: &NameTables) -> String {
        let mut out = match registry.lookup(self.service_id) {
            Some(shape) => shape.name().to_string(),
            None => format!("Unknown(0x{:02X})", self.service_id),
        };

        for (field, value) in self.fields.iter() {
            let rendered = match value {
                FieldValue::Uint(raw) => names
                    .display_name(self.service_id, field, *raw)
                    .unwrap_or_else(|| value.to_string()),
                FieldValue::List(items) => {
                    let items: Vec<String> = items
                        .iter()
                        .map(|raw| {
                            names
                                .display_name(self.service_id, field, *raw)
                                .unwrap_or_else(|| format!("0x{:04X}", raw))
                        })
                        .collect();
                    format!("[{}]", items.join(", "))
                }
                FieldValue::Bytes(_) => value.to_string(),
            };
            out.push_str(&format!(" {}={}", field, rendered));
        }

        if !self.trailing.is_empty() {
            out.push_str(&format!(" trailing=[{}]", hex::encode_upper(&self.trailing)));
        }
        out
    }

    /// True when no byte follows the service id
    pub(crate) fn is_bare(&self) -> bool {
        self.trailing.is_empty() && self.fields.iter().all(|(_, v)| v.is_empty())
    }
}
