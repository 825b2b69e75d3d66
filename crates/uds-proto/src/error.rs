//! UDS codec and registry errors

use thiserror::Error;

/// Errors raised while turning bytes into messages or messages into bytes
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// First byte does not match any registered message shape
    #[error("Unknown service 0x{0:02X}")]
    UnknownService(u8),

    /// Buffer ends before a field could be read
    #[error("Truncated input in {service}.{field}: needed {needed} bytes, {available} available")]
    TruncatedInput {
        service: &'static str,
        field: &'static str,
        needed: usize,
        available: usize,
    },

    /// Empty buffer (no service id at all)
    #[error("Empty message")]
    EmptyMessage,

    /// A field whose presence predicate holds has no value
    #[error("Missing field {service}.{field}")]
    MissingField {
        service: &'static str,
        field: &'static str,
    },

    /// Integer does not fit into the field's wire width
    #[error("Value 0x{value:X} does not fit into {width_bits} bits of field {field}")]
    ValueOutOfRange {
        field: &'static str,
        value: u64,
        width_bits: u32,
    },

    /// Length-prefixed bytes disagree with the referenced length field
    #[error("Length mismatch in field {field}: length field says {declared}, got {actual} bytes")]
    LengthMismatch {
        field: &'static str,
        declared: u64,
        actual: usize,
    },

    /// Value variant does not suit the field's codec
    #[error("Wrong value type for field {field}")]
    TypeMismatch { field: &'static str },

    /// Trailing bytes would be read back as part of a greedy field
    #[error("Trailing payload after {service}.{field} would decode as part of that field")]
    TrailingAfterGreedy {
        service: &'static str,
        field: &'static str,
    },
}

/// Errors raised while building message shapes or the registry
///
/// These describe mistakes in a static message table and never depend on
/// bus traffic.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Bit field leaves its byte or overlaps a co-located bit field
    #[error("Bit field {service}.{field} overflows or overlaps its byte")]
    BitFieldOverflow {
        service: &'static str,
        field: &'static str,
    },

    /// Co-located bit fields carry different presence predicates
    #[error("Bit field {service}.{field} has a different presence predicate than its byte")]
    InconsistentBitGroup {
        service: &'static str,
        field: &'static str,
    },

    /// Predicate or length reference does not resolve to an earlier integer field
    #[error("Field {service}.{field} references {reference}, which is not an earlier integer field")]
    ForwardReference {
        service: &'static str,
        field: &'static str,
        reference: &'static str,
    },

    /// Integer width outside 1..=4 bytes
    #[error("Field {service}.{field} has unsupported integer width {width}")]
    InvalidWidth {
        service: &'static str,
        field: &'static str,
        width: u8,
    },

    /// Two fields of one shape share a name
    #[error("Duplicate field {service}.{field}")]
    DuplicateField {
        service: &'static str,
        field: &'static str,
    },

    /// Service id slot already taken or not usable for this direction
    #[error("Service id 0x{service_id:02X} conflict: {reason}")]
    ServiceConflict { service_id: u8, reason: String },
}
