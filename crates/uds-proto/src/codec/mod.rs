//! Byte buffer ↔ [`UdsMessage`] conversion
//!
//! `decode` looks up the shape registered for the first byte and walks its
//! fields; `encode` reverses the process. Both are pure and safe to call
//! from any thread.

pub mod field;
pub mod layout;

use bytes::{Bytes, BytesMut};
use tracing::trace;

use crate::error::CodecError;
use crate::message::UdsMessage;
use crate::registry::Registry;

pub use field::FieldCodec;
pub use layout::{Condition, FieldSpec, Presence};

/// Decode one reassembled UDS message with the standard registry
pub fn decode(buf: &[u8]) -> Result<UdsMessage, CodecError> {
    decode_with(Registry::standard(), buf)
}

/// Encode a message with the standard registry
pub fn encode(message: &UdsMessage) -> Result<Bytes, CodecError> {
    encode_with(Registry::standard(), message)
}

/// Decode against a caller-supplied registry
pub fn decode_with(registry: &Registry, buf: &[u8]) -> Result<UdsMessage, CodecError> {
    let service_id = *buf.first().ok_or(CodecError::EmptyMessage)?;
    let shape = registry
        .lookup(service_id)
        .ok_or(CodecError::UnknownService(service_id))?;

    let message = layout::decode_body(shape, buf)?;
    trace!(
        service = shape.name(),
        len = buf.len(),
        trailing = message.trailing().map_or(0, <[u8]>::len),
        "Decoded UDS message"
    );
    Ok(message)
}

/// Encode against a caller-supplied registry
pub fn encode_with(registry: &Registry, message: &UdsMessage) -> Result<Bytes, CodecError> {
    let service_id = message.service_id();
    let shape = registry
        .lookup(service_id)
        .ok_or(CodecError::UnknownService(service_id))?;

    let mut out = BytesMut::with_capacity(8);
    out.extend_from_slice(&[service_id]);
    layout::encode_body(shape, message, &mut out)?;
    trace!(service = shape.name(), len = out.len(), "Encoded UDS message");
    Ok(out.freeze())
}
