//! Tester errors

use thiserror::Error;
use uds_proto::{CodecError, NegativeResponseCode};

use crate::transport::TransportError;

#[derive(Debug, Error, Clone)]
pub enum TesterError {
    #[error("Negative response: {nrc} (0x{nrc:02X}) for service 0x{service_id:02X}")]
    NegativeResponse {
        service_id: u8,
        nrc: NegativeResponseCode,
    },

    #[error("No response to service 0x{service_id:02X} within {waited_ms} ms")]
    Timeout { service_id: u8, waited_ms: u64 },

    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
