//! Transport trait

use std::time::Duration;

use async_trait::async_trait;

use super::TransportError;

/// Byte-buffer link to one ECU
///
/// Implementations deliver fully reassembled UDS messages; segmentation
/// (ISO-TP, DoIP framing) happens below this trait.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send one UDS message
    async fn send(&self, data: &[u8]) -> Result<(), TransportError>;

    /// Wait up to `timeout` for the next incoming UDS message
    ///
    /// Returns [`TransportError::Timeout`] when nothing arrives in time.
    async fn receive(&self, timeout: Duration) -> Result<Vec<u8>, TransportError>;

    /// Check if the transport is connected
    async fn is_connected(&self) -> bool;
}
