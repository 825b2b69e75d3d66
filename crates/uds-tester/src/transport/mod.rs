//! Transport layer for UDS communication
//!
//! The tester only depends on the [`Transport`] trait. A mock adapter is
//! provided for tests and offline use.
//!
//! # Example
//!
//! ```ignore
//! use uds_tester::transport::{create_transport, Transport};
//! use uds_tester::config::TransportConfig;
//!
//! let transport = create_transport(&TransportConfig::default());
//! transport.send(&[0x22, 0xF1, 0x90]).await?;
//! let response = transport.receive(Duration::from_secs(5)).await?;
//! ```

mod adapter;
pub mod error;
pub mod mock;

pub use adapter::Transport;
pub use error::TransportError;

use std::sync::Arc;

use crate::config::TransportConfig;

/// Create a transport based on configuration
pub fn create_transport(config: &TransportConfig) -> Arc<dyn Transport> {
    match config {
        TransportConfig::Mock(cfg) => Arc::new(mock::MockTransport::new(cfg)),
    }
}
