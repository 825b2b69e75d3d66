//! uds-tester - async UDS tester built on uds-proto
//!
//! Talks to one ECU through a [`Transport`], correlates responses with
//! [`uds_proto::answers`] and keeps the ECU state in sync.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────┐
//! │                 UdsClient                 │
//! │  encode ─► send ─► receive* ─► decode     │
//! │             answers? ─► EcuStateMachine   │
//! │                   ▲                       │
//! │       PeriodicKeepAlive (0x3E every N ms) │
//! │                   │                       │
//! │            ┌──────┴──────┐                │
//! │            │  Transport  │                │
//! │            │ (mock/...)  │                │
//! │            └─────────────┘                │
//! └───────────────────────────────────────────┘
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod keepalive;
pub mod transport;

pub use client::UdsClient;
pub use config::{KeepaliveConfig, MockConfig, TesterConfig, TransportConfig};
pub use error::TesterError;
pub use keepalive::PeriodicKeepAlive;
pub use transport::{create_transport, Transport, TransportError};
