//! Tester configuration
//!
//! Timeouts, tester-present keepalive and transport selection. Every field
//! has a default, so an empty TOML document is a valid configuration.

use serde::{Deserialize, Serialize};
use uds_proto::ProtocolConfig;

use crate::error::TesterError;

/// Configuration for a UDS tester
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TesterConfig {
    /// Protocol-level settings (response-pending policy)
    #[serde(default)]
    pub protocol: ProtocolConfig,
    /// Time to wait for the first response to a request
    #[serde(default = "default_response_timeout")]
    pub response_timeout_ms: u64,
    /// Upper bound on waiting once the ECU reported "response pending"
    #[serde(default = "default_response_pending_timeout")]
    pub response_pending_timeout_ms: u64,
    /// Tester present keepalive
    #[serde(default)]
    pub keepalive: KeepaliveConfig,
    /// Transport configuration
    #[serde(default)]
    pub transport: TransportConfig,
}

fn default_response_timeout() -> u64 {
    5000
}

fn default_response_pending_timeout() -> u64 {
    30000
}

impl Default for TesterConfig {
    fn default() -> Self {
        Self {
            protocol: ProtocolConfig::default(),
            response_timeout_ms: default_response_timeout(),
            response_pending_timeout_ms: default_response_pending_timeout(),
            keepalive: KeepaliveConfig::default(),
            transport: TransportConfig::default(),
        }
    }
}

impl TesterConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, TesterError> {
        toml::from_str(s).map_err(|e| TesterError::InvalidConfig(e.to_string()))
    }
}

/// Tester present keepalive configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeepaliveConfig {
    /// Enable keepalive
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Interval between tester present messages in milliseconds
    #[serde(default = "default_keepalive_interval")]
    pub interval_ms: u64,
    /// Bounded wait for each tester present response
    #[serde(default = "default_keepalive_response_timeout")]
    pub response_timeout_ms: u64,
    /// Set the suppressPosRspMsgIndicationBit and do not wait for a response
    #[serde(default)]
    pub suppress_response: bool,
}

fn default_true() -> bool {
    true
}

fn default_keepalive_interval() -> u64 {
    2000
}

fn default_keepalive_response_timeout() -> u64 {
    300
}

impl Default for KeepaliveConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_ms: default_keepalive_interval(),
            response_timeout_ms: default_keepalive_response_timeout(),
            suppress_response: false,
        }
    }
}

/// Transport configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TransportConfig {
    /// In-memory transport for testing
    Mock(MockConfig),
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self::Mock(MockConfig::default())
    }
}

/// Mock transport configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MockConfig {
    /// Simulated latency per send in milliseconds
    #[serde(default)]
    pub latency_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = TesterConfig::from_toml_str("").unwrap();
        assert_eq!(config.response_timeout_ms, 5000);
        assert_eq!(config.response_pending_timeout_ms, 30000);
        assert!(config.keepalive.enabled);
        assert_eq!(config.keepalive.interval_ms, 2000);
        assert_eq!(config.keepalive.response_timeout_ms, 300);
        assert!(!config.keepalive.suppress_response);
        assert!(!config.protocol.treat_response_pending_as_answer);
        assert!(matches!(
            config.transport,
            TransportConfig::Mock(MockConfig { latency_ms: 0 })
        ));
    }

    #[test]
    fn test_full_document() {
        let config = TesterConfig::from_toml_str(
            r#"
            response_timeout_ms = 1000

            [protocol]
            treat_response_pending_as_answer = true

            [keepalive]
            enabled = false
            suppress_response = true

            [transport]
            type = "mock"
            latency_ms = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.response_timeout_ms, 1000);
        assert!(config.protocol.treat_response_pending_as_answer);
        assert!(!config.keepalive.enabled);
        assert!(config.keepalive.suppress_response);
        assert_eq!(config.keepalive.interval_ms, 2000);
        let TransportConfig::Mock(mock) = config.transport;
        assert_eq!(mock.latency_ms, 5);
    }

    #[test]
    fn test_invalid_document() {
        assert!(matches!(
            TesterConfig::from_toml_str("response_timeout_ms = \"soon\""),
            Err(TesterError::InvalidConfig(_))
        ));
    }
}
