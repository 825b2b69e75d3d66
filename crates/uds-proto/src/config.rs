//! Protocol configuration
//!
//! A single process-wide switch controls whether a "response pending"
//! negative response (NRC 0x78) counts as the answer to a request.

use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

static TREAT_RESPONSE_PENDING_AS_ANSWER: AtomicBool = AtomicBool::new(false);

/// Current process-wide response-pending setting
pub fn treat_response_pending_as_answer() -> bool {
    TREAT_RESPONSE_PENDING_AS_ANSWER.load(Ordering::Relaxed)
}

/// Errors loading protocol configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid protocol configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

/// UDS protocol settings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolConfig {
    /// Treat NRC 0x78 as a final answer instead of a provisional one
    #[serde(default)]
    pub treat_response_pending_as_answer: bool,
}

impl ProtocolConfig {
    /// Parse from a TOML document (missing keys take their defaults)
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Publish this configuration as the process-wide setting
    ///
    /// Meant to run once at start-up, before traffic is matched.
    pub fn install(&self) {
        TREAT_RESPONSE_PENDING_AS_ANSWER
            .store(self.treat_response_pending_as_answer, Ordering::Relaxed);
        info!(
            treat_response_pending_as_answer = self.treat_response_pending_as_answer,
            "UDS protocol configuration installed"
        );
    }

    /// The configuration currently in effect
    pub fn current() -> Self {
        Self {
            treat_response_pending_as_answer: treat_response_pending_as_answer(),
        }
    }
}
