//! ECU state tracking
//!
//! Only positive responses change the state. Requests, negative responses
//! and responses of other kinds leave it untouched.

use parking_lot::RwLock;
use tracing::{debug, info};

use crate::constants::session_type;
use crate::message::UdsMessage;
use crate::registry::ServiceKind;

/// Tracked diagnostic state of one ECU
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EcuState {
    /// Active diagnostic session (1 = default session)
    pub session: u8,
    /// Unlocked security level (0 = locked)
    pub security_level: u8,
    /// Last acknowledged communication control type
    pub communication_control: u8,
    pub tester_present_seen: bool,
    pub periodic_data_id: Option<u8>,
}

impl Default for EcuState {
    fn default() -> Self {
        Self {
            session: session_type::DEFAULT,
            security_level: 0,
            communication_control: 0,
            tester_present_seen: false,
            periodic_data_id: None,
        }
    }
}

fn byte(message: &UdsMessage, field: &str) -> Option<u8> {
    message.uint(field).and_then(|v| u8::try_from(v).ok())
}

impl EcuState {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// State after `response`
    pub fn transition(mut self, response: &UdsMessage) -> Self {
        self.apply(response);
        self
    }

    /// Apply `response` in place; returns true if it was a state-changing kind
    pub fn apply(&mut self, response: &UdsMessage) -> bool {
        if !response.is_positive_response() {
            return false;
        }
        let Some(kind) = ServiceKind::from_service_id(response.service_id()) else {
            return false;
        };

        match kind {
            ServiceKind::DiagnosticSessionControl => {
                match byte(response, "diagnosticSessionType") {
                    Some(session) => self.session = session,
                    None => return false,
                }
            }
            ServiceKind::EcuReset => {
                self.reset();
                self.session = session_type::DEFAULT;
            }
            ServiceKind::SecurityAccess => match byte(response, "securityAccessType") {
                // Even sub-functions acknowledge a key; odd ones only carry a seed
                Some(level) if level % 2 == 0 => self.security_level = level,
                _ => return false,
            },
            ServiceKind::CommunicationControl => match byte(response, "controlType") {
                Some(control) => self.communication_control = control,
                None => return false,
            },
            ServiceKind::TesterPresent => self.tester_present_seen = true,
            ServiceKind::ReadDataByPeriodicIdentifier => {
                match byte(response, "periodicDataIdentifier") {
                    Some(pdid) => self.periodic_data_id = Some(pdid),
                    None => return false,
                }
            }
            _ => return false,
        }
        true
    }
}

/// Single-writer owner of one ECU's [`EcuState`]
#[derive(Debug, Default)]
pub struct EcuStateMachine {
    state: RwLock<EcuState>,
}

impl EcuStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update the state from a decoded response
    pub fn apply(&self, response: &UdsMessage) -> bool {
        let mut state = self.state.write();
        let before = *state;
        if !state.apply(response) {
            return false;
        }

        if state.session != before.session {
            info!(
                from = before.session,
                to = state.session,
                "Diagnostic session changed"
            );
        }
        if state.security_level != before.security_level {
            info!(level = state.security_level, "Security access granted");
        }
        if state.communication_control != before.communication_control {
            info!(
                control_type = state.communication_control,
                "Communication control changed"
            );
        }
        if ServiceKind::from_service_id(response.service_id()) == Some(ServiceKind::EcuReset) {
            info!("ECU state reset to default (ECU reset acknowledged)");
        }
        debug!(state = ?*state, "ECU state updated");
        true
    }

    pub fn snapshot(&self) -> EcuState {
        *self.state.read()
    }

    pub fn reset(&self) {
        self.state.write().reset();
        info!("ECU state reset to default");
    }
}
