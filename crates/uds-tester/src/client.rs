//! Request/response client
//!
//! Sends one request at a time and waits for the frame that answers it.
//! Frames that do not correlate, or do not decode, are skipped. A
//! "response pending" negative response extends the wait up to the
//! configured pending timeout. Positive responses drive the
//! [`EcuStateMachine`].

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, warn};
use uds_proto::constants::{routine_control_type, service_id, tester_present};
use uds_proto::{
    decode, encode, EcuState, EcuStateMachine, NegativeResponseCode, ResponseMatcher, UdsMessage,
};

use crate::config::TesterConfig;
use crate::error::TesterError;
use crate::transport::{Transport, TransportError};

/// UDS client bound to one ECU
pub struct UdsClient {
    transport: Arc<dyn Transport>,
    state: Arc<EcuStateMachine>,
    matcher: ResponseMatcher,
    response_timeout: Duration,
    pending_timeout: Duration,
    /// Serializes exchanges so that responses are never stolen by another request
    exchange: Mutex<()>,
}

impl UdsClient {
    pub fn new(transport: Arc<dyn Transport>, config: &TesterConfig) -> Self {
        Self {
            transport,
            state: Arc::new(EcuStateMachine::new()),
            matcher: ResponseMatcher::new(config.protocol.treat_response_pending_as_answer),
            response_timeout: Duration::from_millis(config.response_timeout_ms),
            pending_timeout: Duration::from_millis(config.response_pending_timeout_ms),
            exchange: Mutex::new(()),
        }
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// Shared handle to the tracked ECU state
    pub fn state_machine(&self) -> Arc<EcuStateMachine> {
        self.state.clone()
    }

    pub fn ecu_state(&self) -> EcuState {
        self.state.snapshot()
    }

    /// Send `request` and return the positive response that answers it
    pub async fn request(&self, request: &UdsMessage) -> Result<UdsMessage, TesterError> {
        let bytes = encode(request)?;
        let _exchange = self.exchange.lock().await;

        self.transport.send(&bytes).await?;
        debug!(request = %request.describe(), "UDS request sent");
        self.await_response(request).await
    }

    /// Send `request` without waiting for any response
    pub async fn send_only(&self, request: &UdsMessage) -> Result<(), TesterError> {
        let bytes = encode(request)?;
        let _exchange = self.exchange.lock().await;
        self.transport.send(&bytes).await?;
        debug!(request = %request.describe(), "UDS request sent (no response expected)");
        Ok(())
    }

    /// Send `request` and wait at most `timeout` for its answer
    ///
    /// Used by the keepalive; response pending does not extend the wait.
    pub(crate) async fn request_within(
        &self,
        request: &UdsMessage,
        timeout: Duration,
    ) -> Result<UdsMessage, TesterError> {
        let bytes = encode(request)?;
        let _exchange = self.exchange.lock().await;
        self.transport.send(&bytes).await?;

        let started = Instant::now();
        let deadline = started + timeout;
        loop {
            let message = self.next_frame(request, started, deadline).await?;
            if self.matcher.answers(&message, request) {
                return self.finish(request, message);
            }
        }
    }

    async fn await_response(&self, request: &UdsMessage) -> Result<UdsMessage, TesterError> {
        let started = Instant::now();
        let mut deadline = started + self.response_timeout;
        let pending_limit = started + self.pending_timeout;

        loop {
            let message = self.next_frame(request, started, deadline).await?;

            if self.matcher.answers(&message, request) {
                return self.finish(request, message);
            }

            if is_response_pending_for(&message, request) {
                deadline = pending_limit.max(deadline);
                debug!(
                    service = request.service_id(),
                    "Response pending, extending wait"
                );
                continue;
            }

            debug!(frame = %message.describe(), "Ignoring uncorrelated frame");
        }
    }

    /// Receive and decode the next frame before `deadline`
    async fn next_frame(
        &self,
        request: &UdsMessage,
        started: Instant,
        deadline: Instant,
    ) -> Result<UdsMessage, TesterError> {
        let timeout_error = || TesterError::Timeout {
            service_id: request.service_id(),
            waited_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        };

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(timeout_error());
            }

            let frame = match self.transport.receive(remaining).await {
                Ok(frame) => frame,
                Err(TransportError::Timeout(_)) => return Err(timeout_error()),
                Err(e) => return Err(e.into()),
            };

            match decode(&frame) {
                Ok(message) => return Ok(message),
                Err(e) => {
                    warn!(error = %e, frame = %hex::encode_upper(&frame), "Dropping undecodable frame");
                }
            }
        }
    }

    fn finish(&self, request: &UdsMessage, message: UdsMessage) -> Result<UdsMessage, TesterError> {
        if let Some(nrc) = message.negative_response_code() {
            debug!(
                service = request.service_id(),
                nrc = %nrc,
                "Negative response"
            );
            return Err(TesterError::NegativeResponse {
                service_id: request.service_id(),
                nrc,
            });
        }

        self.state.apply(&message);
        debug!(response = %message.describe(), "UDS response received");
        Ok(message)
    }

    // =========================================================================
    // Convenience services
    // =========================================================================

    /// Diagnostic Session Control (0x10)
    pub async fn diagnostic_session_control(&self, session: u8) -> Result<UdsMessage, TesterError> {
        self.request(
            &UdsMessage::new(service_id::DIAGNOSTIC_SESSION_CONTROL)
                .with("diagnosticSessionType", session),
        )
        .await
    }

    /// ECU Reset (0x11), returns powerDownTime when the ECU reports one
    pub async fn ecu_reset(&self, reset_type: u8) -> Result<Option<u8>, TesterError> {
        let response = self
            .request(&UdsMessage::new(service_id::ECU_RESET).with("resetType", reset_type))
            .await?;
        Ok(response
            .uint("powerDownTime")
            .and_then(|v| u8::try_from(v).ok()))
    }

    /// Tester Present (0x3E)
    pub async fn tester_present(&self, suppress_response: bool) -> Result<(), TesterError> {
        let sub_function = if suppress_response {
            tester_present::SUPPRESS_POSITIVE_RESPONSE
        } else {
            tester_present::ZERO_SUB_FUNCTION
        };
        let request = UdsMessage::new(service_id::TESTER_PRESENT).with("subFunction", sub_function);

        if suppress_response {
            self.send_only(&request).await
        } else {
            self.request(&request).await.map(|_| ())
        }
    }

    /// Security Access - Request Seed (0x27 odd)
    pub async fn security_access_request_seed(&self, level: u8) -> Result<Vec<u8>, TesterError> {
        let sub_function = level
            .checked_mul(2)
            .and_then(|v| v.checked_sub(1))
            .ok_or_else(|| TesterError::InvalidResponse(format!("Invalid security level {level}")))?;
        let response = self
            .request(
                &UdsMessage::new(service_id::SECURITY_ACCESS)
                    .with("securityAccessType", sub_function),
            )
            .await?;
        Ok(response
            .bytes("securitySeed")
            .map(<[u8]>::to_vec)
            .unwrap_or_default())
    }

    /// Security Access - Send Key (0x27 even)
    pub async fn security_access_send_key(&self, level: u8, key: &[u8]) -> Result<(), TesterError> {
        let sub_function = level
            .checked_mul(2)
            .ok_or_else(|| TesterError::InvalidResponse(format!("Invalid security level {level}")))?;
        self.request(
            &UdsMessage::new(service_id::SECURITY_ACCESS)
                .with("securityAccessType", sub_function)
                .with("securityKey", key),
        )
        .await?;
        Ok(())
    }

    /// Read Data By Identifier (0x22), returns the identifier and its record
    pub async fn read_data_by_id(&self, dids: &[u16]) -> Result<(u16, Vec<u8>), TesterError> {
        let response = self
            .request(&UdsMessage::new(service_id::READ_DATA_BY_ID).with("identifiers", dids.to_vec()))
            .await?;
        let did = response
            .uint("dataIdentifier")
            .and_then(|v| u16::try_from(v).ok())
            .ok_or_else(|| TesterError::InvalidResponse("Missing dataIdentifier".to_string()))?;
        Ok((did, response.trailing().map(<[u8]>::to_vec).unwrap_or_default()))
    }

    /// Write Data By Identifier (0x2E)
    pub async fn write_data_by_id(&self, did: u16, data: &[u8]) -> Result<(), TesterError> {
        self.request(
            &UdsMessage::new(service_id::WRITE_DATA_BY_ID)
                .with("dataIdentifier", did)
                .with_trailing(data.to_vec()),
        )
        .await?;
        Ok(())
    }

    /// Communication Control (0x28)
    pub async fn communication_control(
        &self,
        control_type: u8,
        communication_type: u8,
    ) -> Result<(), TesterError> {
        self.request(
            &UdsMessage::new(service_id::COMMUNICATION_CONTROL)
                .with("controlType", control_type)
                .with("communicationType0", communication_type >> 6)
                .with("communicationType1", (communication_type >> 4) & 0x03)
                .with("communicationType2", communication_type & 0x0F),
        )
        .await?;
        Ok(())
    }

    /// Clear Diagnostic Information (0x14), `group` is the 3-byte DTC group
    pub async fn clear_dtc(&self, group: u32) -> Result<(), TesterError> {
        let group_bytes = group.to_be_bytes();
        self.request(
            &UdsMessage::new(service_id::CLEAR_DIAGNOSTIC_INFO)
                .with("groupOfDTCHighByte", group_bytes[1])
                .with("groupOfDTCMiddleByte", group_bytes[2])
                .with("groupOfDTCLowByte", group_bytes[3]),
        )
        .await?;
        Ok(())
    }

    /// Start a routine (0x31 0x01), returns the routine status record
    pub async fn routine_control_start(
        &self,
        routine_id: u16,
        params: &[u8],
    ) -> Result<Vec<u8>, TesterError> {
        let response = self
            .request(
                &UdsMessage::new(service_id::ROUTINE_CONTROL)
                    .with("routineControlType", routine_control_type::START_ROUTINE)
                    .with("routineIdentifier", routine_id)
                    .with_trailing(params.to_vec()),
            )
            .await?;
        Ok(response.trailing().map(<[u8]>::to_vec).unwrap_or_default())
    }
}

/// NRC 0x78 for this request's service
fn is_response_pending_for(message: &UdsMessage, request: &UdsMessage) -> bool {
    message.echoed_service_id() == Some(request.service_id())
        && message.negative_response_code() == Some(NegativeResponseCode::ResponsePending)
}
