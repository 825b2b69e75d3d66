//! Mock transport for testing
//!
//! Every sent request is looked up in a scripted table; the matching
//! response frames are queued for `receive`. Unscripted requests get the
//! bare positive response `service_id + 0x40`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use tokio::sync::{mpsc, Mutex};

use super::{Transport, TransportError};
use crate::config::MockConfig;

/// Scripted in-memory ECU
pub struct MockTransport {
    config: MockConfig,
    connected: AtomicBool,
    inbound_tx: mpsc::UnboundedSender<Vec<u8>>,
    inbound_rx: Mutex<mpsc::UnboundedReceiver<Vec<u8>>>,
    /// Request prefix -> response frames, in the order they are delivered
    responses: RwLock<Vec<(Vec<u8>, Vec<Vec<u8>>)>>,
    sent: RwLock<Vec<Vec<u8>>>,
}

impl MockTransport {
    pub fn new(config: &MockConfig) -> Self {
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        Self {
            config: config.clone(),
            connected: AtomicBool::new(true),
            inbound_tx,
            inbound_rx: Mutex::new(inbound_rx),
            responses: RwLock::new(Self::default_responses()),
            sent: RwLock::new(Vec::new()),
        }
    }

    /// Script a single response for a request (prefix match)
    pub fn add_response(&self, request: Vec<u8>, response: Vec<u8>) {
        self.add_responses(request, vec![response]);
    }

    /// Script several frames for one request, e.g. response pending then final.
    /// An empty list means the ECU stays silent.
    pub fn add_responses(&self, request: Vec<u8>, responses: Vec<Vec<u8>>) {
        // Newer scripts win over older ones for the same request
        self.responses.write().insert(0, (request, responses));
    }

    /// Queue a frame the ECU sends on its own (periodic data, late responses)
    pub fn inject_incoming(&self, data: Vec<u8>) {
        let _ = self.inbound_tx.send(data);
    }

    /// Set connection state
    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }

    /// Every frame sent so far
    pub fn sent_frames(&self) -> Vec<Vec<u8>> {
        self.sent.read().clone()
    }

    fn default_responses() -> Vec<(Vec<u8>, Vec<Vec<u8>>)> {
        vec![
            // Diagnostic Session Control - Default (0x10 01 -> 0x50 01 + P2/P2* timing)
            (vec![0x10, 0x01], vec![vec![0x50, 0x01, 0x00, 0x19, 0x01, 0xF4]]),
            // Diagnostic Session Control - Extended (0x10 03 -> 0x50 03)
            (vec![0x10, 0x03], vec![vec![0x50, 0x03, 0x00, 0x19, 0x01, 0xF4]]),
            // Tester Present (0x3E 00 -> 0x7E 00)
            (vec![0x3E, 0x00], vec![vec![0x7E, 0x00]]),
            // Tester Present suppress response (0x3E 80 -> silence)
            (vec![0x3E, 0x80], vec![]),
            // ReadDataByIdentifier - VIN (0x22 F1 90 -> 0x62 F1 90 + 17-byte VIN)
            (vec![0x22, 0xF1, 0x90], {
                let mut resp = vec![0x62, 0xF1, 0x90];
                resp.extend_from_slice(b"1HGCM82633A123456"); // 17-char mock VIN
                vec![resp]
            }),
            // ReadDataByIdentifier - ECU HW Number (0x22 F1 91)
            (vec![0x22, 0xF1, 0x91], {
                let mut resp = vec![0x62, 0xF1, 0x91];
                resp.extend_from_slice(b"HW-12345");
                vec![resp]
            }),
            // Security Access - level 1 seed (0x27 01 -> 0x67 01 + seed)
            (vec![0x27, 0x01], vec![vec![0x67, 0x01, 0x12, 0x34, 0x56, 0x78]]),
            // Security Access - level 1 key (0x27 02 ... -> 0x67 02)
            (vec![0x27, 0x02], vec![vec![0x67, 0x02]]),
            // ClearDiagnosticInformation (0x14 FF FF FF -> 0x54)
            (vec![0x14, 0xFF, 0xFF, 0xFF], vec![vec![0x54]]),
            // RoutineControl - Start (0x31 01 FF 00 -> 0x71 01 FF 00 + status)
            (
                vec![0x31, 0x01, 0xFF, 0x00],
                vec![vec![0x71, 0x01, 0xFF, 0x00, 0x00]],
            ),
        ]
    }

    fn find_responses(&self, request: &[u8]) -> Vec<Vec<u8>> {
        let responses = self.responses.read();

        // First try exact match
        if let Some((_, frames)) = responses.iter().find(|(req, _)| req == request) {
            return frames.clone();
        }

        // Then try prefix match for variable-length requests
        if let Some((_, frames)) = responses.iter().find(|(req, _)| request.starts_with(req)) {
            return frames.clone();
        }

        // Positive response = service_id + 0x40
        match request.first() {
            Some(service_id) => vec![vec![service_id.wrapping_add(0x40)]],
            None => Vec::new(),
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, data: &[u8]) -> Result<(), TransportError> {
        if !self.connected.load(Ordering::SeqCst) {
            return Err(TransportError::ConnectionClosed);
        }

        // Simulate latency
        if self.config.latency_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.config.latency_ms)).await;
        }

        tracing::debug!(request = %hex::encode_upper(data), "Mock transport: sent message");
        self.sent.write().push(data.to_vec());
        for frame in self.find_responses(data) {
            self.inbound_tx
                .send(frame)
                .map_err(|e| TransportError::SendFailed(e.to_string()))?;
        }
        Ok(())
    }

    async fn receive(&self, timeout: Duration) -> Result<Vec<u8>, TransportError> {
        if !self.connected.load(Ordering::SeqCst) {
            return Err(TransportError::ConnectionClosed);
        }

        let mut inbound = self.inbound_rx.lock().await;
        match tokio::time::timeout(timeout, inbound.recv()).await {
            Ok(Some(frame)) => Ok(frame),
            Ok(None) => Err(TransportError::ConnectionClosed),
            Err(_) => Err(TransportError::Timeout(format!(
                "no frame within {} ms",
                timeout.as_millis()
            ))),
        }
    }

    async fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_response() {
        let mock = MockTransport::new(&MockConfig::default());
        mock.send(&[0x22, 0xF1, 0x90]).await.unwrap();
        let frame = mock.receive(Duration::from_millis(100)).await.unwrap();
        assert_eq!(&frame[..3], &[0x62, 0xF1, 0x90]);
        assert_eq!(mock.sent_frames(), vec![vec![0x22, 0xF1, 0x90]]);
    }

    #[tokio::test]
    async fn test_default_positive_response() {
        let mock = MockTransport::new(&MockConfig::default());
        mock.send(&[0x11, 0x01]).await.unwrap();
        assert_eq!(
            mock.receive(Duration::from_millis(100)).await.unwrap(),
            vec![0x51]
        );
    }

    #[tokio::test]
    async fn test_silence_times_out() {
        let mock = MockTransport::new(&MockConfig::default());
        mock.send(&[0x3E, 0x80]).await.unwrap();
        assert!(matches!(
            mock.receive(Duration::from_millis(20)).await,
            Err(TransportError::Timeout(_))
        ));
    }

    #[tokio::test]
    async fn test_disconnected() {
        let mock = MockTransport::new(&MockConfig::default());
        mock.set_connected(false);
        assert!(!mock.is_connected().await);
        assert!(matches!(
            mock.send(&[0x3E, 0x00]).await,
            Err(TransportError::ConnectionClosed)
        ));
    }

    #[tokio::test]
    async fn test_newer_script_wins() {
        let mock = MockTransport::new(&MockConfig::default());
        mock.add_response(vec![0x3E, 0x00], vec![0x7F, 0x3E, 0x22]);
        mock.send(&[0x3E, 0x00]).await.unwrap();
        assert_eq!(
            mock.receive(Duration::from_millis(100)).await.unwrap(),
            vec![0x7F, 0x3E, 0x22]
        );
    }
}
