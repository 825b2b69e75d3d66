//! Periodic tester present
//!
//! Keeps a non-default session alive by sending TesterPresent (0x3E) on a
//! fixed interval. Each cycle waits a bounded time for the answer and then
//! moves on; failures are logged, never escalated.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error};
use uds_proto::constants::{service_id, tester_present};
use uds_proto::UdsMessage;

use crate::client::UdsClient;
use crate::config::KeepaliveConfig;

/// Handle to a running keepalive task
///
/// Stopping is cooperative: the stop signal is checked between cycles, so a
/// tester present already on the wire completes normally.
pub struct PeriodicKeepAlive {
    stop_tx: watch::Sender<bool>,
    handle: Option<JoinHandle<()>>,
}

impl PeriodicKeepAlive {
    /// Start sending tester present through `client`
    ///
    /// Returns `None` when keepalive is disabled in `config`.
    pub fn start(client: Arc<UdsClient>, config: &KeepaliveConfig) -> Option<Self> {
        if !config.enabled {
            return None;
        }

        let (stop_tx, mut stop_rx) = watch::channel(false);
        let interval = Duration::from_millis(config.interval_ms);
        let response_timeout = Duration::from_millis(config.response_timeout_ms);
        let suppress_response = config.suppress_response;

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // A cycle that outlasts the interval must not trigger a catch-up burst
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let request = UdsMessage::new(service_id::TESTER_PRESENT).with(
                "subFunction",
                if suppress_response {
                    tester_present::SUPPRESS_POSITIVE_RESPONSE
                } else {
                    tester_present::ZERO_SUB_FUNCTION
                },
            );

            loop {
                tokio::select! {
                    _ = ticker.tick() => {}
                    _ = stop_rx.changed() => break,
                }
                if *stop_rx.borrow() {
                    break;
                }

                if suppress_response {
                    if let Err(e) = client.send_only(&request).await {
                        error!(?e, "Tester present send failed");
                    }
                } else {
                    match client.request_within(&request, response_timeout).await {
                        Ok(_) => {
                            debug!("Tester present OK");
                        }
                        Err(e) => {
                            error!(?e, "Tester present failed");
                        }
                    }
                }
            }
            debug!("Keepalive stopped");
        });

        debug!(interval_ms = config.interval_ms, "Keepalive started");
        Some(Self {
            stop_tx,
            handle: Some(handle),
        })
    }

    /// Signal the task to stop and wait for the current cycle to finish
    pub async fn stop(mut self) {
        let _ = self.stop_tx.send(true);
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                error!(?e, "Keepalive task ended abnormally");
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for PeriodicKeepAlive {
    fn drop(&mut self) {
        // Dropped without stop(): let the task exit at its next check
        let _ = self.stop_tx.send(true);
    }
}
