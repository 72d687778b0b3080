//! HTTP transport over reqwest.
//!
//! The retry loop lives in the delivery engine, not here: this layer only
//! knows how to hand one body to the collector, either as a detached
//! one-way send or as a timeout-bounded request/response call.

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;

use beacon_core::errors::{TelemetryError, TelemetryResult};
use beacon_core::traits::Transport;

/// Production transport. Both strategies POST JSON to the collector
/// endpoint; the one-way strategy reports hand-off, not delivery.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Transport for HttpTransport {
    fn supports_beacon(&self) -> bool {
        true
    }

    async fn send_beacon(&self, endpoint: &str, body: Vec<u8>) -> bool {
        let request = self
            .client
            .post(endpoint)
            .header(CONTENT_TYPE, "application/json")
            .body(body);
        // Detached: the send outlives the caller, and its outcome is only
        // ever a debug log.
        tokio::spawn(async move {
            match request.send().await {
                Ok(resp) if !resp.status().is_success() => {
                    tracing::debug!("telemetry: beacon send got HTTP {}", resp.status());
                }
                Ok(_) => {}
                Err(e) => tracing::debug!("telemetry: beacon send failed: {e}"),
            }
        });
        true
    }

    async fn send_request(
        &self,
        endpoint: &str,
        body: Vec<u8>,
        timeout: Duration,
    ) -> TelemetryResult<()> {
        let resp = self
            .client
            .post(endpoint)
            .header(CONTENT_TYPE, "application/json")
            .timeout(timeout)
            .body(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TelemetryError::Timeout {
                        ms: timeout.as_millis() as u64,
                    }
                } else {
                    TelemetryError::Network {
                        reason: e.to_string(),
                    }
                }
            })?;

        if resp.status().is_success() {
            Ok(())
        } else {
            Err(TelemetryError::Network {
                reason: format!("HTTP {}", resp.status()),
            })
        }
    }
}
