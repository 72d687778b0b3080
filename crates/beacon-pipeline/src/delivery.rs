//! Delivery engine — sends one event or a batch to the collector.
//!
//! Immediate sends always use the cancellable request/response strategy so
//! timing is observable, retried with exponential backoff up to a ceiling.
//! Batch sends prefer the fire-and-forget strategy when the transport
//! supports it, because it tolerates the host being torn down mid-flight,
//! and fall back to the cancellable call when the hand-off fails.

use std::sync::Arc;
use std::time::Duration;

use beacon_core::config::RetryConfig;
use beacon_core::event::WireEvent;
use beacon_core::traits::Transport;

/// Which transport strategy a batch send uses. Frozen at engine
/// construction from a single capability probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryStrategy {
    /// One-way best-effort send, with request/response fallback.
    Beacon,
    /// Cancellable request/response only.
    Request,
}

/// Sends wire events over a [`Transport`].
#[derive(Debug)]
pub struct DeliveryEngine<T> {
    transport: Arc<T>,
    endpoint: String,
    retry: RetryConfig,
    request_timeout_ms: u64,
    strategy: DeliveryStrategy,
}

impl<T: Transport> DeliveryEngine<T> {
    pub fn new(
        transport: Arc<T>,
        endpoint: String,
        retry: RetryConfig,
        request_timeout_ms: u64,
    ) -> Self {
        let strategy = if transport.supports_beacon() {
            DeliveryStrategy::Beacon
        } else {
            DeliveryStrategy::Request
        };
        tracing::debug!("telemetry: batch delivery strategy {strategy:?}");
        Self {
            transport,
            endpoint,
            retry,
            request_timeout_ms,
            strategy,
        }
    }

    /// The strategy chosen at construction.
    pub fn strategy(&self) -> DeliveryStrategy {
        self.strategy
    }

    /// Deliver one event with retry and exponential backoff.
    ///
    /// Always the request/response strategy; returns `true` on the first
    /// successful attempt, `false` once attempts are exhausted.
    pub async fn send_with_retry(
        &self,
        event: &WireEvent,
        max_retries: Option<u32>,
        timeout_ms: Option<u64>,
    ) -> bool {
        let attempts = max_retries.unwrap_or(self.retry.max_attempts).max(1);
        let timeout = Duration::from_millis(timeout_ms.unwrap_or(self.request_timeout_ms));
        let Ok(body) = serde_json::to_vec(event) else {
            tracing::warn!("telemetry: could not serialize event {}", event.name);
            return false;
        };

        for attempt in 1..=attempts {
            match self
                .transport
                .send_request(&self.endpoint, body.clone(), timeout)
                .await
            {
                Ok(()) => return true,
                Err(e) => {
                    tracing::debug!(
                        "telemetry: send of {} failed (attempt {attempt}/{attempts}): {e}",
                        event.name
                    );
                }
            }
            if attempt < attempts {
                tokio::time::sleep(backoff_delay(
                    attempt,
                    self.retry.base_delay_ms,
                    self.retry.max_delay_ms,
                ))
                .await;
            }
        }
        tracing::warn!(
            "telemetry: dropping event {} after {attempts} attempts",
            event.name
        );
        false
    }

    /// Deliver a batch as one multi-event payload.
    pub async fn send_batch(&self, events: &[WireEvent]) -> bool {
        if events.is_empty() {
            return true;
        }
        let Ok(body) = serde_json::to_vec(events) else {
            tracing::warn!("telemetry: could not serialize batch of {}", events.len());
            return false;
        };

        if self.strategy == DeliveryStrategy::Beacon {
            if self.transport.send_beacon(&self.endpoint, body.clone()).await {
                return true;
            }
            tracing::debug!("telemetry: beacon hand-off failed, falling back to request");
        }

        let timeout = Duration::from_millis(self.request_timeout_ms);
        match self
            .transport
            .send_request(&self.endpoint, body, timeout)
            .await
        {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!("telemetry: batch of {} failed: {e}", events.len());
                false
            }
        }
    }
}

/// Backoff before the attempt after `attempt` (1-indexed):
/// `min(base * 2^(attempt-1), max)`.
pub fn backoff_delay(attempt: u32, base_ms: u64, max_ms: u64) -> Duration {
    let factor = 1u64.checked_shl(attempt.saturating_sub(1)).unwrap_or(u64::MAX);
    let delay = base_ms.saturating_mul(factor).min(max_ms);
    Duration::from_millis(delay)
}
