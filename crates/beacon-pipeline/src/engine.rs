//! TelemetryEngine — the public API surface of the pipeline.
//!
//! One explicit instance per process, constructed at startup and shared via
//! `Arc`; there is no ambient global state. Every method returns a `bool`
//! or a safe default — a telemetry failure is never the host's problem.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;

use beacon_core::config::TelemetryConfig;
use beacon_core::event::{QueueStatus, QueuedEvent, SendOptions};
use beacon_core::traits::{EnvironmentProbe, KeyValueStore, Transport};

use crate::context::ContextBuilder;
use crate::dedup::DedupGate;
use crate::delivery::DeliveryEngine;
use crate::queue::EventQueueStore;
use crate::storage::SafeStorage;

/// Orchestrates the dedup gate, context builder, queue store, and delivery
/// engine behind the public send/drain/status operations.
#[derive(Debug)]
pub struct TelemetryEngine<S, T, P> {
    config: TelemetryConfig,
    context: ContextBuilder<S, P>,
    dedup: DedupGate<S>,
    queue: EventQueueStore<S>,
    delivery: DeliveryEngine<T>,
    /// Re-entrancy guard: at most one drain body runs at a time.
    processing: AtomicBool,
}

impl<S, T, P> TelemetryEngine<S, T, P>
where
    S: KeyValueStore + 'static,
    T: Transport,
    P: EnvironmentProbe,
{
    /// Build the engine from its collaborators. Probes the transport's
    /// one-way capability once, here, and never again.
    pub fn new(config: TelemetryConfig, store: S, transport: T, probe: P) -> Self {
        let storage = Arc::new(SafeStorage::new(store));
        let probe = Arc::new(probe);
        let transport = Arc::new(transport);

        let context = ContextBuilder::new(
            Arc::clone(&storage),
            Arc::clone(&probe),
            config.site_id.clone(),
            config.storage_keys.user_id.clone(),
        );
        let dedup = DedupGate::new(
            Arc::clone(&storage),
            config.dedup.clone(),
            config.storage_keys.dedup.clone(),
        );
        let queue = EventQueueStore::new(
            Arc::clone(&storage),
            config.storage_keys.queue.clone(),
            config.queue.max_size,
        );
        let delivery = DeliveryEngine::new(
            transport,
            config.endpoint.clone(),
            config.retry.clone(),
            config.request_timeout_ms,
        );

        tracing::info!(
            "telemetry: engine ready (site {}, strategy {:?})",
            config.site_id,
            delivery.strategy()
        );
        Self {
            config,
            context,
            dedup,
            queue,
            delivery,
            processing: AtomicBool::new(false),
        }
    }

    /// Send a named event.
    ///
    /// Returns `false` when the dedup gate blocks it or an immediate
    /// delivery exhausts its retries. A queued send returns `true` as soon
    /// as the event is handed to the queue — hand-off, not delivery
    /// confirmation.
    pub async fn send_event(
        &self,
        name: &str,
        props: Option<Value>,
        options: SendOptions,
    ) -> bool {
        if !options.skip_dedup && self.dedup.is_duplicate(name, props.as_ref()).await {
            return false;
        }

        let data = self.context.build_event_data(props.as_ref()).await;

        if options.immediate {
            let event = self.context.wire_event(name, data);
            let sent = self
                .delivery
                .send_with_retry(&event, options.max_retries, options.timeout_ms)
                .await;
            if sent {
                self.dedup.record_sent(name, props.as_ref()).await;
                // Opportunistic sweep of stale dedup records, off the caller's
                // path.
                let gate = self.dedup.clone();
                tokio::spawn(async move { gate.cleanup_records().await });
            }
            sent
        } else {
            self.queue
                .enqueue(QueuedEvent::new(name, data, Utc::now().timestamp_millis()))
                .await;
            true
        }
    }

    /// Build and deliver several events as one batch payload.
    pub async fn send_events_batch(&self, events: &[(&str, Option<Value>)]) -> bool {
        if events.is_empty() {
            return true;
        }
        let mut wire = Vec::with_capacity(events.len());
        for (name, props) in events {
            let data = self.context.build_event_data(props.as_ref()).await;
            wire.push(self.context.wire_event(name, data));
        }
        self.delivery.send_batch(&wire).await
    }

    /// Drain the persisted queue in batches.
    ///
    /// No-op when a drain is already in flight. Failed batches increment
    /// every contained event's `retry_count`; events at the attempt limit
    /// are discarded with a log, survivors are persisted back wholesale.
    pub async fn process_event_queue(&self) {
        if self.processing.swap(true, Ordering::AcqRel) {
            tracing::debug!("telemetry: drain already in progress, skipping");
            return;
        }
        // Cleared on drop, not by a trailing store: a drain cancelled at an
        // await point (scheduler shutdown) must not leave the guard set or
        // every later drain would be a silent no-op.
        let _guard = DrainGuard {
            flag: &self.processing,
        };

        let events = self.queue.load().await;
        if events.is_empty() {
            return;
        }

        let max_attempts = self.config.retry.max_attempts;
        let mut delivered = 0usize;
        let mut discarded = 0usize;
        let mut survivors: Vec<QueuedEvent> = Vec::new();

        for chunk in events.chunks(self.config.queue.batch_size) {
            let wire: Vec<_> = chunk
                .iter()
                .map(|ev| self.context.wire_event(&ev.name, ev.data.clone()))
                .collect();
            if self.delivery.send_batch(&wire).await {
                delivered += chunk.len();
            } else {
                for event in chunk {
                    let mut event = event.clone();
                    event.retry_count += 1;
                    if event.retry_count < max_attempts {
                        survivors.push(event);
                    } else {
                        discarded += 1;
                        tracing::warn!(
                            "telemetry: discarding event {} after {} failed deliveries",
                            event.name,
                            event.retry_count
                        );
                    }
                }
            }
        }

        self.queue.persist(&survivors).await;
        tracing::info!(
            "telemetry: drain complete ({delivered} delivered, {} retrying, {discarded} discarded)",
            survivors.len()
        );
    }

    /// Reset the persisted queue, unconditionally.
    pub async fn clear_event_queue(&self) -> bool {
        self.queue.clear().await
    }

    /// Observability snapshot: length, drain flag, oldest/newest timestamps.
    pub async fn queue_status(&self) -> QueueStatus {
        let events = self.queue.load().await;
        QueueStatus {
            length: events.len(),
            processing: self.processing.load(Ordering::Acquire),
            oldest_event: events.first().map(|ev| ev.queued_at),
            newest_event: events.last().map(|ev| ev.queued_at),
        }
    }

    /// The configuration this engine was built with.
    pub fn config(&self) -> &TelemetryConfig {
        &self.config
    }
}

/// Releases the drain guard even when the drain future is dropped mid-way.
struct DrainGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
