//! Event queue store — a bounded, persisted FIFO of undelivered events.
//!
//! The queue is persisted wholesale under one storage key. Insertion beyond
//! capacity drops the oldest element, never the incoming one. All reads
//! degrade to an empty queue; all writes report best-effort booleans.

use std::sync::Arc;

use serde_json::Value;

use beacon_core::event::QueuedEvent;
use beacon_core::traits::KeyValueStore;

use crate::storage::SafeStorage;

/// Persisted FIFO over the safe storage adapter.
#[derive(Debug)]
pub struct EventQueueStore<S> {
    storage: Arc<SafeStorage<S>>,
    queue_key: String,
    max_size: usize,
}

impl<S: KeyValueStore> EventQueueStore<S> {
    pub fn new(storage: Arc<SafeStorage<S>>, queue_key: String, max_size: usize) -> Self {
        Self {
            storage,
            queue_key,
            max_size,
        }
    }

    /// The persisted queue, or empty if storage is missing or unreadable.
    pub async fn load(&self) -> Vec<QueuedEvent> {
        let stored = self.storage.safe_get(&[&self.queue_key]).await;
        let Some(raw) = stored.get(&self.queue_key) else {
            return Vec::new();
        };
        match serde_json::from_value::<Vec<QueuedEvent>>(raw.clone()) {
            Ok(events) => events,
            Err(e) => {
                tracing::warn!("telemetry: persisted queue unreadable, starting empty: {e}");
                Vec::new()
            }
        }
    }

    /// Append an event, dropping the oldest first when at capacity.
    /// Read-modify-write; the engine's drain guard is what keeps overlapping
    /// mutations out in practice.
    pub async fn enqueue(&self, event: QueuedEvent) -> bool {
        let mut events = self.load().await;
        while events.len() >= self.max_size {
            let dropped = events.remove(0);
            tracing::warn!(
                "telemetry: queue full, dropping oldest event {} from {}",
                dropped.name,
                dropped.queued_at
            );
        }
        events.push(event);
        self.persist(&events).await
    }

    /// Replace the persisted queue contents wholesale.
    pub async fn persist(&self, events: &[QueuedEvent]) -> bool {
        match serde_json::to_value(events) {
            Ok(value) => self.storage.safe_set(&self.queue_key, value).await,
            Err(e) => {
                tracing::warn!("telemetry: could not serialize queue: {e}");
                false
            }
        }
    }

    /// Persist an empty queue, unconditionally.
    pub async fn clear(&self) -> bool {
        self.storage
            .safe_set(&self.queue_key, Value::Array(Vec::new()))
            .await
    }
}
