//! Event types — queued form, wire form, and the public status/option shapes.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A not-yet-delivered event, persisted in the queue between drains.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueuedEvent {
    /// Event kind, e.g. `copy` or `error`.
    pub name: String,
    /// Event properties as built when the send was requested: the common
    /// `$`-prefixed context merged with the sanitized custom properties.
    pub data: Map<String, Value>,
    /// When the event entered the queue (epoch ms).
    pub queued_at: i64,
    /// Failed batch deliveries so far. The event is dropped once this
    /// reaches the configured maximum.
    #[serde(default)]
    pub retry_count: u32,
}

impl QueuedEvent {
    pub fn new(name: impl Into<String>, data: Map<String, Value>, queued_at: i64) -> Self {
        Self {
            name: name.into(),
            data,
            queued_at,
            retry_count: 0,
        }
    }
}

/// Wire form of an event, built at send time and never persisted.
///
/// `data` carries the common `$`-prefixed context (`$user_id`, `$timestamp`,
/// `$time`, `$date`, `$platform`, `$browser`, `$version`) merged with the
/// sanitized custom properties. Batch payloads are a JSON array of these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireEvent {
    /// Collector site identifier.
    pub website: String,
    /// Event kind.
    pub name: String,
    /// Common context merged with sanitized custom properties.
    pub data: Map<String, Value>,
    /// BCP 47 locale tag of the host environment.
    pub language: String,
}

/// Observability snapshot of the persisted queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueueStatus {
    /// Number of events currently persisted.
    pub length: usize,
    /// Whether a drain is in flight right now.
    pub processing: bool,
    /// `queued_at` of the oldest event, if any (epoch ms).
    pub oldest_event: Option<i64>,
    /// `queued_at` of the newest event, if any (epoch ms).
    pub newest_event: Option<i64>,
}

/// Per-call options for `send_event`.
#[derive(Debug, Clone, Default)]
pub struct SendOptions {
    /// Deliver now with retry instead of queueing for the next drain.
    pub immediate: bool,
    /// Bypass the deduplication gate.
    pub skip_dedup: bool,
    /// Override the configured retry attempt count (immediate sends only).
    pub max_retries: Option<u32>,
    /// Override the configured request timeout in ms (immediate sends only).
    pub timeout_ms: Option<u64>,
}

impl SendOptions {
    /// Queue the event for the next scheduled drain. Same as `default()`.
    pub fn queued() -> Self {
        Self::default()
    }

    /// Deliver immediately with retry.
    pub fn immediate() -> Self {
        Self {
            immediate: true,
            ..Self::default()
        }
    }
}
