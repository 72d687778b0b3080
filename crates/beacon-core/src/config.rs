//! Telemetry subsystem configuration.
//!
//! The host application constructs one of these at startup and hands it to
//! the engine; nothing here is read from disk.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::constants;

/// Configuration for the telemetry pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Collector site identifier, attached to every wire event.
    pub site_id: String,
    /// Collector endpoint URL.
    pub endpoint: String,
    /// Timeout for the cancellable transport call (ms).
    pub request_timeout_ms: u64,
    /// Retry/backoff settings shared by immediate sends and the batch path.
    pub retry: RetryConfig,
    /// Persisted queue settings.
    pub queue: QueueConfig,
    /// Deduplication settings.
    pub dedup: DedupConfig,
    /// Storage key names, overridable so two pipelines can share one store.
    pub storage_keys: StorageKeys,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            site_id: String::new(),
            endpoint: String::new(),
            request_timeout_ms: constants::DEFAULT_REQUEST_TIMEOUT_MS,
            retry: RetryConfig::default(),
            queue: QueueConfig::default(),
            dedup: DedupConfig::default(),
            storage_keys: StorageKeys::default(),
        }
    }
}

/// Retry and backoff settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum delivery attempts. Doubles as the batch-path lifetime: an
    /// event whose `retry_count` reaches this is discarded.
    pub max_attempts: u32,
    /// Base backoff delay (ms); doubles each attempt.
    pub base_delay_ms: u64,
    /// Backoff ceiling (ms).
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: constants::DEFAULT_MAX_ATTEMPTS,
            base_delay_ms: constants::DEFAULT_BASE_DELAY_MS,
            max_delay_ms: constants::DEFAULT_MAX_DELAY_MS,
        }
    }
}

/// Persisted queue settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    /// Maximum queued events; insertion beyond this drops the oldest.
    pub max_size: usize,
    /// Events per batch during a drain.
    pub batch_size: usize,
    /// Interval between scheduled drains (ms).
    pub process_interval_ms: u64,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            max_size: constants::DEFAULT_QUEUE_MAX_SIZE,
            batch_size: constants::DEFAULT_BATCH_SIZE,
            process_interval_ms: constants::DEFAULT_PROCESS_INTERVAL_MS,
        }
    }
}

/// Deduplication settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DedupConfig {
    /// Per-kind dedup windows (ms). Kinds not listed use the default.
    pub intervals: HashMap<String, u64>,
    /// Dedup window for kinds without an override (ms).
    pub default_interval_ms: u64,
    /// Age past which a dedup record is swept, independent of any
    /// per-kind window (ms).
    pub cleanup_interval_ms: u64,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            intervals: HashMap::new(),
            default_interval_ms: constants::DEFAULT_DEDUP_INTERVAL_MS,
            cleanup_interval_ms: constants::DEFAULT_DEDUP_CLEANUP_MS,
        }
    }
}

impl DedupConfig {
    /// Dedup window for the given event kind (ms).
    pub fn interval_for(&self, name: &str) -> u64 {
        self.intervals
            .get(name)
            .copied()
            .unwrap_or(self.default_interval_ms)
    }
}

/// Storage key names for the persisted state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageKeys {
    pub user_id: String,
    pub queue: String,
    pub dedup: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            user_id: constants::KEY_USER_ID.to_string(),
            queue: constants::KEY_EVENT_QUEUE.to_string(),
            dedup: constants::KEY_DEDUP_RECORDS.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_falls_back_to_default() {
        let mut cfg = DedupConfig::default();
        cfg.intervals.insert("copy".into(), 2_000);
        assert_eq!(cfg.interval_for("copy"), 2_000);
        assert_eq!(cfg.interval_for("never_seen"), cfg.default_interval_ms);
    }

    #[test]
    fn config_deserializes_from_partial_json() {
        let cfg: TelemetryConfig =
            serde_json::from_str(r#"{"site_id":"site-1","queue":{"max_size":5}}"#).unwrap();
        assert_eq!(cfg.site_id, "site-1");
        assert_eq!(cfg.queue.max_size, 5);
        // Unspecified sections keep their defaults.
        assert_eq!(cfg.queue.batch_size, crate::constants::DEFAULT_BATCH_SIZE);
        assert_eq!(cfg.retry.max_attempts, crate::constants::DEFAULT_MAX_ATTEMPTS);
    }
}
