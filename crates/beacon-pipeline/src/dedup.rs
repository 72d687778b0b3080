//! Deduplication gate — suppresses near-duplicate events.
//!
//! A dedup key is the event kind plus a small fixed set of identifying
//! fields for that kind. Last-sent times are kept in one persisted JSON
//! object. Lookups fail open: a broken store must never suppress a
//! legitimately new event, and nothing here ever throws at a caller.

use std::sync::Arc;

use chrono::Utc;
use serde_json::{json, Map, Value};

use beacon_core::config::DedupConfig;
use beacon_core::traits::KeyValueStore;

use crate::storage::SafeStorage;

/// Identifying fields per event kind. Kinds not listed key on name alone.
const IDENTIFYING_FIELDS: &[(&str, &[&str])] = &[
    ("copy", &["format", "source"]),
    ("error", &["error_type", "component"]),
];

/// Gate over the persisted last-sent map.
#[derive(Debug)]
pub struct DedupGate<S> {
    storage: Arc<SafeStorage<S>>,
    config: DedupConfig,
    record_key: String,
    /// Serializes the record-map read-modify-writes: `record_sent` and the
    /// sweep run as separate tasks, and an unguarded interleaving could
    /// persist a map that drops a just-recorded entry.
    write_lock: Arc<tokio::sync::Mutex<()>>,
}

// Manual Clone: the gate is cloned into the spawned sweep task, and a
// derived impl would demand S: Clone.
impl<S> Clone for DedupGate<S> {
    fn clone(&self) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
            config: self.config.clone(),
            record_key: self.record_key.clone(),
            write_lock: Arc::clone(&self.write_lock),
        }
    }
}

impl<S: KeyValueStore> DedupGate<S> {
    pub fn new(storage: Arc<SafeStorage<S>>, config: DedupConfig, record_key: String) -> Self {
        Self {
            storage,
            config,
            record_key,
            write_lock: Arc::new(tokio::sync::Mutex::new(())),
        }
    }

    /// Whether an equivalent event was sent within its kind's window.
    ///
    /// Fails open: any lookup problem reads as "not a duplicate".
    pub async fn is_duplicate(&self, name: &str, data: Option<&Value>) -> bool {
        let key = dedup_key(name, data);
        let records = self.load_records().await;
        let Some(last_sent) = records.get(&key).and_then(Value::as_i64) else {
            return false;
        };
        let elapsed = Utc::now().timestamp_millis() - last_sent;
        let window = self.config.interval_for(name) as i64;
        if elapsed < window {
            tracing::debug!("telemetry: suppressing duplicate {key} ({elapsed}ms since last)");
            return true;
        }
        false
    }

    /// Record a successful send under the derived key. Best effort.
    pub async fn record_sent(&self, name: &str, data: Option<&Value>) {
        let key = dedup_key(name, data);
        let _guard = self.write_lock.lock().await;
        let mut records = self.load_records().await;
        records.insert(key, json!(Utc::now().timestamp_millis()));
        self.storage
            .safe_set(&self.record_key, Value::Object(records))
            .await;
    }

    /// Sweep records older than the cleanup horizon. The horizon is fixed
    /// and independent of any per-kind window, so stale keys cannot
    /// accumulate for rarely-fired kinds.
    pub async fn cleanup_records(&self) {
        let _guard = self.write_lock.lock().await;
        let records = self.load_records().await;
        if records.is_empty() {
            return;
        }
        let now = Utc::now().timestamp_millis();
        let horizon = self.config.cleanup_interval_ms as i64;
        let before = records.len();
        let kept: Map<String, Value> = records
            .into_iter()
            .filter(|(_, last_sent)| {
                last_sent
                    .as_i64()
                    .is_some_and(|ts| now.saturating_sub(ts) <= horizon)
            })
            .collect();
        let removed = before - kept.len();
        if removed > 0 {
            tracing::debug!("telemetry: swept {removed} stale dedup records");
            self.storage
                .safe_set(&self.record_key, Value::Object(kept))
                .await;
        }
    }

    async fn load_records(&self) -> Map<String, Value> {
        let stored = self.storage.safe_get(&[&self.record_key]).await;
        match stored.get(&self.record_key) {
            Some(Value::Object(map)) => map.clone(),
            _ => Map::new(),
        }
    }
}

/// Derive the dedup key for an event: the kind, then the values of its
/// identifying fields in declared order. Missing fields contribute an
/// empty segment so that `copy(format=md)` and `copy(source=md)` differ.
pub fn dedup_key(name: &str, data: Option<&Value>) -> String {
    let fields = IDENTIFYING_FIELDS
        .iter()
        .find(|(kind, _)| *kind == name)
        .map(|(_, fields)| *fields)
        .unwrap_or_default();

    let mut key = name.to_string();
    for field in fields {
        key.push(':');
        if let Some(value) = data.and_then(|d| d.get(field)) {
            match value {
                Value::String(s) => key.push_str(s),
                other => key.push_str(&other.to_string()),
            }
        }
    }
    key
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn key_uses_identifying_fields_for_known_kinds() {
        let data = json!({"format": "markdown", "source": "toolbar", "extra": "x"});
        assert_eq!(dedup_key("copy", Some(&data)), "copy:markdown:toolbar");
    }

    #[test]
    fn key_is_name_only_for_unknown_kinds() {
        let data = json!({"anything": "goes"});
        assert_eq!(dedup_key("install", Some(&data)), "install");
    }

    #[test]
    fn missing_fields_leave_empty_segments() {
        let data = json!({"format": "markdown"});
        assert_eq!(dedup_key("copy", Some(&data)), "copy:markdown:");
        assert_eq!(dedup_key("copy", None), "copy::");
    }

    #[test]
    fn non_string_field_values_are_rendered() {
        let data = json!({"error_type": 404, "component": "popup"});
        assert_eq!(dedup_key("error", Some(&data)), "error:404:popup");
    }
}
