//! Safe storage adapter — bounded retry over the host's key-value store.
//!
//! Every operation retries a fixed number of times with a linearly
//! increasing delay, then degrades: `safe_get` to an empty map,
//! `safe_set`/`safe_remove` to `false`. Callers treat the result as best
//! effort and never assume persistence succeeded.

use std::time::Duration;

use serde_json::{Map, Value};

use beacon_core::constants::{STORAGE_RETRY_ATTEMPTS, STORAGE_RETRY_DELAY_MS};
use beacon_core::traits::KeyValueStore;

/// Retry wrapper around a [`KeyValueStore`].
#[derive(Debug)]
pub struct SafeStorage<S> {
    store: S,
    attempts: u32,
    delay_ms: u64,
}

impl<S: KeyValueStore> SafeStorage<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            attempts: STORAGE_RETRY_ATTEMPTS,
            delay_ms: STORAGE_RETRY_DELAY_MS,
        }
    }

    /// Fetch values for `keys`, retrying. Empty map once retries are
    /// exhausted — absent keys and a broken store look the same to callers.
    pub async fn safe_get(&self, keys: &[&str]) -> Map<String, Value> {
        let mut last_err = String::new();
        for attempt in 1..=self.attempts {
            match self.store.get(keys).await {
                Ok(map) => return map,
                Err(e) => last_err = e.to_string(),
            }
            self.wait(attempt).await;
        }
        tracing::warn!(
            "telemetry: storage get failed after {} attempts: {last_err}",
            self.attempts
        );
        Map::new()
    }

    /// Persist `value` under `key`, retrying. `false` once exhausted.
    pub async fn safe_set(&self, key: &str, value: Value) -> bool {
        let mut last_err = String::new();
        for attempt in 1..=self.attempts {
            match self.store.set(key, value.clone()).await {
                Ok(()) => return true,
                Err(e) => last_err = e.to_string(),
            }
            self.wait(attempt).await;
        }
        tracing::warn!(
            "telemetry: storage set of {key} failed after {} attempts: {last_err}",
            self.attempts
        );
        false
    }

    /// Remove `keys`, retrying. `false` once exhausted.
    pub async fn safe_remove(&self, keys: &[&str]) -> bool {
        let mut last_err = String::new();
        for attempt in 1..=self.attempts {
            match self.store.remove(keys).await {
                Ok(()) => return true,
                Err(e) => last_err = e.to_string(),
            }
            self.wait(attempt).await;
        }
        tracing::warn!(
            "telemetry: storage remove failed after {} attempts: {last_err}",
            self.attempts
        );
        false
    }

    /// Linear delay between attempts. No wait after the last one.
    async fn wait(&self, attempt: u32) {
        if attempt < self.attempts {
            tokio::time::sleep(Duration::from_millis(self.delay_ms * u64::from(attempt))).await;
        }
    }
}
