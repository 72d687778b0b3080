//! Shared test doubles: an in-memory key-value store with failure
//! injection and a scripted transport.
#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::{Map, Value};

use beacon_core::errors::{TelemetryError, TelemetryResult};
use beacon_core::traits::{EnvironmentProbe, KeyValueStore, Transport};
use beacon_core::TelemetryConfig;

// ─── Key-value store ───────────────────────────────────────

/// In-memory store. Clones share state, so a test can keep a handle while
/// the engine owns another.
#[derive(Clone, Default)]
pub struct MemoryStore {
    data: Arc<Mutex<HashMap<String, Value>>>,
    /// Next N `get` calls fail with a transient error.
    failing_gets: Arc<AtomicU32>,
    /// Every operation fails while set.
    fail_all: Arc<AtomicBool>,
    /// Every `set` fails while set.
    fail_sets: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_next_gets(&self, n: u32) {
        self.failing_gets.store(n, Ordering::SeqCst);
    }

    pub fn fail_everything(&self) {
        self.fail_all.store(true, Ordering::SeqCst);
    }

    pub fn fail_sets(&self, failing: bool) {
        self.fail_sets.store(failing, Ordering::SeqCst);
    }

    pub fn value(&self, key: &str) -> Option<Value> {
        self.data.lock().unwrap().get(key).cloned()
    }

    pub fn insert(&self, key: &str, value: Value) {
        self.data.lock().unwrap().insert(key.to_string(), value);
    }
}

impl KeyValueStore for MemoryStore {
    async fn get(&self, keys: &[&str]) -> TelemetryResult<Map<String, Value>> {
        if self.fail_all.load(Ordering::SeqCst) {
            return Err(TelemetryError::Storage {
                reason: "store down".into(),
            });
        }
        if self
            .failing_gets
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(TelemetryError::Storage {
                reason: "transient get failure".into(),
            });
        }
        let data = self.data.lock().unwrap();
        let mut out = Map::new();
        for key in keys {
            if let Some(value) = data.get(*key) {
                out.insert((*key).to_string(), value.clone());
            }
        }
        Ok(out)
    }

    async fn set(&self, key: &str, value: Value) -> TelemetryResult<()> {
        if self.fail_all.load(Ordering::SeqCst) || self.fail_sets.load(Ordering::SeqCst) {
            return Err(TelemetryError::Storage {
                reason: "transient set failure".into(),
            });
        }
        self.data.lock().unwrap().insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, keys: &[&str]) -> TelemetryResult<()> {
        if self.fail_all.load(Ordering::SeqCst) {
            return Err(TelemetryError::Storage {
                reason: "transient remove failure".into(),
            });
        }
        let mut data = self.data.lock().unwrap();
        for key in keys {
            data.remove(*key);
        }
        Ok(())
    }
}

// ─── Transport ─────────────────────────────────────────────

/// Scripted transport. Request outcomes are popped from a script, falling
/// back to a default; beacon hand-offs succeed or fail wholesale.
#[derive(Clone)]
pub struct MockTransport {
    beacon_capable: bool,
    beacon_accepts: Arc<AtomicBool>,
    request_ok: Arc<AtomicBool>,
    scripted: Arc<Mutex<VecDeque<bool>>>,
    request_delay_ms: Arc<AtomicU64>,
    pub requests: Arc<Mutex<Vec<Vec<u8>>>>,
    pub beacons: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl MockTransport {
    /// Beacon-capable transport whose sends all succeed.
    pub fn ok() -> Self {
        Self {
            beacon_capable: true,
            beacon_accepts: Arc::new(AtomicBool::new(true)),
            request_ok: Arc::new(AtomicBool::new(true)),
            scripted: Arc::new(Mutex::new(VecDeque::new())),
            request_delay_ms: Arc::new(AtomicU64::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
            beacons: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Transport whose every send fails (beacon rejected, requests erroring).
    pub fn failing() -> Self {
        let t = Self::ok();
        t.beacon_accepts.store(false, Ordering::SeqCst);
        t.request_ok.store(false, Ordering::SeqCst);
        t
    }

    /// Transport without the one-way strategy.
    pub fn without_beacon() -> Self {
        let mut t = Self::ok();
        t.beacon_capable = false;
        t
    }

    /// Queue explicit outcomes for upcoming request/response sends.
    pub fn script_requests(&self, outcomes: &[bool]) {
        self.scripted.lock().unwrap().extend(outcomes.iter().copied());
    }

    pub fn reject_beacons(&self) {
        self.beacon_accepts.store(false, Ordering::SeqCst);
    }

    pub fn delay_requests(&self, ms: u64) {
        self.request_delay_ms.store(ms, Ordering::SeqCst);
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn beacon_count(&self) -> usize {
        self.beacons.lock().unwrap().len()
    }

    /// Decode the nth request/response body as JSON.
    pub fn request_json(&self, n: usize) -> Value {
        serde_json::from_slice(&self.requests.lock().unwrap()[n]).unwrap()
    }
}

impl Transport for MockTransport {
    fn supports_beacon(&self) -> bool {
        self.beacon_capable
    }

    async fn send_beacon(&self, _endpoint: &str, body: Vec<u8>) -> bool {
        self.beacons.lock().unwrap().push(body);
        self.beacon_accepts.load(Ordering::SeqCst)
    }

    async fn send_request(
        &self,
        _endpoint: &str,
        body: Vec<u8>,
        _timeout: Duration,
    ) -> TelemetryResult<()> {
        let delay = self.request_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        self.requests.lock().unwrap().push(body);
        let outcome = self
            .scripted
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.request_ok.load(Ordering::SeqCst));
        if outcome {
            Ok(())
        } else {
            Err(TelemetryError::Network {
                reason: "scripted failure".into(),
            })
        }
    }
}

// ─── Environment probe ─────────────────────────────────────

pub const CHROME_WIN_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36";

#[derive(Clone)]
pub struct TestProbe {
    pub user_agent: String,
    pub app_version: String,
    pub language: String,
}

impl Default for TestProbe {
    fn default() -> Self {
        Self {
            user_agent: CHROME_WIN_UA.to_string(),
            app_version: "1.2.3".to_string(),
            language: "en-US".to_string(),
        }
    }
}

impl EnvironmentProbe for TestProbe {
    fn user_agent(&self) -> String {
        self.user_agent.clone()
    }

    fn app_version(&self) -> String {
        self.app_version.clone()
    }

    fn language(&self) -> String {
        self.language.clone()
    }
}

// ─── Config ────────────────────────────────────────────────

/// Test config with fast backoff so real-time tests stay quick.
pub fn test_config() -> TelemetryConfig {
    let mut config = TelemetryConfig {
        site_id: "site-1".into(),
        endpoint: "https://collector.test/api/send".into(),
        ..TelemetryConfig::default()
    };
    config.retry.base_delay_ms = 10;
    config.retry.max_delay_ms = 40;
    config
}
