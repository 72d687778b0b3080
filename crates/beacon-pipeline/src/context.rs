//! Anonymous identity and common event context.
//!
//! The installation id is generated once from a cryptographically random
//! source and persisted under a fixed key. When persistence is unavailable
//! a fresh in-memory id is returned instead and never written, so it may
//! differ across calls — a documented limitation of running with a broken
//! store, not something to paper over.

use std::sync::Arc;

use chrono::Utc;
use serde_json::{json, Map, Value};
use uuid::Uuid;

use beacon_core::constants::USER_ID_PREFIX;
use beacon_core::traits::{EnvironmentProbe, KeyValueStore};
use beacon_core::WireEvent;

use crate::sanitize::sanitize;
use crate::storage::SafeStorage;

/// Builds the anonymous id and the common property set for every event.
#[derive(Debug)]
pub struct ContextBuilder<S, P> {
    storage: Arc<SafeStorage<S>>,
    probe: Arc<P>,
    site_id: String,
    user_id_key: String,
}

impl<S: KeyValueStore, P: EnvironmentProbe> ContextBuilder<S, P> {
    pub fn new(
        storage: Arc<SafeStorage<S>>,
        probe: Arc<P>,
        site_id: String,
        user_id_key: String,
    ) -> Self {
        Self {
            storage,
            probe,
            site_id,
            user_id_key,
        }
    }

    /// The persisted anonymous installation id, created on first use.
    ///
    /// On persistence failure the freshly generated id is returned without
    /// retrying the write.
    pub async fn user_id(&self) -> String {
        let stored = self.storage.safe_get(&[&self.user_id_key]).await;
        if let Some(Value::String(id)) = stored.get(&self.user_id_key) {
            if !id.is_empty() {
                return id.clone();
            }
        }

        let id = generate_user_id();
        if !self
            .storage
            .safe_set(&self.user_id_key, json!(id.clone()))
            .await
        {
            tracing::warn!("telemetry: could not persist installation id, using in-memory id");
        }
        id
    }

    /// Build the full property set for one event from a single point-in-time
    /// snapshot, so `$timestamp`, `$time`, and `$date` are mutually
    /// consistent. Custom properties are sanitized before merging.
    pub async fn build_event_data(&self, custom: Option<&Value>) -> Map<String, Value> {
        let now = Utc::now();
        let ua = self.probe.user_agent();

        let mut data = Map::new();
        data.insert("$user_id".into(), json!(self.user_id().await));
        data.insert("$timestamp".into(), json!(now.timestamp_millis()));
        data.insert("$time".into(), json!(now.format("%H:%M:%S").to_string()));
        data.insert("$date".into(), json!(now.format("%Y-%m-%d").to_string()));
        data.insert("$platform".into(), json!(platform_tag(&ua)));
        data.insert("$browser".into(), json!(browser_tag(&ua)));
        data.insert("$version".into(), json!(self.probe.app_version()));

        if let Some(custom) = custom {
            if let Value::Object(clean) = sanitize(custom) {
                data.extend(clean);
            }
        }
        data
    }

    /// Wrap built event data into its wire form.
    pub fn wire_event(&self, name: &str, data: Map<String, Value>) -> WireEvent {
        WireEvent {
            website: self.site_id.clone(),
            name: name.to_string(),
            data,
            language: self.probe.language(),
        }
    }
}

/// `anon-` + 32 hex chars from a v4 UUID.
fn generate_user_id() -> String {
    format!("{USER_ID_PREFIX}{}", Uuid::new_v4().simple())
}

/// Platform tag from a user-agent-like string. Pure string matching.
pub fn platform_tag(user_agent: &str) -> &'static str {
    let ua = user_agent.to_lowercase();
    if ua.contains("android") {
        "android"
    } else if ua.contains("iphone") || ua.contains("ipad") {
        "ios"
    } else if ua.contains("windows") {
        "windows"
    } else if ua.contains("mac os") || ua.contains("macintosh") {
        "macos"
    } else if ua.contains("linux") {
        "linux"
    } else {
        "unknown"
    }
}

/// Browser tag from a user-agent-like string.
///
/// Order matters: Chromium-family agents also advertise `Chrome` and
/// `Safari`, so the more specific names are checked first.
pub fn browser_tag(user_agent: &str) -> &'static str {
    let ua = user_agent.to_lowercase();
    if ua.contains("edg/") || ua.contains("edge") {
        "edge"
    } else if ua.contains("opr/") || ua.contains("opera") {
        "opera"
    } else if ua.contains("firefox") {
        "firefox"
    } else if ua.contains("chrome") {
        "chrome"
    } else if ua.contains("safari") {
        "safari"
    } else {
        "unknown"
    }
}
