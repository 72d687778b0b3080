//! Collaborator traits — the seams between the pipeline and the host.
//!
//! The async methods are declared as `impl Future + Send` so the pipeline
//! can drive them from spawned tasks (the scheduler tick, the dedup sweep).
//! Implementations can use plain `async fn`.

use std::future::Future;
use std::time::Duration;

use serde_json::{Map, Value};

use crate::errors::TelemetryResult;

/// The host's persistent key-value store.
///
/// Assumed eventually consistent, occasionally and transiently failing, with
/// no transactions. The pipeline only ever touches it through the safe
/// storage adapter, which retries and then degrades.
pub trait KeyValueStore: Send + Sync {
    /// Fetch the values for the given keys. Missing keys are simply absent
    /// from the returned map.
    fn get(&self, keys: &[&str]) -> impl Future<Output = TelemetryResult<Map<String, Value>>> + Send;

    /// Persist one value under one key.
    fn set(&self, key: &str, value: Value) -> impl Future<Output = TelemetryResult<()>> + Send;

    /// Remove the given keys. Removing an absent key is not an error.
    fn remove(&self, keys: &[&str]) -> impl Future<Output = TelemetryResult<()>> + Send;
}

/// Outbound transport to the collector, in two strategies.
///
/// The one-way send tolerates the host being torn down mid-flight; the
/// request/response call gives a definite outcome within the timeout and is
/// aborted when it elapses.
pub trait Transport: Send + Sync {
    /// Whether the one-way strategy is available. Probed once at engine
    /// construction, never per send.
    fn supports_beacon(&self) -> bool;

    /// Fire-and-forget send. Returns whether the payload was accepted for
    /// delivery — `true` means "handed off", not "delivered".
    fn send_beacon(&self, endpoint: &str, body: Vec<u8>) -> impl Future<Output = bool> + Send;

    /// Cancellable request/response send, bounded by `timeout`.
    fn send_request(
        &self,
        endpoint: &str,
        body: Vec<u8>,
        timeout: Duration,
    ) -> impl Future<Output = TelemetryResult<()>> + Send;
}

/// Read-only probes into the host environment.
pub trait EnvironmentProbe: Send + Sync {
    /// A user-agent-like string describing platform and browser.
    fn user_agent(&self) -> String;

    /// The host application's version string.
    fn app_version(&self) -> String;

    /// BCP 47 locale tag, e.g. `en-US`.
    fn language(&self) -> String;
}
