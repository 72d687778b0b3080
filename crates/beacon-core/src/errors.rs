//! Error types for the telemetry pipeline.
//!
//! No error here is ever surfaced as a fatal condition to the host: public
//! entry points in the pipeline crate degrade to `bool` or a safe default.
//! These types exist for the internal seams (storage, transport) where a
//! cause is still worth carrying.

/// Result alias used throughout the pipeline.
pub type TelemetryResult<T> = Result<T, TelemetryError>;

/// Telemetry pipeline errors.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("storage error: {reason}")]
    Storage { reason: String },

    #[error("network error: {reason}")]
    Network { reason: String },

    #[error("request timed out after {ms}ms")]
    Timeout { ms: u64 },

    #[error("serialization error: {reason}")]
    Serialization { reason: String },
}

impl From<serde_json::Error> for TelemetryError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization {
            reason: e.to_string(),
        }
    }
}
