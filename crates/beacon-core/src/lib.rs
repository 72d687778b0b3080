//! # beacon-core
//!
//! Foundation crate for the Beacon telemetry pipeline.
//! Defines the event types, collaborator traits, errors, config, and
//! constants. The pipeline crate depends on this; the host application
//! only needs it to implement the collaborator traits.

pub mod config;
pub mod constants;
pub mod errors;
pub mod event;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use config::{DedupConfig, QueueConfig, RetryConfig, StorageKeys, TelemetryConfig};
pub use errors::{TelemetryError, TelemetryResult};
pub use event::{QueueStatus, QueuedEvent, SendOptions, WireEvent};
pub use traits::{EnvironmentProbe, KeyValueStore, Transport};
