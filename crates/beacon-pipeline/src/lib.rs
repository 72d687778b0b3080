//! # beacon-pipeline
//!
//! Self-hosted telemetry event pipeline, embedded in a host application.
//! Accepts named usage events, attaches common context, suppresses
//! near-duplicate signals, persists unsent events across restarts, and
//! delivers them to a remote collector with bounded concurrency, retry,
//! and two transport strategies.
//!
//! Nothing here ever surfaces a failure to the caller: every public entry
//! point returns a `bool` or a safe default, because telemetry must never
//! break the feature that triggered it.
//!
//! ## Components
//! - **storage** — retrying adapter over the host's key-value store
//! - **context** — anonymous identity and common event properties
//! - **sanitize** — sensitive-key scrubbing
//! - **dedup** — persisted last-sent gate with a periodic sweep
//! - **queue** — bounded, persisted FIFO of undelivered events
//! - **delivery** — retry/backoff sends over two transport strategies
//! - **engine** — the public API surface, one instance per process
//! - **scheduler** — recurring queue drain

pub mod context;
pub mod dedup;
pub mod delivery;
pub mod engine;
pub mod queue;
pub mod sanitize;
pub mod scheduler;
pub mod storage;
pub mod transport;

pub use delivery::DeliveryStrategy;
pub use engine::TelemetryEngine;
pub use scheduler::Scheduler;
pub use transport::HttpTransport;
