//! Scheduler — recurring queue drains on a fixed interval.
//!
//! The engine's own guard makes an overlapping tick a no-op, so the timer
//! here can stay dumb: tick, drain, repeat. The handle aborts its task on
//! shutdown or drop.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use beacon_core::traits::{EnvironmentProbe, KeyValueStore, Transport};

use crate::engine::TelemetryEngine;

/// Handle to the recurring drain task.
#[derive(Debug)]
pub struct Scheduler {
    handle: JoinHandle<()>,
}

impl Scheduler {
    /// Start draining `engine` every `queue.process_interval_ms`.
    pub fn start<S, T, P>(engine: Arc<TelemetryEngine<S, T, P>>) -> Self
    where
        S: KeyValueStore + 'static,
        T: Transport + 'static,
        P: EnvironmentProbe + 'static,
    {
        let interval = Duration::from_millis(engine.config().queue.process_interval_ms);
        Self::start_with_interval(engine, interval)
    }

    /// Start with an explicit interval.
    pub fn start_with_interval<S, T, P>(
        engine: Arc<TelemetryEngine<S, T, P>>,
        interval: Duration,
    ) -> Self
    where
        S: KeyValueStore + 'static,
        T: Transport + 'static,
        P: EnvironmentProbe + 'static,
    {
        tracing::info!("telemetry: scheduler started, drain every {interval:?}");
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately; skip it so the first
            // drain happens one full interval after startup.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                engine.process_event_queue().await;
            }
        });
        Self { handle }
    }

    /// Stop the recurring drain.
    pub fn shutdown(self) {
        self.handle.abort();
        tracing::info!("telemetry: scheduler stopped");
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
