//! Pipeline-wide default values and fixed keys.

/// Beacon pipeline version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prefix for the anonymous installation id.
pub const USER_ID_PREFIX: &str = "anon-";

/// Default maximum delivery attempts (immediate retry and batch lifetime).
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default base delay for exponential backoff (ms).
pub const DEFAULT_BASE_DELAY_MS: u64 = 1_000;

/// Default backoff ceiling (ms).
pub const DEFAULT_MAX_DELAY_MS: u64 = 10_000;

/// Default request timeout for the cancellable transport call (ms).
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;

/// Default maximum number of queued events before the oldest is dropped.
pub const DEFAULT_QUEUE_MAX_SIZE: usize = 50;

/// Default number of events delivered per batch during a drain.
pub const DEFAULT_BATCH_SIZE: usize = 10;

/// Default interval between scheduled queue drains (ms).
pub const DEFAULT_PROCESS_INTERVAL_MS: u64 = 30_000;

/// Default per-kind dedup window when no override is configured (ms).
pub const DEFAULT_DEDUP_INTERVAL_MS: u64 = 5_000;

/// Age past which a dedup record is swept regardless of its kind (ms).
pub const DEFAULT_DEDUP_CLEANUP_MS: u64 = 86_400_000;

/// Attempts the safe storage adapter makes before degrading.
pub const STORAGE_RETRY_ATTEMPTS: u32 = 3;

/// Linear delay step between safe storage attempts (ms).
pub const STORAGE_RETRY_DELAY_MS: u64 = 100;

/// Storage key for the anonymous installation id.
pub const KEY_USER_ID: &str = "beacon_user_id";

/// Storage key for the persisted event queue.
pub const KEY_EVENT_QUEUE: &str = "beacon_event_queue";

/// Storage key for the persisted dedup record map.
pub const KEY_DEDUP_RECORDS: &str = "beacon_dedup_records";
