//! Syncbeat polling core - drift-corrected API polling with sync logging
//!
//! This library periodically pulls data from a set of remote HTTP endpoints,
//! retries transient failures with a fixed delay, and records every terminal
//! outcome through a pluggable sync-log sink.

pub mod config;
pub mod fetch;
pub mod poller;
pub mod result;
pub mod scheduler;
pub mod sink;

// Re-export main types
pub use config::{PollingConfig, PollingConfigBuilder};
pub use fetch::{Fetch, FetchError, FetchResponse, HttpFetcher};
pub use poller::EndpointPoller;
pub use result::{PollAttemptResult, SyncLogEntry, SyncStatus};
pub use scheduler::{CycleSummary, PollScheduler};
pub use sink::SyncLogSink;

/// Re-export common error types
pub use anyhow;

/// Syncbeat result type using anyhow for error handling
pub type Result<T> = anyhow::Result<T>;

/// Default number of fetch attempts per endpoint per cycle
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 3;

/// Default delay between fetch attempts, in milliseconds
pub const DEFAULT_RETRY_DELAY_MS: u64 = 5000;
