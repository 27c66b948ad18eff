//! Durable sync-log sink consumed by the endpoint poller.

use async_trait::async_trait;

use crate::result::SyncLogEntry;

/// Append-only sink for sync log entries.
///
/// This is a best-effort side effect: the poller inspects the returned
/// `Result` only to emit a diagnostic. An append failure must never fail the
/// poll attempt that produced the entry, so implementations should not panic
/// and callers must not propagate the error into their own control flow.
/// Each append is one atomic insert; implementations may use an independent,
/// short-lived connection per write.
#[async_trait]
pub trait SyncLogSink: Send + Sync {
    /// Append one sync log entry
    async fn append(&self, entry: &SyncLogEntry) -> crate::Result<()>;
}
