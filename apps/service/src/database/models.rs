use std::time::{SystemTime, UNIX_EPOCH};

use apisync::{SyncLogEntry, SyncStatus};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// SyncLogRecord model - one persisted sync outcome row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncLogRecord {
    pub id: Option<i64>,
    pub uuid: Uuid,
    pub endpoint: String,
    pub status: SyncStatus,
    pub synced_at: SystemTime,
    pub record_count: Option<u64>,
    pub error_message: Option<String>,
}

impl SyncLogRecord {
    /// Create a new record from a core sync log entry
    pub fn from_entry(entry: &SyncLogEntry) -> Self {
        Self {
            id: None,
            uuid: Uuid::new_v4(),
            endpoint: entry.endpoint.clone(),
            status: entry.status,
            synced_at: entry.synced_at,
            record_count: entry.record_count,
            error_message: entry.error_message.clone(),
        }
    }

    /// Convert SystemTime to Unix timestamp
    pub fn timestamp_to_i64(time: SystemTime) -> i64 {
        time.duration_since(UNIX_EPOCH).unwrap_or_default().as_secs() as i64
    }

    /// Convert Unix timestamp to SystemTime
    pub fn i64_to_timestamp(timestamp: i64) -> SystemTime {
        UNIX_EPOCH + std::time::Duration::from_secs(timestamp as u64)
    }
}
