//! Poll attempt results and their persisted sync-log form.

use std::str::FromStr;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

/// Status recorded in a sync log entry
///
/// `Partial` is a valid persisted state for entries written by other tools,
/// but the poller itself only ever emits `Success` or `Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    Success,
    Error,
    Partial,
}

impl std::fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncStatus::Success => write!(f, "success"),
            SyncStatus::Error => write!(f, "error"),
            SyncStatus::Partial => write!(f, "partial"),
        }
    }
}

impl FromStr for SyncStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "success" => Ok(SyncStatus::Success),
            "error" => Ok(SyncStatus::Error),
            "partial" => Ok(SyncStatus::Partial),
            other => Err(format!("unknown sync status: {other}")),
        }
    }
}

/// Terminal outcome of polling one endpoint in one cycle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollAttemptResult {
    /// Endpoint path that was polled
    pub endpoint: String,

    /// Whether any attempt succeeded within the retry budget
    pub success: bool,

    /// Timestamp when the outcome was produced
    pub timestamp: SystemTime,

    /// Number of records in the response, when the body was a JSON array
    pub record_count: Option<u64>,

    /// Last observed error message (if all attempts failed)
    pub error: Option<String>,
}

impl PollAttemptResult {
    /// Build a successful result
    pub fn success(endpoint: impl Into<String>, record_count: Option<u64>) -> Self {
        Self {
            endpoint: endpoint.into(),
            success: true,
            timestamp: SystemTime::now(),
            record_count,
            error: None,
        }
    }

    /// Build a failed result carrying the last observed error
    pub fn failure(endpoint: impl Into<String>, error: Option<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            success: false,
            timestamp: SystemTime::now(),
            record_count: None,
            error,
        }
    }
}

/// Durable record of one endpoint's terminal outcome in one cycle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncLogEntry {
    /// Endpoint path the entry is for
    pub endpoint: String,

    /// Outcome status
    pub status: SyncStatus,

    /// Timestamp of the sync
    pub synced_at: SystemTime,

    /// Number of records synced, when known
    pub record_count: Option<u64>,

    /// Error message for failed syncs
    pub error_message: Option<String>,
}

impl SyncLogEntry {
    /// Build a success entry
    pub fn success(endpoint: impl Into<String>, record_count: Option<u64>) -> Self {
        Self {
            endpoint: endpoint.into(),
            status: SyncStatus::Success,
            synced_at: SystemTime::now(),
            record_count,
            error_message: None,
        }
    }

    /// Build an error entry carrying the last observed message
    pub fn error(endpoint: impl Into<String>, message: Option<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            status: SyncStatus::Error,
            synced_at: SystemTime::now(),
            record_count: None,
            error_message: message,
        }
    }

    /// Persisted form of a poll attempt result
    pub fn from_result(result: &PollAttemptResult) -> Self {
        Self {
            endpoint: result.endpoint.clone(),
            status: if result.success { SyncStatus::Success } else { SyncStatus::Error },
            synced_at: result.timestamp,
            record_count: result.record_count,
            error_message: result.error.clone(),
        }
    }
}
