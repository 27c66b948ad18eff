#![allow(dead_code)]
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use libsql::params;

use apisync::{SyncLogEntry, SyncLogSink, SyncStatus};

use super::models::SyncLogRecord;
use crate::pool::LibsqlPool;

/// Store trait for sync-log persistence
#[async_trait]
pub trait SyncLogStore: Send + Sync {
    /// Append one sync log record, returning its rowid
    async fn append_sync_log(&self, record: &SyncLogRecord) -> Result<i64>;

    /// Get the most recent sync logs across all endpoints
    async fn recent_sync_logs(&self, limit: usize) -> Result<Vec<SyncLogRecord>>;

    /// Get the most recent sync logs for one endpoint
    async fn recent_sync_logs_for_endpoint(
        &self,
        endpoint: &str,
        limit: usize,
    ) -> Result<Vec<SyncLogRecord>>;

    /// Count sync logs with the given status
    async fn count_with_status(&self, status: SyncStatus) -> Result<i64>;
}

/// LibSQL store implementation
pub struct DatabaseImpl {
    pool: LibsqlPool,
}

impl DatabaseImpl {
    /// Create a new store over a connection pool
    pub fn new_from_pool(pool: LibsqlPool) -> Self {
        Self { pool }
    }

    /// Get a connection from the pool
    async fn get_conn(&self) -> Result<deadpool::managed::Object<crate::pool::LibsqlManager>> {
        Ok(self.pool.get().await?)
    }
}

fn record_from_row(row: &libsql::Row) -> Result<SyncLogRecord> {
    let uuid_str: String = row.get(1)?;
    let status_str: String = row.get(3)?;
    let synced_at: i64 = row.get(4)?;
    let record_count: Option<i64> = row.get(5)?;

    Ok(SyncLogRecord {
        id: Some(row.get(0)?),
        uuid: uuid::Uuid::parse_str(&uuid_str)?,
        endpoint: row.get(2)?,
        status: status_str.parse().map_err(|e: String| anyhow!(e))?,
        synced_at: SyncLogRecord::i64_to_timestamp(synced_at),
        record_count: record_count.map(|c| c as u64),
        error_message: row.get(6)?,
    })
}

#[async_trait]
impl SyncLogStore for DatabaseImpl {
    async fn append_sync_log(&self, record: &SyncLogRecord) -> Result<i64> {
        let conn = self.get_conn().await?;

        conn.execute(
            "INSERT INTO sync_logs (uuid, endpoint, status, synced_at, record_count, error_message)
                VALUES (?, ?, ?, ?, ?, ?)",
            params![
                record.uuid.to_string(),
                record.endpoint.clone(),
                record.status.to_string(),
                SyncLogRecord::timestamp_to_i64(record.synced_at),
                record.record_count.map(|c| c as i64),
                record.error_message.clone()
            ],
        )
        .await?;

        Ok(conn.last_insert_rowid())
    }

    async fn recent_sync_logs(&self, limit: usize) -> Result<Vec<SyncLogRecord>> {
        let conn = self.get_conn().await?;
        let mut stmt = conn
            .prepare(
                "SELECT id, uuid, endpoint, status, synced_at, record_count, error_message
                    FROM sync_logs ORDER BY synced_at DESC, id DESC LIMIT ?",
            )
            .await?;

        let mut rows = stmt.query(params![limit as i64]).await?;
        let mut records = Vec::new();

        while let Some(row) = rows.next().await? {
            records.push(record_from_row(&row)?);
        }

        Ok(records)
    }

    async fn recent_sync_logs_for_endpoint(
        &self,
        endpoint: &str,
        limit: usize,
    ) -> Result<Vec<SyncLogRecord>> {
        let conn = self.get_conn().await?;
        let mut stmt = conn
            .prepare(
                "SELECT id, uuid, endpoint, status, synced_at, record_count, error_message
                    FROM sync_logs WHERE endpoint = ?
                    ORDER BY synced_at DESC, id DESC LIMIT ?",
            )
            .await?;

        let mut rows = stmt.query(params![endpoint, limit as i64]).await?;
        let mut records = Vec::new();

        while let Some(row) = rows.next().await? {
            records.push(record_from_row(&row)?);
        }

        Ok(records)
    }

    async fn count_with_status(&self, status: SyncStatus) -> Result<i64> {
        let conn = self.get_conn().await?;
        let mut rows = conn
            .query(
                "SELECT COUNT(*) FROM sync_logs WHERE status = ?",
                params![status.to_string()],
            )
            .await?;

        let row = rows.next().await?.ok_or_else(|| anyhow!("count query returned no rows"))?;
        Ok(row.get(0)?)
    }
}

/// Bridge the core's best-effort sink onto the store. Each append checks out
/// its own pooled connection and performs one atomic insert.
#[async_trait]
impl SyncLogSink for DatabaseImpl {
    async fn append(&self, entry: &SyncLogEntry) -> Result<()> {
        let record = SyncLogRecord::from_entry(entry);
        self.append_sync_log(&record).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use tempfile::{TempDir, tempdir};

    /// Helper to create a migrated test database pool
    async fn create_test_store() -> Result<(DatabaseImpl, TempDir)> {
        let temp_dir = tempdir()?;
        let db_path = temp_dir.path().join("test.db");

        let db = libsql::Builder::new_local(db_path.to_string_lossy().as_ref()).build().await?;
        let conn = db.connect()?;
        crate::database::initialize_database(&conn).await?;

        let manager = crate::pool::LibsqlManager::new(db);
        let pool = deadpool::managed::Pool::builder(manager)
            .config(deadpool::managed::PoolConfig::default())
            .build()?;

        Ok((DatabaseImpl::new_from_pool(pool), temp_dir))
    }

    #[tokio::test]
    async fn append_and_read_back() -> Result<()> {
        let (store, _dir) = create_test_store().await?;

        let entry = SyncLogEntry::success("/players", Some(7));
        let id = store.append_sync_log(&SyncLogRecord::from_entry(&entry)).await?;
        assert!(id > 0);

        let records = store.recent_sync_logs(10).await?;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].endpoint, "/players");
        assert_eq!(records[0].status, SyncStatus::Success);
        assert_eq!(records[0].record_count, Some(7));
        assert!(records[0].error_message.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn filters_by_endpoint_and_counts_by_status() -> Result<()> {
        let (store, _dir) = create_test_store().await?;

        let entries = [
            SyncLogEntry::success("/players", Some(3)),
            SyncLogEntry::error("/games", Some("HTTP 503: Service Unavailable".into())),
            SyncLogEntry::success("/games", Some(0)),
        ];
        for entry in &entries {
            store.append_sync_log(&SyncLogRecord::from_entry(entry)).await?;
        }

        let games = store.recent_sync_logs_for_endpoint("/games", 10).await?;
        assert_eq!(games.len(), 2);
        assert!(games.iter().all(|r| r.endpoint == "/games"));

        assert_eq!(store.count_with_status(SyncStatus::Success).await?, 2);
        assert_eq!(store.count_with_status(SyncStatus::Error).await?, 1);
        assert_eq!(store.count_with_status(SyncStatus::Partial).await?, 0);

        Ok(())
    }

    #[tokio::test]
    async fn migrations_are_idempotent() -> Result<()> {
        let temp_dir = tempdir()?;
        let db_path = temp_dir.path().join("test.db");

        let db = libsql::Builder::new_local(db_path.to_string_lossy().as_ref()).build().await?;
        let conn = db.connect()?;
        crate::database::initialize_database(&conn).await?;
        crate::database::initialize_database(&conn).await?;

        Ok(())
    }

    #[tokio::test]
    async fn store_works_through_the_core_sink_trait() -> Result<()> {
        let (store, _dir) = create_test_store().await?;
        let store = Arc::new(store);
        let sink: Arc<dyn SyncLogSink> = store.clone();

        sink.append(&SyncLogEntry::error("/flaky", Some("connection refused".into()))).await?;

        let records = store.recent_sync_logs(10).await?;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, SyncStatus::Error);
        assert_eq!(records[0].error_message.as_deref(), Some("connection refused"));

        Ok(())
    }
}
