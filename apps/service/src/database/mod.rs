/// Sync-log persistence layer
///
/// This module provides the libsql-backed store for sync log records and the
/// bridge onto the polling core's best-effort sink trait.
pub mod migrations;
pub mod models;
pub mod repository;

pub use repository::{DatabaseImpl, SyncLogStore};

use anyhow::Result;

/// Initialize database with schema
pub async fn initialize_database(conn: &libsql::Connection) -> Result<()> {
    migrations::run_migrations(conn).await
}
