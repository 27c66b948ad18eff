//! Minimal poller: fetch a public JSON endpoint every 10 seconds and print
//! each sync log entry to stdout.
//!
//! Run with: cargo run --example simple_poller

use std::sync::Arc;
use std::time::Duration;

use apisync::{
    HttpFetcher, PollScheduler, PollingConfig, SyncLogEntry, SyncLogSink,
};
use async_trait::async_trait;

struct StdoutSink;

#[async_trait]
impl SyncLogSink for StdoutSink {
    async fn append(&self, entry: &SyncLogEntry) -> apisync::Result<()> {
        println!(
            "[{}] {} records={:?} error={:?}",
            entry.status, entry.endpoint, entry.record_count, entry.error_message
        );
        Ok(())
    }
}

#[tokio::main]
async fn main() -> apisync::Result<()> {
    tracing_subscriber::fmt::init();

    let config = PollingConfig::builder("https://httpbin.org", Duration::from_secs(10))
        .endpoint("/json")
        .retry_attempts(2)
        .retry_delay(Duration::from_secs(1))
        .build();
    config.validate()?;

    let fetcher = Arc::new(HttpFetcher::new(Duration::from_secs(10))?);
    let scheduler = PollScheduler::new(config, fetcher, Arc::new(StdoutSink));

    scheduler.start();
    tokio::time::sleep(Duration::from_secs(25)).await;
    scheduler.stop();

    Ok(())
}
