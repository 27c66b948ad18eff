//! Single-endpoint polling with bounded retry.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, error};

use crate::config::PollingConfig;
use crate::fetch::{Fetch, FetchError};
use crate::result::{PollAttemptResult, SyncLogEntry};
use crate::sink::SyncLogSink;

/// Why a single fetch attempt failed. Every variant counts against the
/// retry budget.
#[derive(Debug, Error)]
enum AttemptError {
    #[error("HTTP {status}: {reason}")]
    Status { status: u16, reason: String },

    #[error("{0}")]
    Transport(#[from] FetchError),

    #[error("invalid response body: {0}")]
    Body(#[from] serde_json::Error),
}

/// Polls one endpoint at a time with sequential, fixed-delay retries.
///
/// `poll_endpoint` never fails: every outcome, including an exhausted retry
/// budget, is captured in the returned [`PollAttemptResult`] and appended to
/// the sync-log sink before the result is handed back to the scheduler.
pub struct EndpointPoller {
    config: Arc<PollingConfig>,
    fetcher: Arc<dyn Fetch>,
    sink: Arc<dyn SyncLogSink>,
}

impl EndpointPoller {
    /// Create a poller over the shared configuration, transport and sink
    pub fn new(
        config: Arc<PollingConfig>,
        fetcher: Arc<dyn Fetch>,
        sink: Arc<dyn SyncLogSink>,
    ) -> Self {
        Self { config, fetcher, sink }
    }

    /// Poll a single endpoint, retrying up to the configured attempt budget
    pub async fn poll_endpoint(&self, endpoint: &str) -> PollAttemptResult {
        let url = format!("{}{}", self.config.api_url, endpoint);
        let headers = self.request_headers();
        let mut last_error: Option<String> = None;

        for attempt in 1..=self.config.retry_attempts {
            match self.attempt(&url, &headers).await {
                Ok(record_count) => {
                    let result = PollAttemptResult::success(endpoint, record_count);
                    self.record(SyncLogEntry::from_result(&result)).await;
                    return result;
                }
                Err(err) => {
                    last_error = Some(err.to_string());

                    if attempt < self.config.retry_attempts {
                        debug!(
                            endpoint,
                            attempt,
                            delay_ms = self.config.retry_delay.as_millis() as u64,
                            "attempt failed, retrying"
                        );
                        tokio::time::sleep(self.config.retry_delay).await;
                    }
                }
            }
        }

        let result = PollAttemptResult::failure(endpoint, last_error);
        self.record(SyncLogEntry::from_result(&result)).await;
        result
    }

    /// One fetch attempt: request, status check, body parse. Returns the
    /// record count when the body is a JSON array.
    async fn attempt(
        &self,
        url: &str,
        headers: &[(String, String)],
    ) -> Result<Option<u64>, AttemptError> {
        let response = self.fetcher.get(url, headers).await?;

        if !response.is_success() {
            return Err(AttemptError::Status {
                status: response.status,
                reason: response.reason,
            });
        }

        let data: serde_json::Value = serde_json::from_slice(&response.body)?;

        Ok(match data {
            serde_json::Value::Array(items) => Some(items.len() as u64),
            _ => None,
        })
    }

    /// Best-effort sync log append. Failures are diagnosed and discarded so
    /// they can never fail the poll attempt itself.
    async fn record(&self, entry: SyncLogEntry) {
        if let Err(e) = self.sink.append(&entry).await {
            error!(endpoint = %entry.endpoint, "failed to save sync log: {e}");
        }
    }

    fn request_headers(&self) -> Vec<(String, String)> {
        let mut headers =
            vec![("Content-Type".to_string(), "application/json".to_string())];

        if let Some(key) = &self.config.api_key {
            headers.push(("Authorization".to_string(), format!("Bearer {key}")));
        }

        headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use async_trait::async_trait;

    struct NullSink;

    #[async_trait]
    impl SyncLogSink for NullSink {
        async fn append(&self, _entry: &SyncLogEntry) -> crate::Result<()> {
            Ok(())
        }
    }

    struct NeverFetcher;

    #[async_trait]
    impl Fetch for NeverFetcher {
        async fn get(
            &self,
            _url: &str,
            _headers: &[(String, String)],
        ) -> Result<crate::fetch::FetchResponse, FetchError> {
            Err(FetchError::new("unreachable"))
        }
    }

    fn poller_with_key(key: Option<&str>) -> EndpointPoller {
        let mut config = PollingConfig::new("https://api.example.com", Duration::from_secs(1));
        if let Some(key) = key {
            config = config.with_api_key(key);
        }
        EndpointPoller::new(Arc::new(config), Arc::new(NeverFetcher), Arc::new(NullSink))
    }

    #[test]
    fn headers_without_credential() {
        let headers = poller_with_key(None).request_headers();
        assert_eq!(headers, vec![("Content-Type".to_string(), "application/json".to_string())]);
    }

    #[test]
    fn headers_with_bearer_credential() {
        let headers = poller_with_key(Some("secret")).request_headers();
        assert!(headers.contains(&("Authorization".to_string(), "Bearer secret".to_string())));
    }

    #[test]
    fn attempt_errors_format_for_the_sync_log() {
        let status = AttemptError::Status { status: 500, reason: "Internal Server Error".into() };
        assert_eq!(status.to_string(), "HTTP 500: Internal Server Error");

        let transport = AttemptError::Transport(FetchError::new("connection reset"));
        assert_eq!(transport.to_string(), "connection reset");
    }
}
