//! Shared test doubles for the polling integration tests.
#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use apisync::anyhow::anyhow;
use apisync::{Fetch, FetchError, FetchResponse, SyncLogEntry, SyncLogSink};
use async_trait::async_trait;

/// One recorded fetch call
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub at: Instant,
}

/// Fetcher returning scripted outcomes per endpoint path. Endpoints without
/// a script respond 200 with an empty JSON array.
pub struct ScriptedFetcher {
    scripts: Mutex<HashMap<String, VecDeque<Result<FetchResponse, FetchError>>>>,
    calls: Mutex<Vec<RecordedCall>>,
    call_delay: Option<Duration>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self { scripts: Mutex::new(HashMap::new()), calls: Mutex::new(Vec::new()), call_delay: None }
    }

    /// Make every fetch take this long before resolving
    pub fn with_call_delay(mut self, delay: Duration) -> Self {
        self.call_delay = Some(delay);
        self
    }

    /// Queue an HTTP response for the next call to `endpoint`
    pub fn respond(&self, endpoint: &str, status: u16, reason: &str, body: &str) {
        self.push(endpoint, Ok(FetchResponse {
            status,
            reason: reason.to_string(),
            body: body.as_bytes().to_vec(),
        }));
    }

    /// Queue a transport failure for the next call to `endpoint`
    pub fn fail_transport(&self, endpoint: &str, message: &str) {
        self.push(endpoint, Err(FetchError::new(message)));
    }

    fn push(&self, endpoint: &str, outcome: Result<FetchResponse, FetchError>) {
        self.scripts
            .lock()
            .unwrap()
            .entry(endpoint.to_string())
            .or_default()
            .push_back(outcome);
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_for(&self, endpoint: &str) -> Vec<RecordedCall> {
        self.calls().into_iter().filter(|c| c.url.ends_with(endpoint)).collect()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Fetch for ScriptedFetcher {
    async fn get(
        &self,
        url: &str,
        headers: &[(String, String)],
    ) -> Result<FetchResponse, FetchError> {
        self.calls.lock().unwrap().push(RecordedCall {
            url: url.to_string(),
            headers: headers.to_vec(),
            at: Instant::now(),
        });

        if let Some(delay) = self.call_delay {
            tokio::time::sleep(delay).await;
        }

        let scripted = {
            let mut scripts = self.scripts.lock().unwrap();
            scripts
                .iter_mut()
                .find(|(endpoint, _)| url.ends_with(endpoint.as_str()))
                .and_then(|(_, queue)| queue.pop_front())
        };

        scripted.unwrap_or_else(|| {
            Ok(FetchResponse { status: 200, reason: "OK".to_string(), body: b"[]".to_vec() })
        })
    }
}

/// In-memory sync log sink with a switchable failure mode
pub struct MemorySink {
    entries: Mutex<Vec<SyncLogEntry>>,
    fail: AtomicBool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self { entries: Mutex::new(Vec::new()), fail: AtomicBool::new(false) }
    }

    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn entries(&self) -> Vec<SyncLogEntry> {
        self.entries.lock().unwrap().clone()
    }

    pub fn entries_for(&self, endpoint: &str) -> Vec<SyncLogEntry> {
        self.entries().into_iter().filter(|e| e.endpoint == endpoint).collect()
    }
}

#[async_trait]
impl SyncLogSink for MemorySink {
    async fn append(&self, entry: &SyncLogEntry) -> apisync::Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(anyhow!("sink unavailable"));
        }

        self.entries.lock().unwrap().push(entry.clone());
        Ok(())
    }
}
