//! reqwest-backed implementation of the fetch capability.

use std::time::Duration;

use async_trait::async_trait;

use super::{Fetch, FetchError, FetchResponse};

/// HTTP fetcher used in production
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Build a fetcher with a per-request timeout
    pub fn new(timeout: Duration) -> crate::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent("syncbeat/0.1")
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn get(
        &self,
        url: &str,
        headers: &[(String, String)],
    ) -> Result<FetchResponse, FetchError> {
        let mut request = self.client.get(url);
        for (key, value) in headers {
            request = request.header(key, value);
        }

        let response = request.send().await?;

        let status = response.status();
        let reason = status.canonical_reason().unwrap_or("Unknown").to_string();
        let body = response.bytes().await?.to_vec();

        Ok(FetchResponse { status: status.as_u16(), reason, body })
    }
}
