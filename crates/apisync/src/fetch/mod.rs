//! HTTP fetch capability consumed by the endpoint poller.
//!
//! The poller talks to the network through the [`Fetch`] trait so tests can
//! substitute a scripted transport.

pub mod http;

pub use http::HttpFetcher;

use async_trait::async_trait;
use thiserror::Error;

/// Transport-level fetch failure. Carries the raw error message so it can be
/// recorded verbatim in the sync log.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct FetchError {
    pub message: String,
}

impl FetchError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        Self::new(err.to_string())
    }
}

/// Response to a fetch request
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// HTTP status code
    pub status: u16,

    /// Canonical status text, e.g. "Internal Server Error"
    pub reason: String,

    /// Raw response body
    pub body: Vec<u8>,
}

impl FetchResponse {
    /// Whether the response counts as a successful attempt. Strictly 2xx:
    /// redirects are a protocol failure for a polling target.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Fetch trait abstracting the HTTP transport
#[async_trait]
pub trait Fetch: Send + Sync {
    /// Issue a GET request with the given headers and return the status and
    /// body, or a transport error
    async fn get(
        &self,
        url: &str,
        headers: &[(String, String)],
    ) -> Result<FetchResponse, FetchError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_2xx_counts_as_success() {
        let ok = FetchResponse { status: 204, reason: "No Content".into(), body: Vec::new() };
        assert!(ok.is_success());

        let redirect = FetchResponse { status: 301, reason: "Moved Permanently".into(), body: Vec::new() };
        assert!(!redirect.is_success());

        let server_error = FetchResponse { status: 500, reason: "Internal Server Error".into(), body: Vec::new() };
        assert!(!server_error.is_success());
    }

    #[test]
    fn fetch_error_displays_raw_message() {
        let err = FetchError::new("connection refused");
        assert_eq!(err.to_string(), "connection refused");
    }
}
