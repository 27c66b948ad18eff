//! Polling configuration for Syncbeat.
//!
//! A [`PollingConfig`] is created once at startup, validated, and then shared
//! read-only by every concurrent fetch in a cycle.

use std::time::Duration;

use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{DEFAULT_RETRY_ATTEMPTS, DEFAULT_RETRY_DELAY_MS};

/// Configuration for the polling scheduler and endpoint poller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    /// Base URL the endpoint paths are appended to
    pub api_url: String,

    /// Bearer credential sent with every request when set
    pub api_key: Option<String>,

    /// Interval between poll cycles
    pub poll_interval: Duration,

    /// Ordered endpoint paths polled each cycle (duplicates allowed)
    pub endpoints: Vec<String>,

    /// Fetch attempts per endpoint per cycle
    pub retry_attempts: u32,

    /// Fixed delay between consecutive attempts for one endpoint
    pub retry_delay: Duration,
}

impl PollingConfig {
    /// Create a configuration with default retry parameters and no endpoints
    pub fn new(api_url: impl Into<String>, poll_interval: Duration) -> Self {
        Self {
            api_url: api_url.into(),
            api_key: None,
            poll_interval,
            endpoints: Vec::new(),
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
            retry_delay: Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
        }
    }

    /// Create a new configuration builder
    pub fn builder(api_url: impl Into<String>, poll_interval: Duration) -> PollingConfigBuilder {
        PollingConfigBuilder { config: Self::new(api_url, poll_interval) }
    }

    /// Set the bearer credential
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the endpoint paths
    pub fn with_endpoints(mut self, endpoints: Vec<String>) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Set the retry attempt budget
    pub fn with_retry_attempts(mut self, attempts: u32) -> Self {
        self.retry_attempts = attempts;
        self
    }

    /// Set the inter-attempt delay
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Validate the configuration before handing it to a scheduler
    pub fn validate(&self) -> crate::Result<()> {
        let url = Url::parse(&self.api_url).map_err(|e| anyhow!("Invalid api_url: {}", e))?;
        match url.scheme() {
            "http" | "https" => {}
            other => return Err(anyhow!("Unsupported api_url scheme: {}", other)),
        }

        if self.poll_interval.is_zero() {
            return Err(anyhow!("poll_interval must be greater than zero"));
        }

        if self.retry_attempts == 0 {
            return Err(anyhow!("retry_attempts must be at least 1"));
        }

        if self.endpoints.iter().any(|e| e.is_empty()) {
            return Err(anyhow!("endpoint paths must not be empty"));
        }

        Ok(())
    }
}

/// Builder for PollingConfig
pub struct PollingConfigBuilder {
    pub(crate) config: PollingConfig,
}

impl PollingConfigBuilder {
    /// Build the configuration
    pub fn build(self) -> PollingConfig {
        self.config
    }

    /// Set the bearer credential
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    /// Add an endpoint path
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.endpoints.push(endpoint.into());
        self
    }

    /// Set all endpoint paths at once
    pub fn endpoints(mut self, endpoints: Vec<String>) -> Self {
        self.config.endpoints = endpoints;
        self
    }

    /// Set the retry attempt budget
    pub fn retry_attempts(mut self, attempts: u32) -> Self {
        self.config.retry_attempts = attempts;
        self
    }

    /// Set the inter-attempt delay
    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.config.retry_delay = delay;
        self
    }
}
