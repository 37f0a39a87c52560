//! Configuration for the HTTP broker client.

use std::time::Duration;

/// Default broker base URL for local development.
pub const DEFAULT_BASE_URL: &str = "http://localhost:7410";

/// Default timeout for broker requests in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for [`HttpConsumerClient`](crate::HttpConsumerClient).
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Base URL of the broker API.
    pub base_url: String,

    /// Bearer token for authorization. If None, requests are unauthenticated.
    pub api_token: Option<String>,

    /// Timeout applied to every broker request.
    pub timeout: Duration,
}

impl HttpClientConfig {
    /// Create a configuration for the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: if base_url.is_empty() {
                DEFAULT_BASE_URL.to_string()
            } else {
                base_url
            },
            api_token: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Set the bearer token for authorization.
    pub fn with_api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    /// Set the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}
