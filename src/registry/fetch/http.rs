//! HTTP fetching.
//!
//! A thin blocking client that turns transport failures into
//! [`MemeError::Network`] and non-success responses into
//! [`MemeError::Service`]. No retries: retry and fallback policy belongs to
//! the template cache.

use reqwest::blocking::{Client, Response};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::error::{MemeError, Result};

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Fetches JSON documents and image bytes over HTTP/HTTPS.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    timeout: Duration,
}

impl HttpFetcher {
    /// Create a new HTTP fetcher with the default timeout.
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Create a new HTTP fetcher with custom timeout.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .user_agent(concat!("memeplot/", env!("CARGO_PKG_VERSION")))
                .timeout(timeout)
                .build()
                .expect("Failed to build HTTP client"),
            timeout,
        }
    }

    /// Get the configured timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Fetch a URL and return the raw body.
    pub fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.get(url)?;
        let body = response.bytes().map_err(|e| network_error(url, &e))?;
        Ok(body.to_vec())
    }

    /// Fetch a URL and decode the body as JSON.
    ///
    /// A body that does not decode is a service error: the server answered,
    /// just not with what it promised.
    pub fn fetch_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let body = self.fetch_bytes(url)?;
        serde_json::from_slice(&body).map_err(|e| MemeError::Service {
            url: url.to_string(),
            status: StatusCode::OK.as_u16(),
            message: format!("invalid JSON response: {}", e),
        })
    }

    fn get(&self, url: &str) -> Result<Response> {
        tracing::debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| network_error(url, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MemeError::Service {
                url: url.to_string(),
                status: status.as_u16(),
                message: status
                    .canonical_reason()
                    .unwrap_or("unexpected status")
                    .to_string(),
            });
        }

        Ok(response)
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

fn network_error(url: &str, err: &reqwest::Error) -> MemeError {
    let message = if err.is_timeout() {
        "request timed out".to_string()
    } else {
        err.to_string()
    };
    MemeError::Network {
        url: url.to_string(),
        message,
    }
}
