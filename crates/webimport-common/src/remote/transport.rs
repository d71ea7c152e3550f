//! HTTP transport used by the locator and fetcher.

use crate::remote::config::NetworkConfig;
use crate::remote::error::{ResolverError, Result};
use std::time::Duration;
use tracing::trace;

/// Status and body of one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Response with no body, as returned for HEAD.
    pub fn status(status: u16) -> Self {
        Self::new(status, Vec::new())
    }
}

/// Request/response exchange with a single artifact server.
///
/// `path` is relative to the server root and never starts with `/`.
/// Redirects must be reported as-is, not followed.
pub trait Transport: Send + Sync {
    /// Existence check without body transfer.
    fn head(&self, path: &str) -> Result<TransportResponse>;

    /// Content request.
    fn get(&self, path: &str) -> Result<TransportResponse>;
}

/// Blocking HTTP transport bound to one `host:port`.
pub struct HttpTransport {
    /// Base URL without trailing slash.
    base_url: String,

    /// Timeout reported in errors.
    timeout_secs: u64,

    /// reqwest client.
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    /// Create a new transport for `base_url` with the given network settings.
    pub fn new(base_url: impl Into<String>, config: &NetworkConfig) -> Result<Self> {
        let base_url = base_url.into();
        let mut builder = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            // A 301 is how the server reports a package directory.
            .redirect(reqwest::redirect::Policy::none());

        if let Some(ref ua) = config.user_agent {
            builder = builder.user_agent(ua);
        } else {
            builder = builder.user_agent(format!("webimport/{}", env!("CARGO_PKG_VERSION")));
        }

        let client = builder.build().map_err(|e| {
            ResolverError::Configuration(format!("Failed to create HTTP client: {}", e))
        })?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout_secs: config.timeout_secs,
            client,
        })
    }

    /// Full URL for a server-relative path.
    pub fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn send(&self, request: reqwest::blocking::RequestBuilder, url: &str) -> Result<reqwest::blocking::Response> {
        request.send().map_err(|e| self.map_error(e, url))
    }

    fn map_error(&self, e: reqwest::Error, url: &str) -> ResolverError {
        if e.is_timeout() {
            ResolverError::Timeout {
                url: url.to_string(),
                seconds: self.timeout_secs,
            }
        } else {
            ResolverError::RemoteUnreachable {
                url: url.to_string(),
                message: e.to_string(),
            }
        }
    }
}

impl Transport for HttpTransport {
    fn head(&self, path: &str) -> Result<TransportResponse> {
        let url = self.url_for(path);
        let response = self.send(self.client.head(&url), &url)?;
        trace!(%url, status = response.status().as_u16(), "HEAD");
        Ok(TransportResponse::status(response.status().as_u16()))
    }

    fn get(&self, path: &str) -> Result<TransportResponse> {
        let url = self.url_for(path);
        let response = self.send(self.client.get(&url), &url)?;
        let status = response.status().as_u16();
        trace!(%url, status, "GET");

        let body = response
            .bytes()
            .map(|b| b.to_vec())
            .map_err(|e| self.map_error(e, &url))?;
        Ok(TransportResponse::new(status, body))
    }
}
