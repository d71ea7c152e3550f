//! Error types for remote resolution.

use thiserror::Error;

/// Errors that can occur while resolving or fetching remote artifacts.
#[derive(Debug, Error)]
pub enum ResolverError {
    /// Bad registration arguments. Never retried.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Logical name is empty or has empty segments
    #[error("Invalid logical name: {0:?}")]
    InvalidName(String),

    /// Transport-level failure (connection refused, bad host, ...)
    #[error("Remote unreachable at {url}: {message}")]
    RemoteUnreachable {
        /// URL being requested
        url: String,
        /// Underlying transport message
        message: String,
    },

    /// Timeout error
    #[error("Timeout after {seconds}s requesting {url}")]
    Timeout {
        /// URL being requested
        url: String,
        /// Timeout in seconds
        seconds: u64,
    },

    /// The resolved path existed at lookup time but GET failed for a non-package.
    #[error("Remote content missing for {name} (HTTP {status})")]
    RemoteContentMissing {
        /// Logical name being fetched
        name: String,
        /// Status returned by the server
        status: u16,
    },

    /// Fetch requested before a successful resolution.
    #[error("{0} has not been resolved remotely")]
    NotResolved(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ResolverError {
    /// Whether the failure came from the network rather than from the server's answer.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ResolverError::RemoteUnreachable { .. } | ResolverError::Timeout { .. }
        )
    }
}

/// Result type for resolver operations.
pub type Result<T> = std::result::Result<T, ResolverError>;
