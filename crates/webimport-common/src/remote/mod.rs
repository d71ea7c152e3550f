//! Remote artifact resolution.
//!
//! This module lets a host runtime load units from an HTTP artifact server
//! instead of (or in addition to) its local namespace.
//!
//! # Overview
//!
//! - [`Transport`]: HEAD/GET against a single `host:port`
//! - [`PresenceCache`]: per-name local/remote state
//! - [`RemoteLocator`]: requests `path` then `path.py`; 200 is a file, 301 a package
//! - [`RemoteResolver`]: local-vs-remote precedence, `can_resolve`, `is_package`, `describe`
//! - [`Fetcher`]: GET at the resolved path
//!
//! # Server contract
//!
//! `HEAD /<path>` answers 200 when the resource exists as named and 301 when
//! it is a directory (the resolver then uses `<path>/__init__.py`). Any other
//! status means absent. `GET /<resolved>` answers 200 with the raw bytes.
//!
//! # Configuration
//!
//! ```toml
//! [remote]
//! host = "artifacts.local"
//! port = 8080
//! overrideLocal = false
//! cacheRemoteResult = true
//!
//! [remote.network]
//! timeoutSecs = 30
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use webimport_common::host::ModuleHost;
//! use webimport_common::remote::ResolverConfig;
//!
//! let host = ModuleHost::new();
//! let handle = host.register(ResolverConfig::new("artifacts.local", 8080))?;
//! let unit = host.import(&"a.b".parse()?);
//! ```
//!
//! # Failure policy
//!
//! A request that fails at the transport level is logged and recorded as
//! absent. Fetch failures are returned to the caller and never cached.

pub mod cache;
pub mod config;
pub mod error;
pub mod fetch;
pub mod locator;
pub mod resolver;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

// Re-exports for convenience
pub use cache::{LocalState, PresenceCache, PresenceRecord, RemoteState};
pub use config::{NetworkConfig, ResolverConfig, PACKAGE_INDEX_STEM};
pub use error::{ResolverError, Result};
pub use fetch::{Fetcher, RemoteArtifact};
pub use locator::RemoteLocator;
pub use resolver::{RemoteResolver, SpecDescriptor};
pub use transport::{HttpTransport, Transport, TransportResponse};

/// Source text of the resolver, served by the companion server at `/_hook`.
pub const RESOLVER_SOURCE: &str = include_str!("resolver.rs");
