//! Configuration for remote resolution.

use crate::remote::error::{ResolverError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration a resolver is registered with.
///
/// Immutable once handed to a resolver. Registering again creates a new,
/// independent resolver rather than mutating this one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolverConfig {
    /// Host name of the artifact server.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port of the artifact server.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Prefer remote artifacts over ones present locally.
    #[serde(default)]
    pub override_local: bool,

    /// Memoize the remote locate result per name.
    #[serde(default = "default_cache_remote_result")]
    pub cache_remote_result: bool,

    /// Source file extension tried after the bare path.
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Network settings.
    #[serde(default)]
    pub network: NetworkConfig,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            override_local: false,
            cache_remote_result: default_cache_remote_result(),
            extension: default_extension(),
            network: NetworkConfig::default(),
        }
    }
}

/// Network configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkConfig {
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// User agent string.
    pub user_agent: Option<String>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            user_agent: None,
        }
    }
}

/// Layout of `webimport.toml`.
#[derive(Debug, Deserialize)]
struct ConfigFile {
    remote: ResolverConfig,
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_cache_remote_result() -> bool {
    true
}

fn default_extension() -> String {
    ".py".to_string()
}

fn default_timeout() -> u64 {
    30
}

impl ResolverConfig {
    /// Create a config pointing at `host:port` with all other settings defaulted.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    pub fn with_override_local(mut self, override_local: bool) -> Self {
        self.override_local = override_local;
        self
    }

    pub fn with_cache_remote_result(mut self, cache: bool) -> Self {
        self.cache_remote_result = cache;
        self
    }

    /// Load the `[remote]` table of a TOML file and validate it.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse the `[remote]` table from TOML text and validate it.
    ///
    /// Type mismatches (a non-string host, a non-integer port) are reported as
    /// configuration errors.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(content)
            .map_err(|e| ResolverError::Configuration(e.to_string()))?;
        file.remote.validate()?;
        Ok(file.remote)
    }

    /// Check the settings before any network activity happens.
    pub fn validate(&self) -> Result<()> {
        let host = self.host.trim();
        if host.is_empty() {
            return Err(ResolverError::Configuration(
                "'host' should be a non-empty string".to_string(),
            ));
        }
        if host.contains(['/', ' ', '?', '#']) {
            return Err(ResolverError::Configuration(format!(
                "'host' should be a bare host name, got {:?}",
                self.host
            )));
        }
        if self.port == 0 {
            return Err(ResolverError::Configuration(
                "'port' should be a non-zero integer".to_string(),
            ));
        }
        if !self.extension.starts_with('.') || self.extension.len() < 2 {
            return Err(ResolverError::Configuration(format!(
                "'extension' should look like \".py\", got {:?}",
                self.extension
            )));
        }
        Ok(())
    }

    /// Base URL of the artifact server, without a trailing slash.
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host.trim(), self.port)
    }

    /// Suffix marking a resolved path as a package index (`/__init__.py`).
    pub fn package_index_suffix(&self) -> String {
        format!("/{}{}", PACKAGE_INDEX_STEM, self.extension)
    }
}

/// File stem of a package's index artifact.
pub const PACKAGE_INDEX_STEM: &str = "__init__";
