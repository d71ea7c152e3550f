//! Logical names requested by the host runtime.

use crate::remote::error::{ResolverError, Result};
use std::fmt;

/// A dotted (or slash-separated) identifier naming a loadable unit, e.g. `a.b.c`.
///
/// Equality and hashing use the exact string the caller supplied, so `a.b`
/// and `a/b` are distinct cache keys even though they share a remote path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LogicalName(String);

impl LogicalName {
    /// Parse a logical name, rejecting empty names and empty segments.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() || name.split(['.', '/']).any(str::is_empty) {
            return Err(ResolverError::InvalidName(name));
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Path of this name on the remote host, separators replaced with `/`.
    pub fn to_remote_path(&self) -> String {
        self.0.replace('.', "/")
    }
}

impl fmt::Display for LogicalName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for LogicalName {
    type Err = ResolverError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<&str> for LogicalName {
    type Error = ResolverError;

    fn try_from(value: &str) -> Result<Self> {
        Self::new(value)
    }
}
