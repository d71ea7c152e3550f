//! Content retrieval for resolved names.

use crate::name::LogicalName;
use crate::remote::error::{ResolverError, Result};
use crate::remote::transport::Transport;
use std::sync::Arc;
use tracing::{debug, error};

/// Outcome of a successful fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteArtifact {
    /// The content is (or stands in for) a package index.
    pub is_package_index: bool,
    pub content: Vec<u8>,
}

impl RemoteArtifact {
    /// Content as UTF-8 text, replacing invalid sequences.
    pub fn text(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.content)
    }
}

/// Issues content requests for already-resolved paths.
pub struct Fetcher {
    transport: Arc<dyn Transport>,
}

impl Fetcher {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// GET `path` and map the status to content.
    ///
    /// A non-200 answer for a package yields an empty index; for anything
    /// else it is `RemoteContentMissing`. Transport failures propagate.
    pub fn fetch(&self, name: &LogicalName, path: &str, is_package: bool) -> Result<RemoteArtifact> {
        let response = self.transport.get(path).inspect_err(|e| {
            error!(name = %name, path, "fetch failed: {}", e);
        })?;

        if response.status == 200 {
            debug!(name = %name, path, bytes = response.body.len(), "source found");
            return Ok(RemoteArtifact {
                is_package_index: is_package,
                content: response.body,
            });
        }

        if is_package {
            debug!(name = %name, path, status = response.status, "index missing, using empty one");
            return Ok(RemoteArtifact {
                is_package_index: true,
                content: Vec::new(),
            });
        }

        error!(name = %name, path, status = response.status, "not available remotely");
        Err(ResolverError::RemoteContentMissing {
            name: name.to_string(),
            status: response.status,
        })
    }
}
