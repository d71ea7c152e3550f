//! Remote locator: decides where on the server a logical name lives.

use crate::name::LogicalName;
use crate::remote::config::PACKAGE_INDEX_STEM;
use crate::remote::error::Result;
use crate::remote::transport::Transport;
use std::sync::Arc;
use tracing::debug;

const STATUS_OK: u16 = 200;
const STATUS_MOVED_PERMANENTLY: u16 = 301;

/// Queries the remote host for a bare-file or package match.
pub struct RemoteLocator {
    transport: Arc<dyn Transport>,
    extension: String,
}

impl RemoteLocator {
    pub fn new(transport: Arc<dyn Transport>, extension: impl Into<String>) -> Self {
        Self {
            transport,
            extension: extension.into(),
        }
    }

    /// Locate `name` on the remote host.
    ///
    /// Requests `path` and then `path + extension`, stopping at the first 200
    /// (the requested path itself) or 301 (a directory, resolved to its package
    /// index without requesting the index). Any other status on both requests
    /// means absent. Transport failures are returned, not treated as absent.
    pub fn locate(&self, name: &LogicalName) -> Result<Option<String>> {
        let base = name.to_remote_path();

        for suffix in ["", self.extension.as_str()] {
            let candidate = format!("{}{}", base, suffix);
            let response = self.transport.head(&candidate)?;

            match response.status {
                STATUS_OK => {
                    debug!(name = %name, path = %candidate, "found as file");
                    return Ok(Some(candidate));
                }
                STATUS_MOVED_PERMANENTLY => {
                    let index = format!("{}/{}{}", candidate, PACKAGE_INDEX_STEM, self.extension);
                    debug!(name = %name, path = %index, "found as package");
                    return Ok(Some(index));
                }
                status => {
                    debug!(name = %name, path = %candidate, status, "not found");
                }
            }
        }

        Ok(None)
    }
}
