//! Shared fixtures for end-to-end tests.
//!
//! [`ServerFixture`] serves a temporary directory on an ephemeral port for
//! the lifetime of the fixture.

use anyhow::{Context, Result, anyhow};
use std::path::Path;
use std::sync::Arc;
use std::thread::JoinHandle;
use tempfile::TempDir;
use webimport::ArtifactServer;
use webimport_common::remote::ResolverConfig;
use webimport_common::vfs::{OsVfs, Vfs};

/// A running artifact server over a temporary directory.
pub struct ServerFixture {
    dir: TempDir,
    server: Arc<ArtifactServer<OsVfs>>,
    worker: Option<JoinHandle<()>>,
    port: u16,
}

impl ServerFixture {
    /// Start serving an empty temporary directory.
    pub fn start() -> Result<Self> {
        let dir = tempfile::tempdir().context("Failed to create temp dir")?;
        let server = ArtifactServer::bind("127.0.0.1:0", OsVfs, dir.path())?;
        let port = server
            .port()
            .ok_or_else(|| anyhow!("server is not bound to an IP address"))?;

        let server = Arc::new(server);
        let worker = {
            let server = server.clone();
            std::thread::spawn(move || server.serve())
        };

        Ok(Self {
            dir,
            server,
            worker: Some(worker),
            port,
        })
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Write `content` at `relative` under the served directory.
    pub fn write(&self, relative: &str, content: &str) -> Result<()> {
        let path = self.dir.path().join(relative);
        OsVfs
            .write(&path, content.as_bytes())
            .with_context(|| format!("Failed to write {:?}", path))
    }

    /// Resolver config pointing at this server.
    pub fn config(&self) -> ResolverConfig {
        ResolverConfig::new("127.0.0.1", self.port)
    }
}

impl Drop for ServerFixture {
    fn drop(&mut self) {
        self.server.unblock();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}
