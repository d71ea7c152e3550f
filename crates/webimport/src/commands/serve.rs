//! Serve Command
//!
//! Serves a directory of source artifacts to remote resolvers.

use crate::server::ArtifactServer;
use starbase::AppResult;
use std::path::PathBuf;
use webimport_common::vfs::OsVfs;

pub fn run_serve(directory: PathBuf, port: u16) -> AppResult {
    let root = match std::fs::canonicalize(&directory) {
        Ok(root) => root,
        Err(e) => {
            eprintln!("Cannot serve {:?}: {}", directory, e);
            return Ok(Some(1));
        }
    };

    let addr = format!("0.0.0.0:{}", port);
    let server = match ArtifactServer::bind(&addr, OsVfs, root) {
        Ok(server) => server,
        Err(e) => {
            eprintln!("{}", e);
            return Ok(Some(1));
        }
    };

    println!(
        "Serving on port {} from directory \"{}\"...",
        server.port().unwrap_or(port),
        directory.display()
    );
    server.serve();

    Ok(None)
}
