//! Artifact server for remote resolvers.
//!
//! Serves a directory with the semantics resolvers rely on:
//!
//! - a file answers 200 (GET carries the bytes, HEAD none)
//! - a directory requested without a trailing slash answers 301 to `path/`
//! - a directory with a trailing slash serves its `index.html`, else 404
//! - `/_hook` answers the resolver's own source as `text/plain`
//!
//! There is no directory listing.

use percent_encoding::percent_decode_str;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tiny_http::{Header, Method, Request, Response, Server};
use tracing::{debug, info, warn};
use webimport_common::remote::RESOLVER_SOURCE;
use webimport_common::vfs::Vfs;

/// Well-known path of the diagnostic hook.
pub const HOOK_PATH: &str = "/_hook";

const DIRECTORY_INDEX: &str = "index.html";

/// Errors raised while starting the server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Could not bind the listening socket
    #[error("Failed to bind {addr}: {message}")]
    Bind {
        /// Address that was requested
        addr: String,
        /// Underlying error message
        message: String,
    },

    /// Serving root is not a directory
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),
}

/// Response decided for one request, independent of the socket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: u16,
    pub body: Vec<u8>,
    pub content_type: Option<&'static str>,
    pub location: Option<String>,
}

impl Reply {
    fn status(status: u16) -> Self {
        Self {
            status,
            body: Vec::new(),
            content_type: None,
            location: None,
        }
    }

    fn ok(body: Vec<u8>, content_type: &'static str) -> Self {
        Self {
            content_type: Some(content_type),
            ..Self::status(200).with_body(body)
        }
    }

    fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    fn redirect(location: String) -> Self {
        Self {
            location: Some(location),
            ..Self::status(301)
        }
    }
}

/// Guess a content type from the file extension.
fn content_type_for(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("html") | Some("htm") => "text/html",
        Some("py") | Some("txt") | Some("md") | Some("toml") => "text/plain",
        Some("json") => "application/json",
        _ => "application/octet-stream",
    }
}

/// Map a request path onto `root`, rejecting anything that climbs out.
///
/// Each segment is percent-decoded before it is checked, so `%2e%2e` and
/// `%2f` cannot smuggle a traversal or an extra separator past the check.
fn map_path(root: &Path, url_path: &str) -> Option<PathBuf> {
    let mut mapped = root.to_path_buf();
    for segment in url_path.split('/') {
        let decoded = percent_decode_str(segment).decode_utf8().ok()?;
        match decoded.as_ref() {
            "" | "." => {}
            ".." => return None,
            part if part.contains(['/', '\\', '\0']) => return None,
            part => mapped.push(part),
        }
    }
    Some(mapped)
}

/// Decide the reply for `method url` against `root` in `vfs`.
pub fn route(vfs: &dyn Vfs, root: &Path, method: &Method, url: &str) -> Reply {
    if *method != Method::Get && *method != Method::Head {
        return Reply::status(501);
    }

    let path = url.split(['?', '#']).next().unwrap_or_default();
    let is_head = *method == Method::Head;
    let body = |bytes: Vec<u8>| if is_head { Vec::new() } else { bytes };

    if path == HOOK_PATH {
        return Reply::ok(body(RESOLVER_SOURCE.as_bytes().to_vec()), "text/plain");
    }

    let Some(target) = map_path(root, path) else {
        warn!(url, "rejected path outside the serving root");
        return Reply::status(404);
    };

    if vfs.is_dir(&target) {
        if !path.ends_with('/') {
            let mut location = if path.starts_with('/') {
                path.to_string()
            } else {
                format!("/{}", path)
            };
            location.push('/');
            return Reply::redirect(location);
        }
        let index = target.join(DIRECTORY_INDEX);
        return match vfs.read(&index) {
            Ok(bytes) => Reply::ok(body(bytes), "text/html"),
            Err(_) => Reply::status(404),
        };
    }

    if path.ends_with('/') {
        return Reply::status(404);
    }

    match vfs.read(&target) {
        Ok(bytes) => Reply::ok(body(bytes), content_type_for(&target)),
        Err(_) => Reply::status(404),
    }
}

/// HTTP server exposing a directory of artifacts.
pub struct ArtifactServer<V: Vfs> {
    server: Server,
    vfs: V,
    root: PathBuf,
}

impl<V: Vfs> ArtifactServer<V> {
    /// Bind `addr` (e.g. `0.0.0.0:8080`, or port 0 for an ephemeral port).
    pub fn bind(addr: &str, vfs: V, root: impl Into<PathBuf>) -> Result<Self, ServerError> {
        let root = root.into();
        if !vfs.is_dir(&root) {
            return Err(ServerError::NotADirectory(root));
        }

        let server = Server::http(addr).map_err(|e| ServerError::Bind {
            addr: addr.to_string(),
            message: e.to_string(),
        })?;

        Ok(Self { server, vfs, root })
    }

    /// Port actually bound.
    pub fn port(&self) -> Option<u16> {
        self.server.server_addr().to_ip().map(|addr| addr.port())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Serve requests until [`ArtifactServer::unblock`] is called.
    pub fn serve(&self) {
        for request in self.server.incoming_requests() {
            self.handle(request);
        }
    }

    /// Stop a running [`ArtifactServer::serve`] loop.
    pub fn unblock(&self) {
        self.server.unblock();
    }

    fn handle(&self, request: Request) {
        let reply = route(&self.vfs, &self.root, request.method(), request.url());
        info!(
            method = %request.method(),
            url = request.url(),
            status = reply.status,
            "request"
        );

        let mut response = Response::from_data(reply.body).with_status_code(reply.status);
        if let Some(content_type) = reply.content_type {
            if let Ok(header) = Header::from_bytes(&b"Content-Type"[..], content_type.as_bytes()) {
                response = response.with_header(header);
            }
        }
        if let Some(location) = reply.location {
            if let Ok(header) = Header::from_bytes(&b"Location"[..], location.as_bytes()) {
                response = response.with_header(header);
            }
        }

        if let Err(e) = request.respond(response) {
            debug!("failed to send response: {}", e);
        }
    }
}
