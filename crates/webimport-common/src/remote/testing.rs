//! In-memory transport for unit tests.

use crate::remote::error::{ResolverError, Result};
use crate::remote::transport::{Transport, TransportResponse};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// How a request fails before any status arrives.
#[derive(Clone, Copy)]
enum Failure {
    Unreachable,
    Timeout,
}

/// Transport answering from fixed routes and counting every request.
#[derive(Default)]
pub struct MockTransport {
    heads: HashMap<String, u16>,
    gets: HashMap<String, TransportResponse>,
    head_failure: Option<Failure>,
    get_failure: Option<Failure>,
    head_calls: AtomicUsize,
    get_calls: AtomicUsize,
    log: Mutex<Vec<String>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transport whose every request fails at the connection level.
    pub fn unreachable() -> Self {
        Self {
            head_failure: Some(Failure::Unreachable),
            get_failure: Some(Failure::Unreachable),
            ..Self::default()
        }
    }

    /// Transport whose every request runs past its deadline.
    pub fn timing_out() -> Self {
        Self {
            head_failure: Some(Failure::Timeout),
            get_failure: Some(Failure::Timeout),
            ..Self::default()
        }
    }

    /// Answer HEAD from the routes but let every GET time out.
    pub fn with_get_timeout(mut self) -> Self {
        self.get_failure = Some(Failure::Timeout);
        self
    }

    pub fn with_head(mut self, path: &str, status: u16) -> Self {
        self.heads.insert(path.to_string(), status);
        self
    }

    pub fn with_get(mut self, path: &str, status: u16, body: &str) -> Self {
        self.gets
            .insert(path.to_string(), TransportResponse::new(status, body.as_bytes()));
        self
    }

    /// Serve `path` as an ordinary file for both HEAD and GET.
    pub fn with_file(self, path: &str, body: &str) -> Self {
        self.with_head(path, 200).with_get(path, 200, body)
    }

    pub fn head_calls(&self) -> usize {
        self.head_calls.load(Ordering::SeqCst)
    }

    pub fn get_calls(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.head_calls() + self.get_calls()
    }

    /// Requests seen so far, as `METHOD path`.
    pub fn log(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    fn fail(failure: Failure, path: &str) -> Result<TransportResponse> {
        let url = format!("mock://{}", path);
        Err(match failure {
            Failure::Unreachable => ResolverError::RemoteUnreachable {
                url,
                message: "connection refused".to_string(),
            },
            Failure::Timeout => ResolverError::Timeout { url, seconds: 1 },
        })
    }
}

impl Transport for MockTransport {
    fn head(&self, path: &str) -> Result<TransportResponse> {
        self.head_calls.fetch_add(1, Ordering::SeqCst);
        self.log.lock().unwrap().push(format!("HEAD {}", path));
        if let Some(failure) = self.head_failure {
            return Self::fail(failure, path);
        }
        Ok(TransportResponse::status(
            self.heads.get(path).copied().unwrap_or(404),
        ))
    }

    fn get(&self, path: &str) -> Result<TransportResponse> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        self.log.lock().unwrap().push(format!("GET {}", path));
        if let Some(failure) = self.get_failure {
            return Self::fail(failure, path);
        }
        Ok(self
            .gets
            .get(path)
            .cloned()
            .unwrap_or_else(|| TransportResponse::status(404)))
    }
}
