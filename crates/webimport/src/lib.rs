//! webimport CLI library
//!
//! Exposes the artifact server for programmatic use and testing.

pub mod commands;
pub mod server;

pub use server::{ArtifactServer, Reply, ServerError};
