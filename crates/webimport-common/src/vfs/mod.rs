//! Virtual file system used by the local namespace and the artifact server.

use std::io::Result;
use std::path::Path;

/// Virtual File System trait
///
/// Abstraction over the few file operations resolution needs, so the same
/// code runs against the OS or an in-memory tree in tests.
///
/// # Contract
///
/// - **`is_file(path)`** and **`is_dir(path)`** are mutually exclusive.
/// - **`exists(path)`**: file OR directory.
/// - **`read(path)`**: only succeeds for files.
/// - **`write(path, content)`**: creates parent directories as needed.
pub trait Vfs: Send + Sync {
    /// Read a file's bytes.
    ///
    /// Returns an error if the path does not exist or is a directory.
    fn read(&self, path: &Path) -> Result<Vec<u8>>;

    /// Write bytes to a file, overwriting it.
    fn write(&self, path: &Path, content: &[u8]) -> Result<()>;

    /// Check if a path is a regular file.
    fn is_file(&self, path: &Path) -> bool;

    /// Check if a path is a directory.
    fn is_dir(&self, path: &Path) -> bool;

    /// Check if a path exists (file OR directory).
    fn exists(&self, path: &Path) -> bool {
        self.is_file(path) || self.is_dir(path)
    }
}

// Re-export implementations
pub use memory::MemoryVfs;
pub use os::OsVfs;

mod memory;
mod os;
