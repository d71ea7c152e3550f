use super::Vfs;
use std::collections::HashMap;
use std::io::Result;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// In-Memory File System implementation (for testing)
///
/// Directories are implicit: a path is a directory when some file lives
/// beneath it.
#[derive(Clone, Default, Debug)]
pub struct MemoryVfs {
    files: Arc<Mutex<HashMap<PathBuf, Vec<u8>>>>,
}

impl MemoryVfs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, handy for fixtures.
    pub fn with_file(self, path: impl AsRef<Path>, content: impl AsRef<[u8]>) -> Self {
        self.files()
            .insert(Self::normalize_path(path.as_ref()), content.as_ref().to_vec());
        self
    }

    fn files(&self) -> MutexGuard<'_, HashMap<PathBuf, Vec<u8>>> {
        self.files.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn normalize_path(path: &Path) -> PathBuf {
        let mut normalized = PathBuf::new();
        for component in path.components() {
            match component {
                Component::CurDir | Component::RootDir | Component::Prefix(_) => continue,
                other => normalized.push(other),
            }
        }
        normalized
    }
}

impl Vfs for MemoryVfs {
    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        let path = MemoryVfs::normalize_path(path);
        self.files().get(&path).cloned().ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("File not found: {:?}", path),
            )
        })
    }

    fn write(&self, path: &Path, content: &[u8]) -> Result<()> {
        let path = MemoryVfs::normalize_path(path);
        self.files().insert(path, content.to_vec());
        Ok(())
    }

    fn is_file(&self, path: &Path) -> bool {
        let path = MemoryVfs::normalize_path(path);
        self.files().contains_key(&path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        let path = MemoryVfs::normalize_path(path);
        let files = self.files();
        if path.as_os_str().is_empty() {
            return !files.is_empty();
        }
        files.keys().any(|k| k.starts_with(&path) && k != &path)
    }
}
