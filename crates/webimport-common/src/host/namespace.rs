//! Local namespace backed by a directory of source files.

use crate::host::{Finder, LocalNamespace};
use crate::name::LogicalName;
use crate::remote::config::PACKAGE_INDEX_STEM;
use crate::remote::error::Result;
use crate::remote::resolver::SpecDescriptor;
use crate::vfs::Vfs;
use std::path::{Path, PathBuf};

/// Finds units as `<root>/a/b.py` or `<root>/a/b/__init__.py`.
pub struct VfsNamespace<V: Vfs> {
    vfs: V,
    root: PathBuf,
    extension: String,
}

impl<V: Vfs> VfsNamespace<V> {
    pub fn new(vfs: V, root: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            vfs,
            root: root.into(),
            extension: extension.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Module file first, then package index.
    fn locate(&self, name: &LogicalName) -> Option<(PathBuf, bool)> {
        let base = self.root.join(name.to_remote_path());

        let module = PathBuf::from(format!("{}{}", base.display(), self.extension));
        if self.vfs.is_file(&module) {
            return Some((module, false));
        }

        let index = base.join(format!("{}{}", PACKAGE_INDEX_STEM, self.extension));
        if self.vfs.is_file(&index) {
            return Some((index, true));
        }

        None
    }
}

impl<V: Vfs> Finder for VfsNamespace<V> {
    fn find_spec(&self, name: &LogicalName) -> Option<SpecDescriptor> {
        self.locate(name).map(|(path, is_package)| SpecDescriptor {
            name: name.clone(),
            is_package,
            origin: path.display().to_string(),
        })
    }

    fn get_data(&self, name: &LogicalName) -> Result<Vec<u8>> {
        match self.locate(name) {
            Some((path, _)) => Ok(self.vfs.read(&path)?),
            None => Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{} not found under {:?}", name, self.root),
            )
            .into()),
        }
    }
}

impl<V: Vfs> LocalNamespace for VfsNamespace<V> {
    fn contains(&self, name: &LogicalName) -> bool {
        self.locate(name).is_some()
    }
}
