//! In-memory filesystem adapter for testing.

use std::{
    collections::{BTreeMap, HashMap, HashSet},
    path::{Path, PathBuf},
    sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use cuecfg_core::{
    application::{
        ApplicationError,
        ports::{Filesystem, LinkKind},
    },
    error::CuecfgResult,
};

/// In-memory filesystem for testing.
///
/// Directory links are recorded rather than followed: [`Self::link_target`]
/// reports where a link points.
#[derive(Debug, Clone)]
pub struct MemoryFilesystem {
    inner: Arc<RwLock<MemoryFilesystemInner>>,
}

#[derive(Debug, Default)]
struct MemoryFilesystemInner {
    files: HashMap<PathBuf, String>,
    directories: HashSet<PathBuf>,
    links: BTreeMap<PathBuf, PathBuf>,
    /// Paths whose writes fail, for rollback tests.
    read_only: HashSet<PathBuf>,
}

impl MemoryFilesystem {
    /// Create a new empty memory filesystem.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(MemoryFilesystemInner::default())),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, MemoryFilesystemInner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, MemoryFilesystemInner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Read a file's content (testing helper).
    pub fn read_file(&self, path: &Path) -> Option<String> {
        self.read().files.get(path).cloned()
    }

    /// List all files, sorted.
    pub fn list_files(&self) -> Vec<PathBuf> {
        let mut files: Vec<_> = self.read().files.keys().cloned().collect();
        files.sort();
        files
    }

    /// Target of a directory link created by [`Filesystem::link_or_copy_dir`].
    pub fn link_target(&self, link: &Path) -> Option<PathBuf> {
        self.read().links.get(link).cloned()
    }

    /// Make every later write to `path` fail.
    pub fn deny_writes(&self, path: impl Into<PathBuf>) {
        self.write().read_only.insert(path.into());
    }

    /// Clear all contents.
    pub fn clear(&self) {
        let mut inner = self.write();
        inner.files.clear();
        inner.directories.clear();
        inner.links.clear();
        inner.read_only.clear();
    }
}

impl Default for MemoryFilesystem {
    fn default() -> Self {
        Self::new()
    }
}

fn has_parent(inner: &MemoryFilesystemInner, path: &Path) -> bool {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => inner.directories.contains(parent),
        _ => true,
    }
}

impl Filesystem for MemoryFilesystem {
    fn read_to_string(&self, path: &Path) -> CuecfgResult<Option<String>> {
        Ok(self.read_file(path))
    }

    fn write_file(&self, path: &Path, content: &str) -> CuecfgResult<()> {
        let mut inner = self.write();

        if inner.read_only.contains(path) {
            return Err(ApplicationError::FilesystemError {
                path: path.to_path_buf(),
                reason: "Failed to write file: permission denied".into(),
            }
            .into());
        }
        if !has_parent(&inner, path) {
            return Err(ApplicationError::FilesystemError {
                path: path.to_path_buf(),
                reason: "Parent directory does not exist".into(),
            }
            .into());
        }

        inner.files.insert(path.to_path_buf(), content.to_string());
        Ok(())
    }

    fn create_dir_all(&self, path: &Path) -> CuecfgResult<()> {
        let mut inner = self.write();

        let mut current = PathBuf::new();
        for component in path.components() {
            current.push(component);
            inner.directories.insert(current.clone());
        }

        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        let inner = self.read();
        inner.files.contains_key(path)
            || inner.directories.contains(path)
            || inner.links.contains_key(path)
    }

    fn remove_file(&self, path: &Path) -> CuecfgResult<()> {
        self.write().files.remove(path);
        Ok(())
    }

    fn link_or_copy_dir(&self, source: &Path, link: &Path) -> CuecfgResult<LinkKind> {
        let mut inner = self.write();

        if inner.links.contains_key(link) || inner.directories.contains(link) {
            return Ok(LinkKind::Existing);
        }
        if !has_parent(&inner, link) {
            return Err(ApplicationError::FilesystemError {
                path: link.to_path_buf(),
                reason: "Parent directory does not exist".into(),
            }
            .into());
        }

        inner.links.insert(link.to_path_buf(), source.to_path_buf());
        Ok(LinkKind::Symlink)
    }
}
