//! Local filesystem adapter using std::fs.

use std::fs;
use std::io;
use std::path::Path;

use tracing::{debug, warn};
use uuid::Uuid;
use walkdir::WalkDir;

use cuecfg_core::{
    application::{
        ApplicationError,
        ports::{Filesystem, LinkKind},
    },
    error::{CuecfgError, CuecfgResult},
};

/// Production filesystem implementation using `std::fs`.
///
/// File writes go through a temporary sibling and a rename, so a reader
/// never sees a half-written artifact.
#[derive(Debug, Clone, Copy)]
pub struct LocalFilesystem;

impl LocalFilesystem {
    /// Create a new local filesystem adapter.
    pub fn new() -> Self {
        Self
    }
}

impl Default for LocalFilesystem {
    fn default() -> Self {
        Self::new()
    }
}

impl Filesystem for LocalFilesystem {
    fn read_to_string(&self, path: &Path) -> CuecfgResult<Option<String>> {
        match fs::read_to_string(path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(map_io_error(path, e, "read file")),
        }
    }

    fn write_file(&self, path: &Path, content: &str) -> CuecfgResult<()> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let temp = path.with_file_name(format!(".{file_name}.{}.tmp", Uuid::new_v4().simple()));

        fs::write(&temp, content).map_err(|e| map_io_error(path, e, "write file"))?;
        if let Err(e) = fs::rename(&temp, path) {
            let _ = fs::remove_file(&temp);
            return Err(map_io_error(path, e, "replace file"));
        }
        Ok(())
    }

    fn create_dir_all(&self, path: &Path) -> CuecfgResult<()> {
        fs::create_dir_all(path).map_err(|e| map_io_error(path, e, "create directory"))
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn remove_file(&self, path: &Path) -> CuecfgResult<()> {
        match fs::remove_file(path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => {
                Err(map_io_error(path, e, "remove file"))
            }
            _ => Ok(()),
        }
    }

    fn link_or_copy_dir(&self, source: &Path, link: &Path) -> CuecfgResult<LinkKind> {
        // A dangling link still counts as present.
        if fs::symlink_metadata(link).is_ok() {
            debug!(link = %link.display(), "Link target already present");
            return Ok(LinkKind::Existing);
        }

        match symlink_dir(source, link) {
            Ok(()) => Ok(LinkKind::Symlink),
            Err(e) => {
                warn!(
                    source = %source.display(),
                    link = %link.display(),
                    error = %e,
                    "Symlink failed, copying instead"
                );
                copy_dir(source, link)?;
                Ok(LinkKind::Copy)
            }
        }
    }
}

#[cfg(unix)]
fn symlink_dir(source: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(source, link)
}

#[cfg(windows)]
fn symlink_dir(source: &Path, link: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_dir(source, link)
}

#[cfg(not(any(unix, windows)))]
fn symlink_dir(_source: &Path, _link: &Path) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "symbolic links are not supported",
    ))
}

/// Recursively copy `source` into `dest`.
///
/// When `dest` sits inside `source`, the branch leading to it is skipped.
fn copy_dir(source: &Path, dest: &Path) -> CuecfgResult<()> {
    fs::create_dir_all(dest).map_err(|e| map_io_error(dest, e, "create directory"))?;

    let walker = WalkDir::new(source)
        .min_depth(1)
        .into_iter()
        .filter_entry(|entry| !dest.starts_with(entry.path()));

    for entry in walker {
        let entry = entry.map_err(|e| ApplicationError::FilesystemError {
            path: source.to_path_buf(),
            reason: format!("Failed to walk directory: {e}"),
        })?;
        let Ok(relative) = entry.path().strip_prefix(source) else {
            continue;
        };
        let target = dest.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(|e| map_io_error(&target, e, "create directory"))?;
        } else if entry.file_type().is_file() {
            fs::copy(entry.path(), &target).map_err(|e| map_io_error(&target, e, "copy file"))?;
        }
    }

    Ok(())
}

fn map_io_error(path: &Path, e: io::Error, operation: &str) -> CuecfgError {
    ApplicationError::FilesystemError {
        path: path.to_path_buf(),
        reason: format!("Failed to {operation}: {e}"),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn read_missing_is_none() {
        let temp = TempDir::new().unwrap();
        let fs = LocalFilesystem::new();
        assert_eq!(fs.read_to_string(&temp.path().join("nope")).unwrap(), None);
    }

    #[test]
    fn write_replaces_and_leaves_no_temp_files() {
        let temp = TempDir::new().unwrap();
        let fs = LocalFilesystem::new();
        let path = temp.path().join("package.json");

        fs.write_file(&path, "one").unwrap();
        fs.write_file(&path, "two").unwrap();

        assert_eq!(fs.read_to_string(&path).unwrap().as_deref(), Some("two"));
        let entries = std::fs::read_dir(temp.path()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn write_into_missing_directory_fails() {
        let temp = TempDir::new().unwrap();
        let err = LocalFilesystem::new()
            .write_file(&temp.path().join("missing/file.txt"), "x")
            .unwrap_err();
        assert!(err.to_string().contains("Failed to write file"));
    }

    #[test]
    fn remove_file_tolerates_missing() {
        let temp = TempDir::new().unwrap();
        LocalFilesystem::new()
            .remove_file(&temp.path().join("nope"))
            .unwrap();
    }

    #[test]
    fn links_directory_once() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("catalog");
        std::fs::create_dir_all(&source).unwrap();
        std::fs::write(source.join("base.cue"), "package catalog\n").unwrap();
        let link = temp.path().join("link");

        let fs = LocalFilesystem::new();
        let kind = fs.link_or_copy_dir(&source, &link).unwrap();
        assert!(matches!(kind, LinkKind::Symlink | LinkKind::Copy));
        assert!(link.join("base.cue").exists());

        assert_eq!(fs.link_or_copy_dir(&source, &link).unwrap(), LinkKind::Existing);
    }

    #[test]
    fn copy_skips_destination_inside_source() {
        let temp = TempDir::new().unwrap();
        let source = temp.path();
        std::fs::write(source.join("features.json"), "{}").unwrap();
        std::fs::create_dir_all(source.join("nested")).unwrap();
        std::fs::write(source.join("nested/a.cue"), "a").unwrap();
        let dest = source.join("cue.mod/pkg/cuecfg.catalog");

        copy_dir(source, &dest).unwrap();

        assert!(dest.join("features.json").exists());
        assert!(dest.join("nested/a.cue").exists());
        assert!(!dest.join("cue.mod").exists());
    }
}
