use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::core::errors::{Error, Result};

/// File-system mutation capability invoked by the operation log during replay.
///
/// The surrounding application performs forward actions through the same
/// interface before recording them, so undo and redo re-use one code path.
pub trait FileOps {
    /// Copies a file or directory tree, creating missing parent directories.
    fn copy(&self, src: &Path, dst: &Path) -> Result<()>;
    /// Moves `src` to `dst`, falling back to copy+remove across devices.
    fn move_path(&self, src: &Path, dst: &Path) -> Result<()>;
    /// Moves `path` into the backup area and returns the backup location.
    fn delete(&self, path: &Path) -> Result<PathBuf>;
    /// Renames `path` to a sibling named `new_name` and returns the new path.
    fn rename(&self, path: &Path, new_name: &OsStr) -> Result<PathBuf>;
}

/// Production [`FileOps`] over `std::fs` with a dedicated backup directory.
pub struct DiskFileOps {
    backup_root: PathBuf,
    backup_seq: AtomicU64,
}

impl DiskFileOps {
    pub fn new(backup_root: impl Into<PathBuf>) -> Result<Self> {
        let backup_root = backup_root.into();
        fs::create_dir_all(&backup_root)?;
        Ok(Self {
            backup_root,
            backup_seq: AtomicU64::new(0),
        })
    }

    pub fn backup_root(&self) -> &Path {
        &self.backup_root
    }

    fn next_backup_path(&self, original: &Path) -> PathBuf {
        let n = self.backup_seq.fetch_add(1, Ordering::Relaxed);
        let name = original
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "unnamed".to_string());
        self.backup_root.join(format!("{n:06}-{name}"))
    }
}

impl FileOps for DiskFileOps {
    fn copy(&self, src: &Path, dst: &Path) -> Result<()> {
        copy_recursive(src, dst)?;
        tracing::debug!("copied {:?} -> {:?}", src, dst);
        Ok(())
    }

    fn move_path(&self, src: &Path, dst: &Path) -> Result<()> {
        if let Some(parent) = dst.parent() {
            fs::create_dir_all(parent)?;
        }
        match fs::rename(src, dst) {
            Ok(()) => {}
            Err(_) => {
                // rename cannot cross file systems; copy then remove.
                copy_recursive(src, dst)?;
                remove_path(src)?;
            }
        }
        tracing::debug!("moved {:?} -> {:?}", src, dst);
        Ok(())
    }

    fn delete(&self, path: &Path) -> Result<PathBuf> {
        let backup = self.next_backup_path(path);
        self.move_path(path, &backup)?;
        tracing::debug!("deleted {:?}, backup at {:?}", path, backup);
        Ok(backup)
    }

    fn rename(&self, path: &Path, new_name: &OsStr) -> Result<PathBuf> {
        let parent = path.parent().ok_or_else(|| {
            Error::Other(format!("cannot rename path without a parent: {path:?}"))
        })?;
        let new_path = parent.join(new_name);
        fs::rename(path, &new_path)?;
        tracing::debug!("renamed {:?} -> {:?}", path, new_path);
        Ok(new_path)
    }
}

fn copy_recursive(src: &Path, dst: &Path) -> Result<()> {
    if fs::symlink_metadata(src)?.is_dir() {
        fs::create_dir_all(dst)?;
        for entry in fs::read_dir(src)? {
            let entry = entry?;
            copy_recursive(&entry.path(), &dst.join(entry.file_name()))?;
        }
    } else {
        if let Some(parent) = dst.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(src, dst)?;
    }
    Ok(())
}

fn remove_path(path: &Path) -> Result<()> {
    if fs::symlink_metadata(path)?.is_dir() {
        fs::remove_dir_all(path)?;
    } else {
        fs::remove_file(path)?;
    }
    Ok(())
}
