//! Per-directory staging area
//!
//! While a level is rebuilt, its previous entries are parked in a hidden
//! directory inside that level. Moves within one directory are renames on the
//! same volume, so nothing is copied twice. Entries that are still wanted are
//! moved back; whatever remains is removed when the level is done.
//!
//! A staging directory left behind by an interrupted run is reused as-is:
//! staged entries are never overwritten, so a resumed run restores them
//! instead of copying the files again.

use crate::scanner::sort_key;
use std::ffi::OsStr;
use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use sticksync_types::{Error, Result};
use tracing::debug;

/// Staging directory of one destination level
#[derive(Debug, Clone)]
pub struct StagingArea {
    level: PathBuf,
    path: PathBuf,
}

impl StagingArea {
    /// Describe the staging area `name` inside `level`
    ///
    /// Nothing is created until the first backup.
    pub fn new(level: impl Into<PathBuf>, name: impl AsRef<OsStr>) -> Self {
        let level = level.into();
        let path = level.join(name.as_ref());
        Self { level, path }
    }

    /// Location of the staging directory
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the staging directory exists
    pub fn exists(&self) -> bool {
        fs::symlink_metadata(&self.path).is_ok()
    }

    /// Move `level/name` into the staging area
    ///
    /// Returns `false` without touching anything when an entry of that name is
    /// already staged, or when `level/name` has vanished.
    pub fn backup(&self, name: &OsStr) -> Result<bool> {
        let staged = self.path.join(name);
        if present(&staged)? {
            debug!("{} already staged", staged.display());
            return Ok(false);
        }

        self.ensure_created()?;
        let original = self.level.join(name);
        match fs::rename(&original, &staged) {
            Ok(()) => {
                debug!("Staged: {} -> {}", original.display(), staged.display());
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("{} vanished before backup", original.display());
                Ok(false)
            }
            Err(e) => Err(move_error(&original, &staged, e)),
        }
    }

    /// Move the staged entry `name` to `destination/name`
    ///
    /// An entry already at the target is replaced. Returns `false` when
    /// nothing of that name is staged.
    pub fn restore(&self, name: &OsStr, destination: &Path) -> Result<bool> {
        self.restore_as(name, &destination.join(name))
    }

    /// Move the staged entry `name` to `target`
    ///
    /// Used when the entry comes back under a different spelling of its name.
    pub fn restore_as(&self, name: &OsStr, target: &Path) -> Result<bool> {
        let staged = self.path.join(name);
        if !present(&staged)? {
            return Ok(false);
        }

        remove_path(target)?;
        match fs::rename(&staged, target) {
            Ok(()) => {
                debug!("Restored: {} -> {}", staged.display(), target.display());
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(move_error(&staged, target, e)),
        }
    }

    /// Move every child of the staged directory `name` into `destination`
    ///
    /// Children are moved in the canonical snapshot order, so a level that is
    /// later skipped still has its entries written in sorted order. Returns
    /// the restored destination paths; empty when `name` is not a staged
    /// directory.
    pub fn restore_children(&self, name: &OsStr, destination: &Path) -> Result<Vec<PathBuf>> {
        let staged_dir = self.path.join(name);
        match fs::metadata(&staged_dir) {
            Ok(metadata) if metadata.is_dir() => {}
            Ok(_) => return Ok(Vec::new()),
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(Error::from_io(e, &staged_dir)),
        }

        let read_dir = match fs::read_dir(&staged_dir) {
            Ok(read_dir) => read_dir,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(Error::from_io(e, &staged_dir)),
        };

        let mut children = Vec::new();
        for entry in read_dir {
            let entry = entry.map_err(|e| Error::from_io(e, &staged_dir))?;
            children.push(entry.file_name());
        }
        children.sort_by_cached_key(|child| sort_key(child));

        let mut restored = Vec::new();
        for child in children {
            let from = staged_dir.join(&child);
            let target = destination.join(&child);
            remove_path(&target)?;
            match fs::rename(&from, &target) {
                Ok(()) => restored.push(target),
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(move_error(&from, &target, e)),
            }
        }

        debug!(
            "Restored {} children of {} into {}",
            restored.len(),
            staged_dir.display(),
            destination.display()
        );
        Ok(restored)
    }

    /// Remove the staging directory and everything left in it
    ///
    /// Returns `true` when something was removed.
    pub fn clear(&self) -> Result<bool> {
        match fs::remove_dir_all(&self.path) {
            Ok(()) => {
                debug!("Cleared staging area {}", self.path.display());
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(Error::Io {
                message: format!(
                    "Failed to clear staging area '{}': {}",
                    self.path.display(),
                    e
                ),
            }),
        }
    }

    fn ensure_created(&self) -> Result<()> {
        match fs::create_dir(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(()),
            Err(e) => Err(Error::Io {
                message: format!(
                    "Failed to create staging area '{}': {}",
                    self.path.display(),
                    e
                ),
            }),
        }
    }
}

/// Delete a file or directory tree; a missing path is not an error
///
/// Returns `true` when something was deleted.
pub(crate) fn remove_path(path: &Path) -> Result<bool> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(Error::from_io(e, path)),
    };

    let result = if metadata.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };

    match result {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(Error::Io {
            message: format!("Failed to delete '{}': {}", path.display(), e),
        }),
    }
}

fn present(path: &Path) -> Result<bool> {
    match fs::symlink_metadata(path) {
        Ok(_) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(Error::from_io(e, path)),
    }
}

fn move_error(from: &Path, to: &Path, e: io::Error) -> Error {
    Error::Io {
        message: format!(
            "Failed to move '{}' to '{}': {}",
            from.display(),
            to.display(),
            e
        ),
    }
}
