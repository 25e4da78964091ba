//! Occupied and free space queries
//!
//! Both figures come from native APIs: the occupied size is a directory walk
//! summing file lengths, the free space is a volume query on the platform.

use std::path::Path;
use sticksync_types::{Error, Result};
use tracing::debug;
use walkdir::WalkDir;

/// Source of the two figures the capacity preflight compares
pub trait SpaceProbe {
    /// Total bytes occupied by the files below `path`
    fn occupied_bytes(&self, path: &Path) -> Result<u64>;

    /// Free bytes available to unprivileged users on the volume holding `path`
    fn free_bytes(&self, path: &Path) -> Result<u64>;
}

/// Space probe backed by the local filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemSpaceProbe;

impl SpaceProbe for SystemSpaceProbe {
    fn occupied_bytes(&self, path: &Path) -> Result<u64> {
        directory_size(path)
    }

    fn free_bytes(&self, path: &Path) -> Result<u64> {
        if !path.exists() {
            return Err(Error::NotFound {
                path: path.to_path_buf(),
            });
        }

        #[cfg(unix)]
        {
            crate::unix::available_space(path)
        }

        #[cfg(windows)]
        {
            crate::windows::available_space(path)
        }

        #[cfg(not(any(unix, windows)))]
        {
            Err(Error::device(format!(
                "Free space query is not supported on this platform: {}",
                path.display()
            )))
        }
    }
}

/// Sum the lengths of all files below `path`
///
/// Symbolic links are not followed, so a link pointing back up the tree
/// cannot make the walk loop.
pub fn directory_size(path: &Path) -> Result<u64> {
    if !path.exists() {
        return Err(Error::NotFound {
            path: path.to_path_buf(),
        });
    }

    let mut total = 0u64;
    for entry in WalkDir::new(path).follow_links(false) {
        let entry = entry.map_err(|e| {
            let at = e.path().unwrap_or(path).to_path_buf();
            match e.into_io_error() {
                Some(io) => Error::from_io(io, &at),
                None => Error::device(format!("Filesystem loop at {}", at.display())),
            }
        })?;

        if entry.file_type().is_file() {
            let metadata = entry
                .metadata()
                .map_err(|e| Error::device(format!("{}: {}", entry.path().display(), e)))?;
            total += metadata.len();
        }
    }

    debug!("{} occupies {} bytes", path.display(), total);
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_directory_size_is_recursive() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("album/disc1")).unwrap();
        fs::write(root.join("a.mp3"), vec![0u8; 100]).unwrap();
        fs::write(root.join("album/b.mp3"), vec![0u8; 250]).unwrap();
        fs::write(root.join("album/disc1/c.mp3"), vec![0u8; 50]).unwrap();

        assert_eq!(directory_size(root).unwrap(), 400);
    }

    #[test]
    fn test_directory_size_of_empty_directory() {
        let temp_dir = TempDir::new().unwrap();
        assert_eq!(directory_size(temp_dir.path()).unwrap(), 0);
    }

    #[test]
    fn test_directory_size_missing_root() {
        let temp_dir = TempDir::new().unwrap();
        let error = directory_size(&temp_dir.path().join("missing")).unwrap_err();
        assert!(error.is_not_found());
    }

    #[test]
    fn test_free_bytes_of_existing_volume() {
        let temp_dir = TempDir::new().unwrap();
        let probe = SystemSpaceProbe;
        assert!(probe.free_bytes(temp_dir.path()).is_ok());
    }

    #[test]
    fn test_free_bytes_missing_path() {
        let temp_dir = TempDir::new().unwrap();
        let probe = SystemSpaceProbe;
        let error = probe
            .free_bytes(&temp_dir.path().join("not-mounted"))
            .unwrap_err();
        assert!(error.is_not_found());
    }
}
