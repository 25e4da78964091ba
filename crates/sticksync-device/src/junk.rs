//! Removal of OS metadata entries from the destination root
//!
//! Desktop systems litter removable media with index and trash folders that a
//! player would otherwise try to play or count. Failures here never abort a run.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Deletes a fixed list of junk entries directly below a directory
#[derive(Debug, Clone)]
pub struct JunkCleaner {
    names: Vec<String>,
}

impl JunkCleaner {
    /// Create a cleaner for the given entry names
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Remove every listed entry present in `root`, returning what was removed
    pub fn clean(&self, root: &Path) -> Vec<PathBuf> {
        let mut removed = Vec::new();

        for name in &self.names {
            let path = root.join(name);
            let metadata = match fs::symlink_metadata(&path) {
                Ok(metadata) => metadata,
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => {
                    warn!("Cannot inspect {}: {}", path.display(), e);
                    continue;
                }
            };

            let result = if metadata.is_dir() {
                fs::remove_dir_all(&path)
            } else {
                fs::remove_file(&path)
            };

            match result {
                Ok(()) => {
                    info!("Removed junk entry {}", path.display());
                    removed.push(path);
                }
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    debug!("{} vanished before removal", path.display());
                }
                Err(e) => warn!("Failed to remove {}: {}", path.display(), e),
            }
        }

        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_clean_removes_files_and_directories() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::write(root.join(".DS_Store"), b"junk").unwrap();
        fs::create_dir_all(root.join(".Trashes/501")).unwrap();
        fs::write(root.join("keep.mp3"), b"music").unwrap();

        let cleaner = JunkCleaner::new([".DS_Store", ".Trashes", ".fseventsd"]);
        let removed = cleaner.clean(root);

        assert_eq!(removed.len(), 2);
        assert!(!root.join(".DS_Store").exists());
        assert!(!root.join(".Trashes").exists());
        assert!(root.join("keep.mp3").exists());
    }

    #[test]
    fn test_clean_only_touches_root_level() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir(root.join("album")).unwrap();
        fs::write(root.join("album/.DS_Store"), b"junk").unwrap();

        let removed = JunkCleaner::new([".DS_Store"]).clean(root);

        assert!(removed.is_empty());
        assert!(root.join("album/.DS_Store").exists());
    }

    #[test]
    fn test_clean_missing_root_is_harmless() {
        let temp_dir = TempDir::new().unwrap();
        let removed = JunkCleaner::new([".DS_Store"]).clean(&temp_dir.path().join("gone"));
        assert!(removed.is_empty());
    }
}
