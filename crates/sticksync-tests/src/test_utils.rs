//! Unified test utilities for StickSync tests and benchmarks
//!
//! Helpers to lay out source and destination trees, compare them after a run
//! and fake volume sizes.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use sticksync_core::IgnoreSet;
use sticksync_device::SpaceProbe;
use sticksync_types::Result;
use tempfile::TempDir;
use unicode_normalization::UnicodeNormalization;

/// Test data generation patterns
#[derive(Debug, Clone, Copy)]
pub enum TestDataPattern {
    /// All zeros
    Zeros,
    /// Deterministic pseudo-audio bytes
    Realistic,
}

/// Generate test data with specified pattern
pub fn generate_test_data(size: usize, pattern: TestDataPattern) -> Vec<u8> {
    match pattern {
        TestDataPattern::Zeros => vec![0u8; size],
        TestDataPattern::Realistic => (0..size).map(|i| ((i * 7 + 13) % 256) as u8).collect(),
    }
}

/// Write `size` bytes to `root/relative`, creating parent directories
pub fn write_file(root: &Path, relative: &str, size: usize) -> PathBuf {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create parent directory");
    }
    fs::write(&path, generate_test_data(size, TestDataPattern::Realistic))
        .expect("Failed to write test file");
    path
}

/// Create `root/relative` as an (empty) directory
pub fn make_dir(root: &Path, relative: &str) -> PathBuf {
    let path = root.join(relative);
    fs::create_dir_all(&path).expect("Failed to create directory");
    path
}

/// A source and a destination root below one temporary directory
pub struct SyncFixture {
    _temp_dir: TempDir,
    /// Source root (`music`)
    pub source: PathBuf,
    /// Destination root (`stick`)
    pub destination: PathBuf,
}

impl SyncFixture {
    /// Create both roots empty
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let source = temp_dir.path().join("music");
        let destination = temp_dir.path().join("stick");
        fs::create_dir(&source).expect("Failed to create source root");
        fs::create_dir(&destination).expect("Failed to create destination root");
        Self {
            _temp_dir: temp_dir,
            source,
            destination,
        }
    }

    /// Write a file below the source root
    pub fn source_file(&self, relative: &str, size: usize) -> PathBuf {
        write_file(&self.source, relative, size)
    }

    /// Write a file below the destination root
    pub fn destination_file(&self, relative: &str, size: usize) -> PathBuf {
        write_file(&self.destination, relative, size)
    }
}

impl Default for SyncFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// What a path in a tree listing is
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeEntry {
    /// Directory
    Directory,
    /// File with its size
    File(u64),
}

/// Every path below `root` (relative, `/`-separated) that is not ignored
pub fn tree_listing(root: &Path, ignore: &IgnoreSet) -> BTreeMap<String, TreeEntry> {
    let mut listing = BTreeMap::new();
    collect(root, root, ignore, &mut listing);
    listing
}

/// Like [`tree_listing`], with every path in NFC
///
/// Composed and decomposed spellings of a name compare equal, the way the
/// fingerprints see them.
pub fn normalized_listing(root: &Path, ignore: &IgnoreSet) -> BTreeMap<String, TreeEntry> {
    tree_listing(root, ignore)
        .into_iter()
        .map(|(path, entry)| (path.nfc().collect(), entry))
        .collect()
}

fn collect(root: &Path, dir: &Path, ignore: &IgnoreSet, out: &mut BTreeMap<String, TreeEntry>) {
    for entry in fs::read_dir(dir).expect("Failed to list directory") {
        let entry = entry.expect("Failed to read directory entry");
        if ignore.contains(&entry.file_name()) {
            continue;
        }
        let path = entry.path();
        let relative = path
            .strip_prefix(root)
            .expect("Entry outside root")
            .to_string_lossy()
            .replace('\\', "/");
        let metadata = fs::metadata(&path).expect("Failed to stat entry");
        if metadata.is_dir() {
            out.insert(relative, TreeEntry::Directory);
            collect(root, &path, ignore, out);
        } else {
            out.insert(relative, TreeEntry::File(metadata.len()));
        }
    }
}

/// Every directory named `staging_name` anywhere below `root`
pub fn staging_dirs(root: &Path, staging_name: &str) -> Vec<PathBuf> {
    let mut found = Vec::new();
    let mut pending = vec![root.to_path_buf()];
    while let Some(dir) = pending.pop() {
        for entry in fs::read_dir(&dir).expect("Failed to list directory") {
            let entry = entry.expect("Failed to read directory entry");
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            if entry.file_name() == staging_name {
                found.push(path.clone());
            }
            pending.push(path);
        }
    }
    found
}

/// Space probe returning fixed figures
#[derive(Debug, Clone, Copy)]
pub struct FixedSpaceProbe {
    /// Reported source size
    pub occupied: u64,
    /// Reported free destination space
    pub free: u64,
}

impl SpaceProbe for FixedSpaceProbe {
    fn occupied_bytes(&self, _path: &Path) -> Result<u64> {
        Ok(self.occupied)
    }

    fn free_bytes(&self, _path: &Path) -> Result<u64> {
        Ok(self.free)
    }
}
