//! Directory scanning
//!
//! A scan lists the immediate children of one directory, drops everything in
//! the [`IgnoreSet`], classifies the rest and sorts them case-insensitively.
//! The resulting order is both the fingerprint input and the order in which a
//! rebuilt directory is written to the destination.

use std::borrow::Cow;
use std::collections::HashSet;
use std::ffi::{OsStr, OsString};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use sticksync_config::{Config, DEFAULT_IGNORED_NAMES, DEFAULT_JUNK_FILES, DEFAULT_STAGING_DIR_NAME};
use sticksync_types::{EntryKind, Error, Result};
use tracing::{debug, warn};

/// Names excluded from every snapshot
///
/// The staging directory name is always part of the set, so a scan never sees
/// the scratch area of an interrupted rebuild.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgnoreSet {
    names: HashSet<OsString>,
    staging_dir_name: OsString,
}

impl IgnoreSet {
    /// Create a set from `names` plus the reserved staging name
    pub fn new<I, S>(names: I, staging_dir_name: impl Into<OsString>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        let staging_dir_name = staging_dir_name.into();
        let mut names: HashSet<OsString> = names.into_iter().map(Into::into).collect();
        names.insert(staging_dir_name.clone());
        Self {
            names,
            staging_dir_name,
        }
    }

    /// Build the set described by a configuration
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.scan.ignored_names(&config.device.junk_files),
            config.scan.staging_dir_name.as_str(),
        )
    }

    /// Whether `name` is excluded
    pub fn contains(&self, name: &OsStr) -> bool {
        self.names.contains(name)
    }

    /// Reserved name of the staging directory
    pub fn staging_dir_name(&self) -> &OsStr {
        &self.staging_dir_name
    }
}

impl Default for IgnoreSet {
    fn default() -> Self {
        Self::new(
            DEFAULT_IGNORED_NAMES
                .iter()
                .chain(DEFAULT_JUNK_FILES.iter())
                .copied(),
            DEFAULT_STAGING_DIR_NAME,
        )
    }
}

/// One child of a scanned directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    name: OsString,
    kind: EntryKind,
    size: u64,
}

impl Entry {
    /// Create an entry; `size` is ignored for directories
    pub fn new(name: impl Into<OsString>, kind: EntryKind, size: u64) -> Self {
        let size = if kind.is_dir() { 0 } else { size };
        Self {
            name: name.into(),
            kind,
            size,
        }
    }

    /// Name within the parent directory
    pub fn name(&self) -> &OsStr {
        &self.name
    }

    /// Name for display and logging
    pub fn display_name(&self) -> Cow<'_, str> {
        self.name.to_string_lossy()
    }

    /// File or directory
    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    /// Whether the entry is a directory
    pub fn is_dir(&self) -> bool {
        self.kind.is_dir()
    }

    /// Size in bytes at scan time (0 for directories)
    pub fn size(&self) -> u64 {
        self.size
    }
}

/// Ordered, filtered listing of one directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectorySnapshot {
    root: PathBuf,
    entries: Vec<Entry>,
}

impl DirectorySnapshot {
    /// Build a snapshot from entries, applying the canonical ordering
    pub fn from_entries(root: impl Into<PathBuf>, mut entries: Vec<Entry>) -> Self {
        // sort_by_cached_key is stable: case-only ties keep listing order
        entries.sort_by_cached_key(|entry| sort_key(entry.name()));
        Self {
            root: root.into(),
            entries,
        }
    }

    /// Snapshot of a directory that does not exist yet
    pub fn empty(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            entries: Vec::new(),
        }
    }

    /// Scanned directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// All entries in canonical order
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Files in canonical order
    pub fn files(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter().filter(|entry| !entry.is_dir())
    }

    /// Subdirectories in canonical order
    pub fn directories(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter().filter(|entry| entry.is_dir())
    }

    /// Look up an entry by exact name
    pub fn get(&self, name: &OsStr) -> Option<&Entry> {
        self.entries.iter().find(|entry| entry.name() == name)
    }

    /// Full path of a child
    pub fn path_of(&self, entry: &Entry) -> PathBuf {
        self.root.join(entry.name())
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the directory has no (non-ignored) entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Case-insensitive key of the canonical entry order
pub(crate) fn sort_key(name: &OsStr) -> String {
    name.to_string_lossy().to_lowercase()
}

/// Lists directories into [`DirectorySnapshot`]s
#[derive(Debug, Clone, Default)]
pub struct DirectoryScanner {
    ignore: IgnoreSet,
}

impl DirectoryScanner {
    /// Create a scanner with the given ignore set
    pub fn new(ignore: IgnoreSet) -> Self {
        Self { ignore }
    }

    /// The scanner's ignore set
    pub fn ignore_set(&self) -> &IgnoreSet {
        &self.ignore
    }

    /// Scan one directory
    ///
    /// Children are classified with a stat that follows symbolic links. A
    /// child that disappears between listing and stat (including a dangling
    /// link) is left out with a warning.
    pub fn scan(&self, path: impl AsRef<Path>) -> Result<DirectorySnapshot> {
        let path = path.as_ref();
        let read_dir = fs::read_dir(path).map_err(|e| Error::from_io(e, path))?;

        let mut entries = Vec::new();
        for dir_entry in read_dir {
            let dir_entry = dir_entry.map_err(|e| Error::from_io(e, path))?;
            let name = dir_entry.file_name();
            if self.ignore.contains(&name) {
                continue;
            }

            let child = dir_entry.path();
            match fs::metadata(&child) {
                Ok(metadata) if metadata.is_dir() => {
                    entries.push(Entry::new(name, EntryKind::Directory, 0));
                }
                Ok(metadata) => {
                    entries.push(Entry::new(name, EntryKind::File, metadata.len()));
                }
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    warn!("Skipping {}: target does not exist", child.display());
                }
                Err(e) => return Err(Error::from_io(e, &child)),
            }
        }

        let snapshot = DirectorySnapshot::from_entries(path, entries);
        debug!("Scanned {}: {} entries", path.display(), snapshot.len());
        Ok(snapshot)
    }
}
