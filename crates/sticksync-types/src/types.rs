//! Core data types for StickSync
//!
//! This module provides the fundamental data types used throughout StickSync:
//! directory entry kinds, sync statistics, per-operation events and capacity figures.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Unique identifier for a sync run
pub type RunId = uuid::Uuid;

/// Number of bytes in one gibibyte
pub const GIB: u64 = 1024 * 1024 * 1024;

/// Kind of a directory child
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum EntryKind {
    /// Regular file (or anything that does not stat as a directory)
    File,
    /// Directory
    Directory,
}

impl EntryKind {
    /// Whether this is a directory
    pub fn is_dir(self) -> bool {
        matches!(self, Self::Directory)
    }
}

/// How a directory fingerprint is derived
///
/// A run must use one strategy for the whole tree; fingerprints produced by
/// different strategies never compare equal in a meaningful way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum FingerprintStrategy {
    /// File names, file sizes and subdirectory names
    #[default]
    Size,
    /// File names, a content digest per file and subdirectory names
    Content,
}

/// Sizes gathered by the capacity preflight
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CapacitySnapshot {
    /// Total bytes occupied by the source tree
    pub source_bytes: u64,
    /// Free bytes on the volume holding the destination
    pub destination_free_bytes: u64,
}

impl CapacitySnapshot {
    /// Whether the source fits onto the destination volume
    pub fn fits(&self) -> bool {
        self.source_bytes <= self.destination_free_bytes
    }
}

/// A discrete step performed (or decided) by the sync engine
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "event", rename_all = "snake_case"))]
pub enum SyncEvent {
    /// Fingerprints matched; the level is left untouched
    LevelSkipped {
        /// Destination directory
        path: PathBuf,
    },
    /// Fingerprints differ; the level is (or would be) rebuilt
    LevelRebuild {
        /// Destination directory
        path: PathBuf,
    },
    /// A destination directory was created
    DirectoryCreated {
        /// Created directory
        path: PathBuf,
    },
    /// A source file was copied to the destination
    FileCopied {
        /// Destination file
        path: PathBuf,
        /// Bytes written
        bytes: u64,
    },
    /// A stale restored file was deleted
    FileDeleted {
        /// Deleted file
        path: PathBuf,
    },
    /// A destination entry was moved into the staging area
    BackedUp {
        /// Original destination path of the entry
        path: PathBuf,
    },
    /// A staged entry was moved back into place
    Restored {
        /// Destination path the entry was restored to
        path: PathBuf,
    },
    /// A staging area and its leftovers were removed
    StagingCleared {
        /// Staging directory
        path: PathBuf,
    },
}

impl SyncEvent {
    /// Short name of the event kind
    pub fn kind(&self) -> &'static str {
        match self {
            Self::LevelSkipped { .. } => "skip",
            Self::LevelRebuild { .. } => "rebuild",
            Self::DirectoryCreated { .. } => "mkdir",
            Self::FileCopied { .. } => "copy",
            Self::FileDeleted { .. } => "delete",
            Self::BackedUp { .. } => "backup",
            Self::Restored { .. } => "restore",
            Self::StagingCleared { .. } => "clear",
        }
    }

    /// Path the event refers to
    pub fn path(&self) -> &Path {
        match self {
            Self::LevelSkipped { path }
            | Self::LevelRebuild { path }
            | Self::DirectoryCreated { path }
            | Self::FileCopied { path, .. }
            | Self::FileDeleted { path }
            | Self::BackedUp { path }
            | Self::Restored { path }
            | Self::StagingCleared { path } => path,
        }
    }

    /// Whether the event changed the destination filesystem
    pub fn is_mutation(&self) -> bool {
        !matches!(self, Self::LevelSkipped { .. } | Self::LevelRebuild { .. })
    }
}

/// Sync statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SyncStats {
    /// Directory levels whose fingerprints matched
    pub levels_skipped: u64,
    /// Directory levels that were rebuilt
    pub levels_rebuilt: u64,
    /// Number of directories created
    pub directories_created: u64,
    /// Number of files copied from the source
    pub files_copied: u64,
    /// Total bytes copied
    pub bytes_copied: u64,
    /// Number of entries moved back out of staging
    pub entries_restored: u64,
    /// Number of restored files deleted because their size changed
    pub files_deleted: u64,
    /// Number of entries moved into staging
    pub entries_backed_up: u64,
    /// Number of directories whose sync failed
    pub errors: u64,
    /// Total duration of the operation
    pub duration: Duration,
}

impl SyncStats {
    /// Create a new empty statistics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Account for one engine event
    pub fn record(&mut self, event: &SyncEvent) {
        match event {
            SyncEvent::LevelSkipped { .. } => self.levels_skipped += 1,
            SyncEvent::LevelRebuild { .. } => self.levels_rebuilt += 1,
            SyncEvent::DirectoryCreated { .. } => self.directories_created += 1,
            SyncEvent::FileCopied { bytes, .. } => {
                self.files_copied += 1;
                self.bytes_copied += bytes;
            }
            SyncEvent::FileDeleted { .. } => self.files_deleted += 1,
            SyncEvent::BackedUp { .. } => self.entries_backed_up += 1,
            SyncEvent::Restored { .. } => self.entries_restored += 1,
            SyncEvent::StagingCleared { .. } => {}
        }
    }

    /// Number of mutating filesystem operations that were counted
    pub fn mutations(&self) -> u64 {
        self.directories_created
            + self.files_copied
            + self.files_deleted
            + self.entries_backed_up
            + self.entries_restored
    }

    /// Calculate the copy throughput in bytes per second
    pub fn transfer_rate(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.bytes_copied as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Merge statistics from another instance
    pub fn merge(&mut self, other: &SyncStats) {
        self.levels_skipped += other.levels_skipped;
        self.levels_rebuilt += other.levels_rebuilt;
        self.directories_created += other.directories_created;
        self.files_copied += other.files_copied;
        self.bytes_copied += other.bytes_copied;
        self.entries_restored += other.entries_restored;
        self.files_deleted += other.files_deleted;
        self.entries_backed_up += other.entries_backed_up;
        self.errors += other.errors;
        self.duration += other.duration;
    }
}

/// Render a byte count in gibibytes rounded to two decimals
pub fn format_gib(bytes: u64) -> String {
    format!("{:.2} GB", bytes as f64 / GIB as f64)
}
