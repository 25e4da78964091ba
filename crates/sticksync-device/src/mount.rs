//! Mount point lookup
//!
//! Used to tell the user which volume a destination lives on, e.g. to notice
//! that `/media/STICK` is a plain directory on the root filesystem because the
//! stick is not plugged in.

use std::path::{Path, PathBuf};
use sticksync_types::Result;
use tracing::debug;

/// One line of the mount table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountEntry {
    /// Device name
    pub device: String,
    /// Mount point
    pub mount_point: PathBuf,
    /// Filesystem type
    pub fs_type: String,
}

impl MountEntry {
    /// Whether the filesystem is one typically found on removable players
    pub fn is_removable_filesystem(&self) -> bool {
        matches!(
            self.fs_type.as_str(),
            "vfat" | "msdos" | "exfat" | "fat" | "fat32" | "fuseblk"
        )
    }
}

/// Parsed mount table
#[derive(Debug, Clone, Default)]
pub struct MountTable {
    entries: Vec<MountEntry>,
}

impl MountTable {
    /// Load the table of the running system
    ///
    /// Only Linux exposes `/proc/mounts`; elsewhere the table is empty.
    pub fn load() -> Result<Self> {
        #[cfg(target_os = "linux")]
        {
            let content = std::fs::read_to_string("/proc/mounts")
                .map_err(|e| sticksync_types::Error::from_io(e, "/proc/mounts"))?;
            Ok(Self::parse(&content))
        }

        #[cfg(not(target_os = "linux"))]
        {
            Ok(Self::default())
        }
    }

    /// Parse `/proc/mounts`-formatted content
    pub fn parse(content: &str) -> Self {
        let entries = content
            .lines()
            .filter_map(|line| {
                let parts: Vec<&str> = line.split_whitespace().collect();
                if parts.len() < 3 {
                    return None;
                }
                Some(MountEntry {
                    device: unescape(parts[0]),
                    mount_point: PathBuf::from(unescape(parts[1])),
                    fs_type: parts[2].to_string(),
                })
            })
            .collect();

        Self { entries }
    }

    /// All parsed entries
    pub fn entries(&self) -> &[MountEntry] {
        &self.entries
    }

    /// The mount whose mount point is the longest prefix of `path`
    pub fn mount_point_for(&self, path: &Path) -> Option<&MountEntry> {
        let found = self
            .entries
            .iter()
            .filter(|entry| path.starts_with(&entry.mount_point))
            .max_by_key(|entry| entry.mount_point.components().count());

        if let Some(entry) = found {
            debug!(
                "{} is on {} ({})",
                path.display(),
                entry.mount_point.display(),
                entry.fs_type
            );
        }
        found
    }
}

/// Decode the octal escapes (`\040` for a space) used by the kernel
fn unescape(field: &str) -> String {
    let bytes = field.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\' && i + 4 <= bytes.len() {
            let digits = std::str::from_utf8(&bytes[i + 1..i + 4]).unwrap_or("");
            if let Ok(value) = u8::from_str_radix(digits, 8) {
                out.push(value);
                i += 4;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}
