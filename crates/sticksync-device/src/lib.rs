//! Destination volume probing and capacity checks for StickSync
//!
//! This crate holds everything StickSync needs to know about the volumes
//! involved in a run, without touching the sync algorithm itself:
//!
//! - **Capacity preflight**: compare the size of the source tree with the free
//!   space of the destination volume before anything is written
//! - **Space probes**: native `statvfs` / `GetDiskFreeSpaceExW` queries and a
//!   native directory walk instead of shelling out to `du`/`df`
//! - **Mount lookup**: find the mount point a destination lives on
//! - **Junk cleanup**: remove OS metadata entries from the destination root
//!
//! # Examples
//!
//! ```rust,no_run
//! use sticksync_device::CapacityGuard;
//!
//! let guard = CapacityGuard::new();
//! let snapshot = guard.check("/home/me/Stick", "/Volumes/STICK")?;
//! println!("{} bytes needed", snapshot.source_bytes);
//! # Ok::<(), sticksync_types::Error>(())
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod capacity;
pub mod junk;
pub mod mount;
pub mod space;

#[cfg(windows)]
pub mod windows;

#[cfg(unix)]
pub mod unix;

// Re-export main types
pub use capacity::CapacityGuard;
pub use junk::JunkCleaner;
pub use mount::{MountEntry, MountTable};
pub use space::{directory_size, SpaceProbe, SystemSpaceProbe};
