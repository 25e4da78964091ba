//! Order-preserving directory synchronization for StickSync
//!
//! Cheap audio players often ignore file names and play tracks in the order
//! the files were written to the medium. This crate keeps such a device in
//! step with a source tree while preserving that order:
//!
//! - **Scanning**: each directory level is listed, filtered and sorted
//!   case-insensitively ([`DirectoryScanner`])
//! - **Fingerprints**: a level's names and sizes are hashed; equal
//!   fingerprints mean the level is left alone ([`Fingerprinter`])
//! - **Staging**: a differing level is rebuilt by parking its entries in a
//!   hidden directory and moving them back in source order ([`StagingArea`])
//! - **Sessions**: capacity preflight and junk cleanup around the engine
//!   ([`SyncSession`])
//!
//! # Examples
//!
//! ```rust,no_run
//! use sticksync_core::SyncEngine;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let engine = SyncEngine::new();
//! let report = engine.sync("/home/me/Music", "/media/me/STICK")?;
//! println!(
//!     "Rebuilt {} levels, copied {} files",
//!     report.stats.levels_rebuilt, report.stats.files_copied
//! );
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]

pub mod engine;
pub mod fingerprint;
pub mod report;
pub mod scanner;
pub mod session;
pub mod staging;

pub use engine::{validate_roots, SyncEngine, SyncOptions, SyncRequest};
pub use fingerprint::{Fingerprint, Fingerprinter};
pub use report::{SyncFailure, SyncReport, TracingReporter};
pub use scanner::{DirectoryScanner, DirectorySnapshot, Entry, IgnoreSet};
pub use session::SyncSession;
pub use staging::StagingArea;
