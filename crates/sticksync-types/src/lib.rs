//! Core type system and error handling for StickSync
//!
//! This crate provides the foundational types, error handling, and shared data structures
//! used throughout the StickSync workspace. It includes:
//!
//! - **Error handling**: Error types with kinds, severity levels and I/O classification
//! - **Core types**: Entry kinds, fingerprint strategies, sync events and statistics
//! - **Traits**: The reporter interface the sync engine talks to
//!
//! # Features
//!
//! - `std` (default): Enable standard library features
//! - `serde`: Enable serialization support
//!
//! # Examples
//!
//! ```rust
//! use sticksync_types::{Result, SyncEvent, SyncStats};
//!
//! fn example_operation() -> Result<SyncStats> {
//!     let mut stats = SyncStats::new();
//!     stats.record(&SyncEvent::FileCopied {
//!         path: "/stick/a.mp3".into(),
//!         bytes: 1024,
//!     });
//!     Ok(stats)
//! }
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod result;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use error::{Error, ErrorKind, ErrorSeverity};
pub use result::Result;
pub use traits::*;
pub use types::*;
