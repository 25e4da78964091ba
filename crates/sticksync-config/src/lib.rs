//! Configuration management system for StickSync
//!
//! This crate provides the configuration layer for StickSync, supporting
//! multiple configuration formats (YAML, TOML, JSON), validation and
//! environment variable overrides.
//!
//! # Features
//!
//! - **Multiple formats**: YAML, TOML and JSON configuration files
//! - **Validation**: Rejects staging names and log levels the engine cannot work with
//! - **Environment overrides**: `STICKSYNC__SECTION__KEY=value`
//! - **Defaults**: Every option has a default that matches a typical MP3 stick
//!
//! # Examples
//!
//! ```rust,no_run
//! use sticksync_config::ConfigBuilder;
//!
//! let config = ConfigBuilder::new()
//!     .add_defaults()
//!     .add_source_file("sticksync.yaml")
//!     .add_env_prefix("STICKSYNC")
//!     .build()
//!     .expect("Failed to load configuration");
//!
//! println!("Staging directory: {}", config.scan.staging_dir_name);
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use sticksync_types::FingerprintStrategy;

pub mod builder;
pub mod error;
pub mod loader;

pub use builder::ConfigBuilder;
pub use error::{ConfigError, ConfigResult};
pub use loader::ConfigLoader;

/// Reserved name of the per-directory staging area
pub const DEFAULT_STAGING_DIR_NAME: &str = ".tmp";

/// OS metadata entries removed from the destination root before a run
pub const DEFAULT_JUNK_FILES: &[&str] = &[".DS_Store", ".Trashes", ".fseventsd"];

/// Names never taken into account when a directory is scanned
pub const DEFAULT_IGNORED_NAMES: &[&str] = &["MUSICBMK.BMK", ".Spotlight-V100"];

/// Main configuration structure for StickSync
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Directory scanning configuration
    #[serde(default)]
    pub scan: ScanConfig,
    /// Fingerprint configuration
    #[serde(default)]
    pub fingerprint: FingerprintConfig,
    /// Sync behaviour configuration
    #[serde(default)]
    pub sync: SyncConfig,
    /// Capacity preflight configuration
    #[serde(default)]
    pub capacity: CapacityConfig,
    /// Destination device configuration
    #[serde(default)]
    pub device: DeviceConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Directory scanning configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Names excluded from every directory snapshot
    ///
    /// The junk files and the staging directory name are always added on top.
    pub ignore: Vec<String>,
    /// Name of the hidden staging directory created inside rebuilt directories
    pub staging_dir_name: String,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            ignore: DEFAULT_IGNORED_NAMES
                .iter()
                .map(|name| (*name).to_string())
                .collect(),
            staging_dir_name: DEFAULT_STAGING_DIR_NAME.to_string(),
        }
    }
}

impl ScanConfig {
    /// Complete ignore list: configured names, junk files and the staging name
    pub fn ignored_names(&self, junk_files: &[String]) -> Vec<String> {
        let mut names = self.ignore.clone();
        names.extend(junk_files.iter().cloned());
        names.push(self.staging_dir_name.clone());
        names.sort();
        names.dedup();
        names
    }
}

/// Fingerprint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FingerprintConfig {
    /// Strategy used for the whole run
    pub strategy: FingerprintStrategy,
    /// NFC-normalize names before hashing
    pub normalize_unicode: bool,
}

impl Default for FingerprintConfig {
    fn default() -> Self {
        Self {
            strategy: FingerprintStrategy::Size,
            normalize_unicode: true,
        }
    }
}

/// Sync behaviour configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Give copied files the modification time of their source
    pub preserve_timestamps: bool,
    /// Keep going with sibling directories when one directory fails
    pub continue_on_error: bool,
    /// Only compare fingerprints and report what would be rebuilt
    pub dry_run: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            preserve_timestamps: true,
            continue_on_error: true,
            dry_run: false,
        }
    }
}

/// Capacity preflight configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapacityConfig {
    /// Compare source size against free destination space before syncing
    pub enabled: bool,
}

impl Default for CapacityConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Destination device configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Destination used when none is given on the command line
    pub default_destination: PathBuf,
    /// OS junk entries removed from the destination root
    pub junk_files: Vec<String>,
    /// Remove junk entries before syncing
    pub clean_junk: bool,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            default_destination: PathBuf::from("/Volumes/STICK"),
            junk_files: DEFAULT_JUNK_FILES
                .iter()
                .map(|name| (*name).to_string())
                .collect(),
            clean_junk: true,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    pub level: String,
    /// Enable JSON formatting
    pub json_format: bool,
    /// Enable colored output
    pub colored_output: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            colored_output: true,
        }
    }
}
