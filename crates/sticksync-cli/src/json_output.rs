//! JSON output structures for the StickSync CLI

use serde::Serialize;
use std::path::Path;
use sticksync_core::SyncReport;
use sticksync_types::{format_gib, CapacitySnapshot, SyncStats};

/// Complete JSON output for sync runs
#[derive(Debug, Serialize)]
pub struct SyncResultJson<'a> {
    /// Operation metadata
    pub metadata: OperationMetadata,
    /// Run identifier
    pub run_id: String,
    /// Whether the run was a dry run
    pub dry_run: bool,
    /// Capacity figures, when the preflight ran
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<CapacityJson>,
    /// Sync statistics
    pub stats: SyncStatsJson,
    /// Junk entries removed from the destination root
    pub junk_removed: Vec<String>,
    /// Directories that failed
    pub failures: &'a [sticksync_core::SyncFailure],
    /// Overall result
    pub result: OperationResult,
}

/// JSON output of the `space` command
#[derive(Debug, Serialize)]
pub struct SpaceResultJson {
    /// Operation metadata
    pub metadata: OperationMetadata,
    /// Capacity figures
    pub capacity: CapacityJson,
    /// Overall result
    pub result: OperationResult,
}

/// Operation metadata
#[derive(Debug, Serialize)]
pub struct OperationMetadata {
    /// StickSync version
    pub version: String,
    /// Operation type
    pub operation: String,
    /// Source path
    pub source_path: String,
    /// Destination path
    pub destination_path: String,
}

impl OperationMetadata {
    fn new(operation: &str, source: &Path, destination: &Path) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            operation: operation.to_string(),
            source_path: source.display().to_string(),
            destination_path: destination.display().to_string(),
        }
    }
}

/// Capacity figures in JSON format
#[derive(Debug, Serialize)]
pub struct CapacityJson {
    /// Bytes occupied by the source tree
    pub source_bytes: u64,
    /// Free bytes on the destination volume
    pub destination_free_bytes: u64,
    /// Source size in GB, two decimals
    pub source_gb: String,
    /// Free destination space in GB, two decimals
    pub destination_free_gb: String,
    /// Whether the source fits
    pub fits: bool,
}

impl From<&CapacitySnapshot> for CapacityJson {
    fn from(snapshot: &CapacitySnapshot) -> Self {
        Self {
            source_bytes: snapshot.source_bytes,
            destination_free_bytes: snapshot.destination_free_bytes,
            source_gb: format_gib(snapshot.source_bytes),
            destination_free_gb: format_gib(snapshot.destination_free_bytes),
            fits: snapshot.fits(),
        }
    }
}

/// Sync statistics in JSON format
#[derive(Debug, Serialize)]
pub struct SyncStatsJson {
    /// Levels left untouched
    pub levels_skipped: u64,
    /// Levels rebuilt (or to rebuild, in a dry run)
    pub levels_rebuilt: u64,
    /// Number of directories created
    pub directories_created: u64,
    /// Number of files copied
    pub files_copied: u64,
    /// Total bytes copied
    pub bytes_copied: u64,
    /// Entries moved back out of staging
    pub entries_restored: u64,
    /// Restored files deleted because they changed
    pub files_deleted: u64,
    /// Entries moved into staging
    pub entries_backed_up: u64,
    /// Number of failed directories
    pub errors: u64,
    /// Duration in seconds
    pub duration_seconds: f64,
}

impl From<&SyncStats> for SyncStatsJson {
    fn from(stats: &SyncStats) -> Self {
        Self {
            levels_skipped: stats.levels_skipped,
            levels_rebuilt: stats.levels_rebuilt,
            directories_created: stats.directories_created,
            files_copied: stats.files_copied,
            bytes_copied: stats.bytes_copied,
            entries_restored: stats.entries_restored,
            files_deleted: stats.files_deleted,
            entries_backed_up: stats.entries_backed_up,
            errors: stats.errors,
            duration_seconds: stats.duration.as_secs_f64(),
        }
    }
}

/// Overall operation result
#[derive(Debug, Serialize)]
pub struct OperationResult {
    /// Whether the operation was successful
    pub success: bool,
    /// Result message
    pub message: String,
}

impl<'a> SyncResultJson<'a> {
    /// Build the JSON view of a report
    pub fn new(report: &'a SyncReport) -> Self {
        let success = report.is_success();
        let message = if !success {
            format!("Sync completed with {} failed directories", report.failures.len())
        } else if report.stats.levels_rebuilt == 0 {
            "Destination is already up to date".to_string()
        } else if report.dry_run {
            format!("{} directories would be rebuilt", report.stats.levels_rebuilt)
        } else {
            "Sync completed successfully".to_string()
        };

        Self {
            metadata: OperationMetadata::new(
                if report.dry_run { "dry-run" } else { "sync" },
                &report.source,
                &report.destination,
            ),
            run_id: report.run_id.to_string(),
            dry_run: report.dry_run,
            capacity: report.capacity.as_ref().map(CapacityJson::from),
            stats: SyncStatsJson::from(&report.stats),
            junk_removed: report
                .junk_removed
                .iter()
                .map(|path| path.display().to_string())
                .collect(),
            failures: &report.failures,
            result: OperationResult { success, message },
        }
    }
}

impl SpaceResultJson {
    /// Build the JSON view of a capacity measurement
    pub fn new(source: &Path, destination: &Path, snapshot: &CapacitySnapshot) -> Self {
        let fits = snapshot.fits();
        let message = if fits {
            "Source fits onto the destination".to_string()
        } else {
            format!(
                "Source size ({}) exceeds destination space ({})",
                format_gib(snapshot.source_bytes),
                format_gib(snapshot.destination_free_bytes)
            )
        };

        Self {
            metadata: OperationMetadata::new("space", source, destination),
            capacity: CapacityJson::from(snapshot),
            result: OperationResult {
                success: fits,
                message,
            },
        }
    }
}

/// Print a value as pretty JSON on stdout
pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
