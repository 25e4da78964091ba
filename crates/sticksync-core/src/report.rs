//! Run reports and the default event reporter

use serde::Serialize;
use std::path::{Path, PathBuf};
use sticksync_types::{CapacitySnapshot, Error, RunId, SyncEvent, SyncReporter, SyncStats};
use tracing::{debug, info, warn};

/// A directory whose sync failed while the run carried on
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncFailure {
    /// Destination directory of the failed level
    pub path: PathBuf,
    /// Rendered error
    pub message: String,
}

impl SyncFailure {
    /// Record `error` against `path`
    pub fn new(path: impl Into<PathBuf>, error: &Error) -> Self {
        Self {
            path: path.into(),
            message: error.to_string(),
        }
    }
}

/// Outcome of one sync run
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    /// Run identifier, also attached to the run's log span
    pub run_id: RunId,
    /// Source root
    pub source: PathBuf,
    /// Destination root
    pub destination: PathBuf,
    /// Whether the run only compared fingerprints
    pub dry_run: bool,
    /// Counters
    pub stats: SyncStats,
    /// Levels that failed without aborting the run
    pub failures: Vec<SyncFailure>,
    /// Capacity figures, when the preflight ran
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<CapacitySnapshot>,
    /// Junk entries removed from the destination root
    pub junk_removed: Vec<PathBuf>,
}

impl SyncReport {
    /// Create an empty report
    pub fn new(run_id: RunId, source: &Path, destination: &Path, dry_run: bool) -> Self {
        Self {
            run_id,
            source: source.to_path_buf(),
            destination: destination.to_path_buf(),
            dry_run,
            stats: SyncStats::new(),
            failures: Vec::new(),
            capacity: None,
            junk_removed: Vec::new(),
        }
    }

    /// Whether every level synced
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Whether the destination already matched the source
    pub fn is_up_to_date(&self) -> bool {
        self.stats.levels_rebuilt == 0 && self.is_success()
    }
}

/// Reporter that writes every event to the `tracing` log
///
/// Filesystem changes are logged at `info` as `kind<TAB>path`, level
/// decisions at `debug`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl SyncReporter for TracingReporter {
    fn report_event(&self, event: &SyncEvent) {
        if event.is_mutation() {
            info!("{}\t{}", event.kind(), event.path().display());
        } else {
            debug!("{}\t{}", event.kind(), event.path().display());
        }
    }

    fn report_error(&self, path: &Path, error: &Error) {
        warn!("Sync of {} failed: {}", path.display(), error);
    }

    fn report_completion(&self, stats: &SyncStats) {
        info!(
            "Sync completed: {} levels rebuilt, {} skipped, {} files copied ({} bytes) in {:?}",
            stats.levels_rebuilt,
            stats.levels_skipped,
            stats.files_copied,
            stats.bytes_copied,
            stats.duration
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_serializes_to_json() {
        let mut report = SyncReport::new(
            RunId::nil(),
            Path::new("/music"),
            Path::new("/stick"),
            false,
        );
        report.stats.files_copied = 2;
        report
            .failures
            .push(SyncFailure::new("/stick/broken", &Error::sync("disk removed")));

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["source"], "/music");
        assert_eq!(json["stats"]["files_copied"], 2);
        assert_eq!(json["failures"][0]["path"], "/stick/broken");
        assert!(json.get("capacity").is_none());
        assert!(!report.is_success());
    }

    #[test]
    fn test_up_to_date() {
        let mut report = SyncReport::new(RunId::nil(), Path::new("/a"), Path::new("/b"), true);
        report.stats.levels_skipped = 3;
        assert!(report.is_up_to_date());

        report.stats.levels_rebuilt = 1;
        assert!(!report.is_up_to_date());
    }
}
