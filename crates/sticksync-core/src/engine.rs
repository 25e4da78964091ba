//! Main synchronization engine
//!
//! The engine walks the source tree one directory level at a time. A level
//! whose fingerprint matches its destination counterpart is not touched. A
//! level that differs is rebuilt in source order: every destination entry is
//! parked in the staging area, then each source entry is either moved back
//! from staging or copied fresh, so the destination's write order always
//! follows the source listing.

use crate::fingerprint::Fingerprinter;
use crate::report::{SyncFailure, SyncReport, TracingReporter};
use crate::scanner::{DirectoryScanner, DirectorySnapshot, IgnoreSet};
use crate::staging::{remove_path, StagingArea};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::HashMap;
use std::ffi::OsStr;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use sticksync_config::{Config, SyncConfig};
use sticksync_types::{Error, Result, RunId, SyncEvent, SyncReporter};
use tracing::{debug, debug_span, info, info_span};

/// Synchronization request
#[derive(Debug, Clone)]
pub struct SyncRequest {
    /// Source directory path
    pub source: PathBuf,
    /// Destination directory path
    pub destination: PathBuf,
    /// Run ID for tracking
    pub run_id: RunId,
}

impl SyncRequest {
    /// Create a new sync request with a fresh run ID
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(source: P, destination: Q) -> Self {
        Self {
            source: source.as_ref().to_path_buf(),
            destination: destination.as_ref().to_path_buf(),
            run_id: RunId::new_v4(),
        }
    }

    /// Use a specific run ID
    pub fn with_run_id(mut self, run_id: RunId) -> Self {
        self.run_id = run_id;
        self
    }
}

/// Synchronization options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncOptions {
    /// Copy source modification times onto copied files
    pub preserve_timestamps: bool,
    /// Record a failing subdirectory and carry on with its siblings
    pub continue_on_error: bool,
    /// Compare fingerprints only; never modify the destination
    pub dry_run: bool,
}

impl SyncOptions {
    /// Options for a read-only comparison
    pub fn dry_run() -> Self {
        Self {
            dry_run: true,
            ..Self::default()
        }
    }
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            preserve_timestamps: true,
            continue_on_error: true,
            dry_run: false,
        }
    }
}

impl From<&SyncConfig> for SyncOptions {
    fn from(config: &SyncConfig) -> Self {
        Self {
            preserve_timestamps: config.preserve_timestamps,
            continue_on_error: config.continue_on_error,
            dry_run: config.dry_run,
        }
    }
}

/// Main synchronization engine
pub struct SyncEngine {
    scanner: DirectoryScanner,
    fingerprinter: Fingerprinter,
    options: SyncOptions,
    reporter: Arc<dyn SyncReporter + Send + Sync>,
}

impl fmt::Debug for SyncEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncEngine")
            .field("scanner", &self.scanner)
            .field("fingerprinter", &self.fingerprinter)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl Default for SyncEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncEngine {
    /// Create a sync engine with default options
    pub fn new() -> Self {
        Self::with_options(SyncOptions::default())
    }

    /// Create a sync engine with custom options
    pub fn with_options(options: SyncOptions) -> Self {
        Self {
            scanner: DirectoryScanner::default(),
            fingerprinter: Fingerprinter::default(),
            options,
            reporter: Arc::new(TracingReporter),
        }
    }

    /// Create a sync engine from a loaded configuration
    pub fn from_config(config: &Config) -> Self {
        Self {
            scanner: DirectoryScanner::new(IgnoreSet::from_config(config)),
            fingerprinter: Fingerprinter::new(config.fingerprint.strategy)
                .with_normalization(config.fingerprint.normalize_unicode),
            options: SyncOptions::from(&config.sync),
            reporter: Arc::new(TracingReporter),
        }
    }

    /// Replace the directory scanner
    pub fn with_scanner(mut self, scanner: DirectoryScanner) -> Self {
        self.scanner = scanner;
        self
    }

    /// Replace the fingerprinter
    pub fn with_fingerprinter(mut self, fingerprinter: Fingerprinter) -> Self {
        self.fingerprinter = fingerprinter;
        self
    }

    /// Send events to `reporter` instead of the log
    pub fn with_reporter(mut self, reporter: Arc<dyn SyncReporter + Send + Sync>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Active options
    pub fn options(&self) -> &SyncOptions {
        &self.options
    }

    /// Synchronize `destination` with `source`
    pub fn sync<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        source: P,
        destination: Q,
    ) -> Result<SyncReport> {
        self.execute(SyncRequest::new(source, destination))
    }

    /// Perform synchronization
    ///
    /// Errors at the root level abort the run. Below the root, a failing
    /// directory either aborts as well or is recorded in the report,
    /// depending on [`SyncOptions::continue_on_error`].
    pub fn execute(&self, request: SyncRequest) -> Result<SyncReport> {
        let start_time = Instant::now();
        let span = info_span!("sync", run_id = %request.run_id);
        let _enter = span.enter();

        info!(
            "Starting sync: {} -> {}{}",
            request.source.display(),
            request.destination.display(),
            if self.options.dry_run { " (dry run)" } else { "" }
        );

        validate_roots(&request.source, &request.destination)?;

        let mut report = SyncReport::new(
            request.run_id,
            &request.source,
            &request.destination,
            self.options.dry_run,
        );
        self.sync_level(&request.source, &request.destination, &mut report)?;

        report.stats.duration = start_time.elapsed();
        self.reporter.report_completion(&report.stats);
        Ok(report)
    }

    fn sync_level(&self, source: &Path, destination: &Path, report: &mut SyncReport) -> Result<()> {
        let span = debug_span!("level", path = %destination.display());
        let _enter = span.enter();

        let source_snapshot = self.scanner.scan(source)?;
        let destination_snapshot = if self.options.dry_run && !destination.is_dir() {
            DirectorySnapshot::empty(destination)
        } else {
            self.scanner.scan(destination)?
        };

        let source_fingerprint = self.fingerprinter.fingerprint(&source_snapshot)?;
        let destination_fingerprint = self.fingerprinter.fingerprint(&destination_snapshot)?;
        let staging = StagingArea::new(destination, self.scanner.ignore_set().staging_dir_name());

        let skipped = source_fingerprint == destination_fingerprint;
        if skipped {
            debug!("Fingerprints match: {}", source_fingerprint);
            self.emit(
                report,
                SyncEvent::LevelSkipped {
                    path: destination.to_path_buf(),
                },
            );
        } else {
            debug!(
                "Fingerprints differ: source {} destination {}",
                source_fingerprint, destination_fingerprint
            );
            self.emit(
                report,
                SyncEvent::LevelRebuild {
                    path: destination.to_path_buf(),
                },
            );
            if !self.options.dry_run {
                self.rebuild(&source_snapshot, &destination_snapshot, &staging, report)?;
            }
        }

        // Equal fingerprints list the same subdirectories in the same order,
        // but the destination may spell a name differently (NFC vs NFD).
        let child_destinations: Vec<PathBuf> = if skipped {
            destination_snapshot
                .directories()
                .map(|directory| destination_snapshot.path_of(directory))
                .collect()
        } else {
            source_snapshot
                .directories()
                .map(|directory| destination.join(directory.name()))
                .collect()
        };

        for (directory, child_destination) in source_snapshot.directories().zip(child_destinations)
        {
            let child_source = source_snapshot.path_of(directory);

            if let Err(error) = self.sync_level(&child_source, &child_destination, report) {
                if !self.options.continue_on_error {
                    return Err(error);
                }
                self.reporter.report_error(&child_destination, &error);
                report.stats.errors += 1;
                report
                    .failures
                    .push(SyncFailure::new(child_destination, &error));
            }
        }

        if !self.options.dry_run && staging.clear()? {
            self.emit(
                report,
                SyncEvent::StagingCleared {
                    path: staging.path().to_path_buf(),
                },
            );
        }

        Ok(())
    }

    /// Rewrite one destination level in source order
    fn rebuild(
        &self,
        source: &DirectorySnapshot,
        destination: &DirectorySnapshot,
        staging: &StagingArea,
        report: &mut SyncReport,
    ) -> Result<()> {
        let level = destination.root();

        for entry in destination.entries() {
            if staging.backup(entry.name())? {
                self.emit(
                    report,
                    SyncEvent::BackedUp {
                        path: destination.path_of(entry),
                    },
                );
            }
        }

        let mut spellings: HashMap<Cow<'_, [u8]>, &OsStr> = HashMap::new();
        for entry in destination.entries() {
            spellings
                .entry(self.fingerprinter.name_bytes(entry.name()))
                .or_insert(entry.name());
        }

        for entry in source.entries() {
            let target = level.join(entry.name());
            // Prefer the exact name; fall back to another spelling of it
            let staged_name = if destination.get(entry.name()).is_some() {
                entry.name()
            } else {
                spellings
                    .get(self.fingerprinter.name_bytes(entry.name()).as_ref())
                    .copied()
                    .unwrap_or(entry.name())
            };

            if entry.is_dir() {
                if self.ensure_directory(&target)? {
                    self.emit(
                        report,
                        SyncEvent::DirectoryCreated {
                            path: target.clone(),
                        },
                    );
                }
                for path in staging.restore_children(staged_name, &target)? {
                    self.emit(report, SyncEvent::Restored { path });
                }
                continue;
            }

            let source_path = source.path_of(entry);
            if staging.restore_as(staged_name, &target)? {
                self.emit(
                    report,
                    SyncEvent::Restored {
                        path: target.clone(),
                    },
                );
                if !self
                    .fingerprinter
                    .same_file(&source_path, entry.size(), &target)?
                    && remove_path(&target)?
                {
                    self.emit(
                        report,
                        SyncEvent::FileDeleted {
                            path: target.clone(),
                        },
                    );
                }
            }

            if fs::symlink_metadata(&target).is_err() {
                let bytes = self.copy_file(&source_path, &target)?;
                self.emit(report, SyncEvent::FileCopied { path: target, bytes });
            }
        }

        Ok(())
    }

    /// Make sure `path` is a directory; returns `true` if it was created
    fn ensure_directory(&self, path: &Path) -> Result<bool> {
        if path.is_dir() {
            return Ok(false);
        }
        remove_path(path)?;
        fs::create_dir(path).map_err(|e| Error::Io {
            message: format!("Failed to create directory '{}': {}", path.display(), e),
        })?;
        Ok(true)
    }

    /// Copy a single file
    fn copy_file(&self, source: &Path, destination: &Path) -> Result<u64> {
        let bytes = fs::copy(source, destination).map_err(|e| Error::Io {
            message: format!(
                "Failed to copy '{}' to '{}': {}",
                source.display(),
                destination.display(),
                e
            ),
        })?;

        if self.options.preserve_timestamps {
            let metadata = fs::metadata(source).map_err(|e| Error::Io {
                message: format!("Failed to get metadata for '{}': {}", source.display(), e),
            })?;

            filetime::set_file_mtime(
                destination,
                filetime::FileTime::from_last_modification_time(&metadata),
            )
            .map_err(|e| Error::Io {
                message: format!(
                    "Failed to set modification time for '{}': {}",
                    destination.display(),
                    e
                ),
            })?;
        }

        debug!("Copied: {} -> {}", source.display(), destination.display());
        Ok(bytes)
    }

    fn emit(&self, report: &mut SyncReport, event: SyncEvent) {
        report.stats.record(&event);
        self.reporter.report_event(&event);
    }
}

/// Check that both roots are existing directories
pub fn validate_roots(source: &Path, destination: &Path) -> Result<()> {
    for path in [source, destination] {
        let metadata = fs::metadata(path).map_err(|e| Error::from_io(e, path))?;
        if !metadata.is_dir() {
            return Err(Error::sync(format!(
                "Not a directory: {}",
                path.display()
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsStr;
    use sticksync_types::{EventLog, FingerprintStrategy};
    use tempfile::TempDir;

    struct Fixture {
        _temp_dir: TempDir,
        source: PathBuf,
        destination: PathBuf,
    }

    impl Fixture {
        fn new() -> Self {
            let temp_dir = TempDir::new().unwrap();
            let source = temp_dir.path().join("music");
            let destination = temp_dir.path().join("stick");
            fs::create_dir(&source).unwrap();
            fs::create_dir(&destination).unwrap();
            Self {
                _temp_dir: temp_dir,
                source,
                destination,
            }
        }

        fn write(root: &Path, relative: &str, size: usize) {
            let path = root.join(relative);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, vec![b'x'; size]).unwrap();
        }
    }

    fn engine_with_log(options: SyncOptions) -> (SyncEngine, Arc<EventLog>) {
        let log = Arc::new(EventLog::new());
        let engine = SyncEngine::with_options(options).with_reporter(log.clone());
        (engine, log)
    }

    #[test]
    fn test_sync_into_empty_destination() {
        let fixture = Fixture::new();
        Fixture::write(&fixture.source, "b.mp3", 10);
        Fixture::write(&fixture.source, "A.mp3", 20);
        Fixture::write(&fixture.source, "album/01.mp3", 30);

        let (engine, log) = engine_with_log(SyncOptions::default());
        let report = engine.sync(&fixture.source, &fixture.destination).unwrap();

        let copies: Vec<PathBuf> = log
            .events()
            .into_iter()
            .filter_map(|event| match event {
                SyncEvent::FileCopied { path, .. } => Some(path),
                _ => None,
            })
            .collect();
        assert_eq!(
            copies,
            vec![
                fixture.destination.join("A.mp3"),
                fixture.destination.join("b.mp3"),
                fixture.destination.join("album/01.mp3"),
            ]
        );
        assert_eq!(report.stats.files_copied, 3);
        assert_eq!(report.stats.bytes_copied, 60);
        assert_eq!(report.stats.directories_created, 1);
        assert!(report.is_success());
        assert!(!fixture.destination.join(".tmp").exists());
    }

    #[test]
    fn test_copied_files_keep_source_mtime() {
        let fixture = Fixture::new();
        Fixture::write(&fixture.source, "01.mp3", 10);
        let mtime = filetime::FileTime::from_unix_time(1_200_000_000, 0);
        filetime::set_file_mtime(fixture.source.join("01.mp3"), mtime).unwrap();

        SyncEngine::new()
            .sync(&fixture.source, &fixture.destination)
            .unwrap();

        let copied = fs::metadata(fixture.destination.join("01.mp3")).unwrap();
        assert_eq!(
            filetime::FileTime::from_last_modification_time(&copied),
            mtime
        );
    }

    #[test]
    fn test_second_run_is_a_no_op() {
        let fixture = Fixture::new();
        Fixture::write(&fixture.source, "01.mp3", 10);
        Fixture::write(&fixture.source, "sub/02.mp3", 10);

        let (engine, log) = engine_with_log(SyncOptions::default());
        engine.sync(&fixture.source, &fixture.destination).unwrap();
        log.clear();

        let report = engine.sync(&fixture.source, &fixture.destination).unwrap();
        assert!(log.mutations().is_empty());
        assert_eq!(report.stats.levels_skipped, 2);
        assert!(report.is_up_to_date());
    }

    #[test]
    fn test_resized_file_is_recopied() {
        let fixture = Fixture::new();
        Fixture::write(&fixture.source, "track05.mp3", 500);
        Fixture::write(&fixture.source, "track06.mp3", 100);

        let (engine, log) = engine_with_log(SyncOptions::default());
        engine.sync(&fixture.source, &fixture.destination).unwrap();
        log.clear();

        Fixture::write(&fixture.source, "track05.mp3", 600);
        let report = engine.sync(&fixture.source, &fixture.destination).unwrap();

        let track05 = fixture.destination.join("track05.mp3");
        let kinds: Vec<(&'static str, PathBuf)> = log
            .mutations()
            .iter()
            .map(|event| (event.kind(), event.path().to_path_buf()))
            .collect();
        assert!(kinds.contains(&("delete", track05.clone())));
        assert!(kinds.contains(&("copy", track05.clone())));
        assert_eq!(report.stats.files_copied, 1);
        assert_eq!(fs::metadata(&track05).unwrap().len(), 600);
    }

    #[test]
    fn test_rebuild_restores_unchanged_files_instead_of_copying() {
        let fixture = Fixture::new();
        Fixture::write(&fixture.source, "01.mp3", 100);
        Fixture::write(&fixture.destination, "01.mp3", 100);
        Fixture::write(&fixture.destination, "stale.mp3", 5);

        let (engine, _log) = engine_with_log(SyncOptions::default());
        let report = engine.sync(&fixture.source, &fixture.destination).unwrap();

        assert_eq!(report.stats.files_copied, 0);
        assert_eq!(report.stats.entries_restored, 1);
        assert_eq!(report.stats.entries_backed_up, 2);
        assert!(!fixture.destination.join("stale.mp3").exists());
        assert!(fixture.destination.join("01.mp3").exists());
    }

    #[test]
    fn test_ignored_destination_entries_survive() {
        let fixture = Fixture::new();
        Fixture::write(&fixture.source, "01.mp3", 10);
        Fixture::write(&fixture.destination, "MUSICBMK.BMK", 3);

        let engine = SyncEngine::new();
        engine.sync(&fixture.source, &fixture.destination).unwrap();

        assert!(fixture.destination.join("MUSICBMK.BMK").exists());
    }

    #[test]
    fn test_dry_run_does_not_touch_destination() {
        let fixture = Fixture::new();
        Fixture::write(&fixture.source, "01.mp3", 10);
        Fixture::write(&fixture.source, "new/02.mp3", 10);
        Fixture::write(&fixture.destination, "old.mp3", 10);

        let (engine, log) = engine_with_log(SyncOptions::dry_run());
        let report = engine.sync(&fixture.source, &fixture.destination).unwrap();

        assert!(report.dry_run);
        assert!(log.mutations().is_empty());
        assert_eq!(report.stats.levels_rebuilt, 2);
        assert!(fixture.destination.join("old.mp3").exists());
        assert!(!fixture.destination.join("new").exists());
    }

    #[test]
    fn test_content_strategy_replaces_same_size_edit() {
        let fixture = Fixture::new();
        fs::write(fixture.source.join("01.mp3"), b"new!").unwrap();
        fs::write(fixture.destination.join("01.mp3"), b"old!").unwrap();

        let engine = SyncEngine::new()
            .with_fingerprinter(Fingerprinter::new(FingerprintStrategy::Content));
        let report = engine.sync(&fixture.source, &fixture.destination).unwrap();

        assert_eq!(report.stats.files_deleted, 1);
        assert_eq!(fs::read(fixture.destination.join("01.mp3")).unwrap(), b"new!");
    }

    #[test]
    fn test_directory_replaces_file_of_same_name() {
        let fixture = Fixture::new();
        Fixture::write(&fixture.source, "x/01.mp3", 10);
        Fixture::write(&fixture.destination, "x", 10);

        let engine = SyncEngine::new();
        engine.sync(&fixture.source, &fixture.destination).unwrap();

        assert!(fixture.destination.join("x").is_dir());
        assert!(fixture.destination.join("x/01.mp3").exists());
    }

    #[test]
    fn test_missing_roots_are_rejected() {
        let fixture = Fixture::new();
        let engine = SyncEngine::new();

        let error = engine
            .sync(fixture.source.join("missing"), &fixture.destination)
            .unwrap_err();
        assert!(error.is_not_found());

        let error = engine
            .sync(&fixture.source, fixture.destination.join("missing"))
            .unwrap_err();
        assert!(error.is_not_found());
    }

    #[test]
    fn test_leftover_staging_is_resumed() {
        let fixture = Fixture::new();
        Fixture::write(&fixture.source, "01.mp3", 10);
        Fixture::write(&fixture.destination, ".tmp/01.mp3", 10);

        let (engine, log) = engine_with_log(SyncOptions::default());
        let report = engine.sync(&fixture.source, &fixture.destination).unwrap();

        assert_eq!(report.stats.files_copied, 0);
        assert_eq!(report.stats.entries_restored, 1);
        assert!(log
            .events()
            .iter()
            .any(|event| matches!(event, SyncEvent::StagingCleared { .. })));
        assert!(!fixture.destination.join(".tmp").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_continue_on_error_records_failure() {
        use std::os::unix::fs::PermissionsExt;

        let fixture = Fixture::new();
        Fixture::write(&fixture.source, "a/01.mp3", 10);
        Fixture::write(&fixture.source, "b/01.mp3", 10);
        engine_with_log(SyncOptions::default())
            .0
            .sync(&fixture.source, &fixture.destination)
            .unwrap();

        // An unreadable source subdirectory fails its own level only
        Fixture::write(&fixture.source, "b/02.mp3", 10);
        let locked = fixture.source.join("a");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
        if fs::read_dir(&locked).is_ok() {
            // running as root; permissions are not enforced
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let report = SyncEngine::new()
            .sync(&fixture.source, &fixture.destination)
            .unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].path, fixture.destination.join("a"));
        assert_eq!(report.stats.errors, 1);
        assert!(fixture.destination.join("b/02.mp3").exists());

        let strict = SyncOptions {
            continue_on_error: false,
            ..SyncOptions::default()
        };
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
        let result = SyncEngine::with_options(strict).sync(&fixture.source, &fixture.destination);
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        assert!(result.is_err());
    }

    #[test]
    fn test_from_config_uses_custom_staging_name() {
        let fixture = Fixture::new();
        Fixture::write(&fixture.source, "01.mp3", 10);
        Fixture::write(&fixture.destination, "old.mp3", 10);

        let mut config = Config::default();
        config.scan.staging_dir_name = ".staging".to_string();
        let engine = SyncEngine::from_config(&config);
        engine.sync(&fixture.source, &fixture.destination).unwrap();

        assert_eq!(
            engine.scanner.ignore_set().staging_dir_name(),
            OsStr::new(".staging")
        );
        assert!(!fixture.destination.join(".staging").exists());
        assert!(!fixture.destination.join("old.mp3").exists());
    }

    #[test]
    fn test_skipped_child_was_restored_in_sorted_order() {
        let fixture = Fixture::new();
        Fixture::write(&fixture.source, "album/B.mp3", 10);
        Fixture::write(&fixture.source, "album/a.mp3", 10);
        Fixture::write(&fixture.source, "x.mp3", 10);

        let (engine, log) = engine_with_log(SyncOptions::default());
        engine.sync(&fixture.source, &fixture.destination).unwrap();
        log.clear();

        Fixture::write(&fixture.source, "y.mp3", 10);
        engine.sync(&fixture.source, &fixture.destination).unwrap();

        let album = fixture.destination.join("album");
        let restored: Vec<PathBuf> = log
            .events()
            .into_iter()
            .filter_map(|event| match event {
                SyncEvent::Restored { path } if path.parent() == Some(album.as_path()) => {
                    Some(path)
                }
                _ => None,
            })
            .collect();
        assert_eq!(restored, vec![album.join("a.mp3"), album.join("B.mp3")]);
        assert!(log
            .events()
            .contains(&SyncEvent::LevelSkipped { path: album }));
    }

    #[test]
    fn test_skipped_level_descends_into_destination_spelling() {
        let fixture = Fixture::new();
        Fixture::write(&fixture.source, "cafe\u{301}/01.mp3", 20);
        Fixture::write(&fixture.destination, "caf\u{e9}/01.mp3", 10);

        let (engine, log) = engine_with_log(SyncOptions::default());
        let report = engine.sync(&fixture.source, &fixture.destination).unwrap();

        assert!(report.is_success(), "{:?}", report.failures);
        assert!(log.events().contains(&SyncEvent::LevelSkipped {
            path: fixture.destination.clone()
        }));
        assert!(log.events().contains(&SyncEvent::FileCopied {
            path: fixture.destination.join("caf\u{e9}/01.mp3"),
            bytes: 20
        }));

        log.clear();
        let report = engine.sync(&fixture.source, &fixture.destination).unwrap();
        assert!(report.is_success());
        assert!(log.mutations().is_empty());
    }

    #[test]
    fn test_rebuild_restores_from_other_spelling() {
        let fixture = Fixture::new();
        Fixture::write(&fixture.source, "cafe\u{301}/01.mp3", 10);
        Fixture::write(&fixture.source, "new.mp3", 10);
        Fixture::write(&fixture.destination, "caf\u{e9}/01.mp3", 10);

        let (engine, log) = engine_with_log(SyncOptions::default());
        let report = engine.sync(&fixture.source, &fixture.destination).unwrap();

        assert!(report.is_success());
        let copied: Vec<PathBuf> = log
            .events()
            .into_iter()
            .filter_map(|event| match event {
                SyncEvent::FileCopied { path, .. } => Some(path),
                _ => None,
            })
            .collect();
        assert_eq!(copied, vec![fixture.destination.join("new.mp3")]);
        assert!(fixture
            .destination
            .join("cafe\u{301}/01.mp3")
            .exists());
    }
}
