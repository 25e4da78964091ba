//! One complete sync run as driven from a configuration
//!
//! A session ties the pieces together in a fixed order: validate both roots,
//! run the capacity preflight, remove junk from the destination root, then
//! hand over to the [`SyncEngine`]. The preflight runs before anything is
//! modified, so an abort leaves the destination exactly as it was.

use crate::engine::{validate_roots, SyncEngine, SyncRequest};
use crate::report::SyncReport;
use std::path::Path;
use std::sync::Arc;
use sticksync_config::Config;
use sticksync_device::{CapacityGuard, JunkCleaner, SpaceProbe, SystemSpaceProbe};
use sticksync_types::{format_gib, Result, RunId, SyncReporter};
use tracing::{info, info_span};

/// Configured sync run
#[derive(Debug)]
pub struct SyncSession<P = SystemSpaceProbe> {
    config: Config,
    engine: SyncEngine,
    guard: CapacityGuard<P>,
}

impl SyncSession<SystemSpaceProbe> {
    /// Create a session that measures the real filesystems
    pub fn new(config: Config) -> Self {
        Self::with_probe(config, SystemSpaceProbe)
    }
}

impl<P: SpaceProbe> SyncSession<P> {
    /// Create a session with a custom space probe
    pub fn with_probe(config: Config, probe: P) -> Self {
        let engine = SyncEngine::from_config(&config);
        Self {
            config,
            engine,
            guard: CapacityGuard::with_probe(probe),
        }
    }

    /// Send engine events to `reporter`
    pub fn with_reporter(mut self, reporter: Arc<dyn SyncReporter + Send + Sync>) -> Self {
        self.engine = self.engine.with_reporter(reporter);
        self
    }

    /// The session's configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the sync
    pub fn run<S: AsRef<Path>, D: AsRef<Path>>(&self, source: S, destination: D) -> Result<SyncReport> {
        let source = source.as_ref();
        let destination = destination.as_ref();
        let run_id = RunId::new_v4();
        let span = info_span!("session", run_id = %run_id);
        let _enter = span.enter();

        validate_roots(source, destination)?;

        let capacity = if self.config.capacity.enabled {
            let snapshot = self.guard.check(source, destination)?;
            info!(
                "Source size {}, destination free {}",
                format_gib(snapshot.source_bytes),
                format_gib(snapshot.destination_free_bytes)
            );
            Some(snapshot)
        } else {
            None
        };

        let junk_removed = if self.config.device.clean_junk && !self.config.sync.dry_run {
            JunkCleaner::new(self.config.device.junk_files.iter().cloned()).clean(destination)
        } else {
            Vec::new()
        };

        let mut report = self
            .engine
            .execute(SyncRequest::new(source, destination).with_run_id(run_id))?;
        report.capacity = capacity;
        report.junk_removed = junk_removed;
        Ok(report)
    }
}
