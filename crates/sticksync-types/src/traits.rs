//! Core traits for StickSync operations
//!
//! The sync engine reports every step through a [`SyncReporter`]; what happens
//! with the events (logging, a progress bar, collecting them for a report) is
//! up to the implementation.

use crate::{Error, SyncEvent, SyncStats};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Trait for observing a sync run
pub trait SyncReporter {
    /// Report one engine event
    fn report_event(&self, event: &SyncEvent);

    /// Report a directory whose sync failed
    fn report_error(&self, _path: &Path, _error: &Error) {}

    /// Report completion of the run
    fn report_completion(&self, _stats: &SyncStats) {}
}

impl<T: SyncReporter + ?Sized> SyncReporter for Arc<T> {
    fn report_event(&self, event: &SyncEvent) {
        (**self).report_event(event);
    }

    fn report_error(&self, path: &Path, error: &Error) {
        (**self).report_error(path, error);
    }

    fn report_completion(&self, stats: &SyncStats) {
        (**self).report_completion(stats);
    }
}

/// Reporter that drops everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullReporter;

impl SyncReporter for NullReporter {
    fn report_event(&self, _event: &SyncEvent) {}
}

/// Reporter that keeps every event in memory
///
/// Completed runs are summed up in [`EventLog::totals`].
#[derive(Debug, Default)]
pub struct EventLog {
    events: Mutex<Vec<SyncEvent>>,
    totals: Mutex<SyncStats>,
}

impl EventLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the recorded events in order
    pub fn events(&self) -> Vec<SyncEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Recorded events that changed the filesystem
    pub fn mutations(&self) -> Vec<SyncEvent> {
        self.events()
            .into_iter()
            .filter(SyncEvent::is_mutation)
            .collect()
    }

    /// Statistics of all completed runs added together
    pub fn totals(&self) -> SyncStats {
        self.totals
            .lock()
            .map(|totals| totals.clone())
            .unwrap_or_default()
    }

    /// Forget everything recorded so far
    pub fn clear(&self) {
        if let Ok(mut events) = self.events.lock() {
            events.clear();
        }
        if let Ok(mut totals) = self.totals.lock() {
            *totals = SyncStats::default();
        }
    }
}

impl SyncReporter for EventLog {
    fn report_event(&self, event: &SyncEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }

    fn report_completion(&self, stats: &SyncStats) {
        if let Ok(mut totals) = self.totals.lock() {
            totals.merge(stats);
        }
    }
}
