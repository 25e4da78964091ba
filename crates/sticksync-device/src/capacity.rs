//! Capacity preflight
//!
//! The guard runs once, before the sync engine touches the destination. A
//! failure aborts the whole run with both figures so the caller can report them.

use crate::space::{SpaceProbe, SystemSpaceProbe};
use std::path::Path;
use sticksync_types::{format_gib, CapacitySnapshot, Error, Result};
use tracing::{debug, warn};

/// One-time comparison of source size against free destination space
#[derive(Debug, Clone, Default)]
pub struct CapacityGuard<P = SystemSpaceProbe> {
    probe: P,
}

impl CapacityGuard<SystemSpaceProbe> {
    /// Create a guard that queries the local filesystem
    pub fn new() -> Self {
        Self {
            probe: SystemSpaceProbe,
        }
    }
}

impl<P: SpaceProbe> CapacityGuard<P> {
    /// Create a guard with a custom space probe
    pub fn with_probe(probe: P) -> Self {
        Self { probe }
    }

    /// Gather both figures without judging them
    pub fn measure(
        &self,
        source_root: impl AsRef<Path>,
        destination_root: impl AsRef<Path>,
    ) -> Result<CapacitySnapshot> {
        let source_root = source_root.as_ref();
        let destination_root = destination_root.as_ref();

        let source_bytes = self.probe.occupied_bytes(source_root)?;
        let destination_free_bytes = self.probe.free_bytes(destination_root)?;

        debug!(
            "Capacity: source {} bytes, destination free {} bytes",
            source_bytes, destination_free_bytes
        );

        Ok(CapacitySnapshot {
            source_bytes,
            destination_free_bytes,
        })
    }

    /// Measure and fail with [`Error::InsufficientSpace`] when the source does not fit
    pub fn check(
        &self,
        source_root: impl AsRef<Path>,
        destination_root: impl AsRef<Path>,
    ) -> Result<CapacitySnapshot> {
        let snapshot = self.measure(source_root, destination_root)?;
        Self::evaluate(snapshot)
    }

    /// Judge a snapshot: required strictly above available is an error
    pub fn evaluate(snapshot: CapacitySnapshot) -> Result<CapacitySnapshot> {
        if snapshot.fits() {
            return Ok(snapshot);
        }

        warn!(
            "Source size ({}) exceeds destination space ({})",
            format_gib(snapshot.source_bytes),
            format_gib(snapshot.destination_free_bytes)
        );

        Err(Error::InsufficientSpace {
            required: snapshot.source_bytes,
            available: snapshot.destination_free_bytes,
        })
    }
}
