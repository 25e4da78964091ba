//! StickSync Testing Suite
//!
//! This crate provides integration tests of the sync properties and
//! benchmarks of the fingerprinting hot path.

#![warn(missing_docs)]
#![warn(clippy::all)]

use criterion::Criterion;
use std::time::Duration;

/// Unified test utilities
///
/// This module provides common utilities used across all test files
/// to ensure consistency and reduce code duplication.
pub mod test_utils;

/// Configure Criterion with standard settings for StickSync benchmarks
pub fn configure_criterion() -> Criterion {
    Criterion::default()
        .sample_size(50)
        .measurement_time(Duration::from_secs(5))
        .warm_up_time(Duration::from_secs(1))
}
