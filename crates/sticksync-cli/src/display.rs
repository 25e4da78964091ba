//! Terminal display utilities for the StickSync CLI

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use sticksync_core::{SyncReport, TracingReporter};
use sticksync_types::{format_gib, CapacitySnapshot, Error, SyncEvent, SyncReporter, SyncStats};

/// Spinner that shows the latest engine event
///
/// Everything is forwarded to an inner reporter, the log by default.
pub struct SpinnerReporter {
    bar: ProgressBar,
    inner: Arc<dyn SyncReporter + Send + Sync>,
}

impl SpinnerReporter {
    /// Create and start the spinner
    pub fn new() -> Self {
        Self::forwarding_to(Arc::new(TracingReporter))
    }

    /// Create and start a spinner that forwards to `inner`
    pub fn forwarding_to(inner: Arc<dyn SyncReporter + Send + Sync>) -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message("Comparing directories...");
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar, inner }
    }

    /// Stop the spinner and clear its line
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl Default for SpinnerReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncReporter for SpinnerReporter {
    fn report_event(&self, event: &SyncEvent) {
        let name = event
            .path()
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| event.path().display().to_string());
        self.bar.set_message(format!("{:<8}{}", event.kind(), name));
        self.inner.report_event(event);
    }

    fn report_error(&self, path: &Path, error: &Error) {
        self.bar.suspend(|| display_error(&format!("{}: {}", path.display(), error)));
        self.inner.report_error(path, error);
    }

    fn report_completion(&self, stats: &SyncStats) {
        self.bar.suspend(|| self.inner.report_completion(stats));
    }
}

/// Print the header line of a sync run
pub fn display_sync_header(source: &Path, destination: &Path, dry_run: bool) {
    println!(
        "{} Synchronizing {} to {}",
        style("⟲").blue().bold(),
        style(source.display()).cyan(),
        style(destination.display()).cyan()
    );
    if dry_run {
        display_info("Dry run mode - no changes will be made");
    }
}

/// Print source size and free destination space
pub fn display_capacity(snapshot: &CapacitySnapshot) {
    println!("  Source size: {}", style(format_gib(snapshot.source_bytes)).cyan());
    println!(
        "  Free on destination: {}",
        style(format_gib(snapshot.destination_free_bytes)).cyan()
    );
}

/// Print the outcome of a sync run
pub fn display_report(report: &SyncReport) {
    if let Some(capacity) = &report.capacity {
        println!();
        println!("{}", style("Capacity:").bold().underlined());
        display_capacity(capacity);
    }

    for path in &report.junk_removed {
        println!("  Removed {}", style(path.display()).dim());
    }

    display_stats(&report.stats, report.dry_run);

    if !report.failures.is_empty() {
        println!();
        println!("{}", style("Failures:").bold().underlined());
        for failure in &report.failures {
            display_error(&format!("{}: {}", failure.path.display(), failure.message));
        }
    }

    println!();
    if !report.is_success() {
        display_warning(&format!(
            "{} director{} could not be synchronized",
            report.failures.len(),
            if report.failures.len() == 1 { "y" } else { "ies" }
        ));
    } else if report.stats.levels_rebuilt == 0 {
        display_success("Destination is already up to date");
    } else if report.dry_run {
        display_info(&format!(
            "{} director{} would be rebuilt",
            report.stats.levels_rebuilt,
            if report.stats.levels_rebuilt == 1 { "y" } else { "ies" }
        ));
    } else {
        display_success("Sync completed");
    }
}

fn display_stats(stats: &SyncStats, dry_run: bool) {
    println!();
    println!("{}", style("Sync Statistics:").bold().underlined());
    println!("  Levels unchanged: {}", style(stats.levels_skipped).green());
    println!(
        "  Levels {}: {}",
        if dry_run { "to rebuild" } else { "rebuilt" },
        style(stats.levels_rebuilt).yellow()
    );
    if dry_run {
        return;
    }

    println!(
        "  Directories created: {}",
        style(stats.directories_created).green()
    );
    println!("  Files copied: {}", style(stats.files_copied).green());
    println!(
        "  Bytes copied: {}",
        style(format_bytes(stats.bytes_copied)).green()
    );
    println!("  Entries restored: {}", style(stats.entries_restored).green());
    println!("  Files replaced: {}", style(stats.files_deleted).yellow());
    println!(
        "  Errors: {}",
        if stats.errors > 0 {
            style(stats.errors).red()
        } else {
            style(stats.errors).green()
        }
    );
    println!(
        "  Duration: {}",
        style(format_duration(stats.duration)).blue()
    );
    println!(
        "  Transfer rate: {}",
        style(format!("{:.2} MB/s", stats.transfer_rate() / 1024.0 / 1024.0)).blue()
    );
}

/// Format bytes in human-readable format
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    format!("{:.2} {}", size, UNITS[unit_index])
}

/// Format duration in human-readable format
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs < 60 {
        format!("{:.2}s", duration.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}

/// Display a warning message
pub fn display_warning(message: &str) {
    println!("{} {}", style("⚠").yellow().bold(), style(message).yellow());
}

/// Display an error message
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("✗").red().bold(), style(message).red());
}

/// Display a success message
pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green().bold(), style(message).green());
}

/// Display an info message
pub fn display_info(message: &str) {
    println!("{} {}", style("ℹ").blue().bold(), style(message).blue());
}
