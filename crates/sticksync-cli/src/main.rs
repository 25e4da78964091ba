//! StickSync - keep an MP3 stick in step with your music folder
//!
//! Players that ignore file names play tracks in the order the files were
//! written. StickSync only rewrites the directories that changed, and rewrites
//! them in sorted order.

mod display;
mod json_output;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use console::style;
use display::{
    display_capacity, display_report, display_success, display_sync_header, display_warning,
    SpinnerReporter,
};
use json_output::{print_json, SpaceResultJson, SyncResultJson};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use sticksync_config::{Config, ConfigLoader, LoggingConfig};
use sticksync_core::SyncSession;
use sticksync_device::{CapacityGuard, MountTable};
use sticksync_types::{format_gib, Error, FingerprintStrategy};
use tracing::{debug, info, warn};

/// StickSync - order-preserving sync for MP3 sticks
#[derive(Parser)]
#[command(
    name = "sticksync",
    version = env!("CARGO_PKG_VERSION"),
    about = "Order-preserving sync for MP3 sticks",
    long_about = "StickSync mirrors a music folder onto a USB stick or player.\n\
                  Unchanged directories are left alone; changed directories are\n\
                  rewritten in sorted order so creation-order players play them right."
)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Quiet mode - minimal output
    #[arg(short, long)]
    quiet: bool,

    /// Verbose mode - detailed output
    #[arg(short, long)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Synchronize a stick with a source directory
    Sync {
        /// Source directory
        source: PathBuf,
        /// Destination directory (defaults to the configured stick)
        destination: Option<PathBuf>,
        /// Dry run - only report which directories differ
        #[arg(long)]
        dry_run: bool,
        /// Print the run report as JSON
        #[arg(long)]
        json: bool,
        /// Leave OS metadata files on the stick
        #[arg(long)]
        keep_junk: bool,
        /// Do not compare source size with free space
        #[arg(long)]
        skip_capacity_check: bool,
        /// How directories are compared
        #[arg(long, value_enum)]
        strategy: Option<StrategyArg>,
    },
    /// Compare source size with free space on the stick
    Space {
        /// Source directory
        source: PathBuf,
        /// Destination directory (defaults to the configured stick)
        destination: Option<PathBuf>,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show configuration
    Config {
        /// Show default configuration
        #[arg(long)]
        default: bool,
        /// Write a default configuration file
        #[arg(long, value_name = "PATH")]
        generate: Option<PathBuf>,
    },
}

#[derive(ValueEnum, Clone, Copy)]
enum StrategyArg {
    /// Names and sizes
    Size,
    /// Names and content digests
    Content,
}

impl From<StrategyArg> for FingerprintStrategy {
    fn from(strategy: StrategyArg) -> Self {
        match strategy {
            StrategyArg::Size => FingerprintStrategy::Size,
            StrategyArg::Content => FingerprintStrategy::Content,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ConfigLoader::load_from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => ConfigLoader::load_default().context("Failed to load configuration")?,
    };

    init_logging(cli.debug, cli.quiet, cli.verbose, &config.logging)?;

    info!("StickSync v{} starting", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Sync {
            source,
            destination,
            dry_run,
            json,
            keep_junk,
            skip_capacity_check,
            strategy,
        } => {
            let mut config = config;
            config.sync.dry_run |= dry_run;
            if keep_junk {
                config.device.clean_junk = false;
            }
            if skip_capacity_check {
                config.capacity.enabled = false;
            }
            if let Some(strategy) = strategy {
                config.fingerprint.strategy = strategy.into();
            }
            let destination = resolve_destination(destination, &config, cli.quiet || json);
            sync_command(&source, &destination, config, json, cli.quiet)?;
        }
        Commands::Space {
            source,
            destination,
            json,
        } => {
            let destination = resolve_destination(destination, &config, cli.quiet || json);
            space_command(&source, &destination, json)?;
        }
        Commands::Config { default, generate } => {
            config_command(default, generate, &config)?;
        }
    }

    Ok(())
}

fn init_logging(debug: bool, quiet: bool, verbose: bool, logging: &LoggingConfig) -> Result<()> {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = match log_level_flag(debug, quiet, verbose) {
        Some(level) => EnvFilter::try_new(level),
        None => EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&logging.level)),
    }
    .with_context(|| format!("Invalid log filter '{}'", logging.level))?;

    let builder = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false);

    if logging.json_format {
        builder.json().init();
    } else {
        builder.with_ansi(logging.colored_output).init();
    }

    Ok(())
}

/// Level requested on the command line; it wins over `RUST_LOG` and the config
fn log_level_flag(debug: bool, quiet: bool, verbose: bool) -> Option<&'static str> {
    if debug {
        Some("debug")
    } else if verbose {
        Some("info")
    } else if quiet {
        Some("error")
    } else {
        None
    }
}

/// Fall back to the configured stick and warn when it does not look mounted
fn resolve_destination(destination: Option<PathBuf>, config: &Config, quiet: bool) -> PathBuf {
    let destination = destination.unwrap_or_else(|| config.device.default_destination.clone());

    if !destination.exists() {
        warn!("Destination {} does not exist", destination.display());
        if !quiet {
            display_warning(&format!(
                "{} not found - is the stick plugged in?",
                destination.display()
            ));
        }
        return destination;
    }

    match MountTable::load() {
        Ok(table) => {
            if let Some(entry) = table.mount_point_for(&destination) {
                if entry.mount_point == Path::new("/") {
                    warn!(
                        "Destination {} is on the root filesystem",
                        destination.display()
                    );
                    if !quiet {
                        display_warning(&format!(
                            "{} is not on a separate volume - is the stick mounted?",
                            destination.display()
                        ));
                    }
                } else if !entry.is_removable_filesystem() {
                    warn!(
                        "Destination volume {} is {}, not a removable filesystem",
                        entry.mount_point.display(),
                        entry.fs_type
                    );
                } else {
                    debug!(
                        "Destination volume: {} ({}, {})",
                        entry.mount_point.display(),
                        entry.device,
                        entry.fs_type
                    );
                }
            }
        }
        Err(e) => debug!("Mount table unavailable: {}", e),
    }

    destination
}

fn sync_command(
    source: &Path,
    destination: &Path,
    config: Config,
    json: bool,
    quiet: bool,
) -> Result<()> {
    let interactive = !json && !quiet;
    if interactive {
        display_sync_header(source, destination, config.sync.dry_run);
    }

    let spinner = interactive.then(|| Arc::new(SpinnerReporter::new()));
    let mut session = SyncSession::new(config);
    if let Some(spinner) = &spinner {
        session = session.with_reporter(spinner.clone());
    }

    let result = session.run(source, destination);
    if let Some(spinner) = &spinner {
        spinner.finish();
    }

    let report = match result {
        Ok(report) => report,
        Err(Error::InsufficientSpace {
            required,
            available,
        }) => {
            bail!(
                "Source size ({}) exceeds destination space ({})",
                format_gib(required),
                format_gib(available)
            );
        }
        Err(e) => return Err(e).context("Sync aborted"),
    };

    if json {
        print_json(&SyncResultJson::new(&report))?;
    } else if !quiet {
        display_report(&report);
    }

    if !report.is_success() {
        bail!(
            "{} of the source directories could not be synchronized",
            report.failures.len()
        );
    }

    info!("Sync operation completed successfully");
    Ok(())
}

fn space_command(source: &Path, destination: &Path, json: bool) -> Result<()> {
    let snapshot = CapacityGuard::new()
        .measure(source, destination)
        .context("Failed to measure capacity")?;

    if json {
        print_json(&SpaceResultJson::new(source, destination, &snapshot))?;
    } else {
        println!(
            "{} Capacity of {}",
            style("⚙").blue().bold(),
            style(destination.display()).cyan()
        );
        display_capacity(&snapshot);
    }

    if !snapshot.fits() {
        bail!(
            "Source size ({}) exceeds destination space ({})",
            format_gib(snapshot.source_bytes),
            format_gib(snapshot.destination_free_bytes)
        );
    }

    if !json {
        display_success("Source fits onto the destination");
    }
    Ok(())
}

fn config_command(default: bool, generate: Option<PathBuf>, config: &Config) -> Result<()> {
    if let Some(path) = generate {
        ConfigLoader::generate_default_config(&path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        display_success(&format!("Wrote default configuration to {}", path.display()));
        return Ok(());
    }

    if default {
        println!("{} Default configuration:", style("⚙").blue().bold());
        println!("{}", ConfigLoader::to_yaml(&Config::default())?);
    } else {
        println!("{} Current configuration:", style("⚙").blue().bold());
        println!("{}", ConfigLoader::to_yaml(config)?);
    }
    Ok(())
}
