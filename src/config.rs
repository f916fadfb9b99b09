//! Command-line surface and its validation.

use clap::Parser;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::sync::{CompareMode, ReconcileOptions, SyncError};

/// Keep a replica folder identical to a source folder, pass after pass.
#[derive(Debug, Clone, Parser)]
#[command(name = "mirrorsync", version, about)]
pub struct Cli {
    /// Full path of the source folder
    pub source: PathBuf,

    /// Full path of the replica folder
    pub replica: PathBuf,

    /// Synchronization interval in seconds (fractions allowed)
    #[arg(value_parser = parse_interval)]
    pub interval: Duration,

    /// Full path of the .log file
    pub log_file: PathBuf,

    /// Run a single pass and exit
    #[arg(long)]
    pub once: bool,

    /// Report what would change without touching the replica
    #[arg(long)]
    pub dry_run: bool,

    /// How files present on both sides are compared
    #[arg(long, value_enum, default_value_t = CompareMode::Content)]
    pub compare: CompareMode,
}

/// Validated runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub source: PathBuf,
    pub replica: PathBuf,
    pub interval: Duration,
    pub log_file: PathBuf,
    pub once: bool,
    pub options: ReconcileOptions,
}

/// Parse a non-negative, finite number of seconds.
pub fn parse_interval(raw: &str) -> Result<Duration, SyncError> {
    let secs: f64 = raw
        .trim()
        .parse()
        .map_err(|_| SyncError::configuration(format!("interval '{}' is not a number", raw)))?;

    Duration::try_from_secs_f64(secs).map_err(|_| {
        SyncError::configuration(format!(
            "interval '{}' must be a finite, non-negative number of seconds",
            raw
        ))
    })
}

impl Config {
    pub fn from_cli(cli: Cli) -> Result<Self, SyncError> {
        let source = existing_dir(&cli.source)?;
        let replica = existing_dir(&cli.replica)?;

        if source == replica {
            return Err(SyncError::configuration(format!(
                "source and replica are the same folder: {}",
                source.display()
            )));
        }
        if replica.starts_with(&source) || source.starts_with(&replica) {
            return Err(SyncError::configuration(format!(
                "source '{}' and replica '{}' must not be nested in each other",
                source.display(),
                replica.display()
            )));
        }

        let log_file = resolve_log_path(&cli.log_file);
        if log_file.starts_with(&replica) {
            return Err(SyncError::configuration(format!(
                "log file '{}' would be deleted from inside the replica",
                log_file.display()
            )));
        }

        Ok(Self {
            source,
            replica,
            interval: cli.interval,
            log_file,
            once: cli.once,
            options: ReconcileOptions {
                compare: cli.compare,
                dry_run: cli.dry_run,
            },
        })
    }
}

fn existing_dir(path: &Path) -> Result<PathBuf, SyncError> {
    if !path.exists() {
        return Err(SyncError::NotFound {
            path: path.to_path_buf(),
        });
    }
    if !path.is_dir() {
        return Err(SyncError::configuration(format!(
            "'{}' is not a directory",
            path.display()
        )));
    }
    path.canonicalize()
        .map_err(|e| SyncError::from_listing(e, path))
}

/// Canonical form of the log path as far as it exists on disk.
fn resolve_log_path(path: &Path) -> PathBuf {
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) if !parent.as_os_str().is_empty() => parent
            .canonicalize()
            .map(|p| p.join(name))
            .unwrap_or_else(|_| path.to_path_buf()),
        _ => std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf()),
    }
}
