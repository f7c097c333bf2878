// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Logging initialization
//!
//! Console output goes to stderr so tools can keep stdout for data. With the
//! `file-logging` feature a combined JSON log is also written into a
//! timestamped run folder:
//! ```text
//! ./logs/
//!   └── run_20250101_120000/
//!       └── im.log
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::cli::CrateDebugFlags;
use crate::config::{LogFormat, LoggingConfig};

/// Run folders older than this are removed (days)
pub const DEFAULT_RETENTION_DAYS: u64 = 30;

/// At most this many run folders are kept
pub const DEFAULT_RETENTION_RUNS: usize = 10;

const RUN_PREFIX: &str = "run_";
const RUN_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Keeps file writers alive; logs are flushed when it is dropped
pub struct LoggingGuard {
    #[cfg(feature = "file-logging")]
    _file_guards: Vec<tracing_appender::non_blocking::WorkerGuard>,
    log_dir: Option<PathBuf>,
}

impl LoggingGuard {
    /// Run folder receiving file logs, if file logging is active
    pub fn log_dir(&self) -> Option<&Path> {
        self.log_dir.as_deref()
    }
}

/// Folder name for a run started at `started`
pub fn run_folder_name(started: DateTime<Utc>) -> String {
    format!("{}{}", RUN_PREFIX, started.format(RUN_TIMESTAMP_FORMAT))
}

fn parse_run_folder(dir_name: &str) -> Option<DateTime<Utc>> {
    let timestamp = dir_name.strip_prefix(RUN_PREFIX)?;
    let naive = NaiveDateTime::parse_from_str(timestamp, RUN_TIMESTAMP_FORMAT).ok()?;
    Some(Utc.from_utc_datetime(&naive))
}

/// Parse a filter directive string into an `EnvFilter`
pub fn build_filter(directives: &str) -> Result<EnvFilter> {
    EnvFilter::try_new(directives)
        .with_context(|| format!("Invalid log filter directives: '{}'", directives))
}

/// Install the global subscriber.
///
/// The filter is the debug-flag targets at `debug` plus `config.level` for
/// everything else.
///
/// # Errors
///
/// Fails on an invalid level, an unwritable log folder, or if a global
/// subscriber is already installed.
pub fn init_logging(debug_flags: &CrateDebugFlags, config: &LoggingConfig) -> Result<LoggingGuard> {
    let filter = debug_flags.to_filter_string(&config.level);
    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();

    let console_layer = match config.format {
        LogFormat::Text => tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_filter(build_filter(&filter)?)
            .boxed(),
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .json()
            .with_filter(build_filter(&filter)?)
            .boxed(),
    };
    layers.push(console_layer);

    #[cfg(feature = "file-logging")]
    let (file_guards, log_dir) = {
        let base_log_dir = config
            .file_path
            .clone()
            .unwrap_or_else(|| PathBuf::from("./logs"));
        let run_folder = base_log_dir.join(run_folder_name(Utc::now()));
        std::fs::create_dir_all(&run_folder).with_context(|| {
            format!("Failed to create log directory: {}", run_folder.display())
        })?;
        cleanup_old_logs(&base_log_dir, None, None)?;

        let appender = tracing_appender::rolling::never(&run_folder, "im.log");
        let (non_blocking, guard) = tracing_appender::non_blocking(appender);
        layers.push(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .json()
                .with_filter(build_filter(&filter)?)
                .boxed(),
        );
        (vec![guard], Some(run_folder))
    };
    #[cfg(not(feature = "file-logging"))]
    let log_dir = None;

    Registry::default()
        .with(layers)
        .try_init()
        .context("Failed to install the global tracing subscriber")?;

    tracing::debug!(target: "im_observability", %filter, "logging initialized");

    Ok(LoggingGuard {
        #[cfg(feature = "file-logging")]
        _file_guards: file_guards,
        log_dir,
    })
}

/// Initialize logging with default settings
pub fn init_logging_default(debug_flags: &CrateDebugFlags) -> Result<LoggingGuard> {
    init_logging(debug_flags, &LoggingConfig::default())
}

/// Remove old run folders under `base_log_dir`.
///
/// Folders older than `retention_days` go first; of the rest only the newest
/// `retention_runs` are kept. Returns the number of folders removed.
pub fn cleanup_old_logs(
    base_log_dir: &Path,
    retention_days: Option<u64>,
    retention_runs: Option<usize>,
) -> Result<usize> {
    if !base_log_dir.exists() {
        return Ok(0);
    }

    let retention_days = retention_days.unwrap_or(DEFAULT_RETENTION_DAYS);
    let retention_runs = retention_runs.unwrap_or(DEFAULT_RETENTION_RUNS);
    let cutoff = Utc::now() - chrono::Duration::days(retention_days as i64);

    let mut runs: Vec<(PathBuf, DateTime<Utc>)> = Vec::new();
    for entry in std::fs::read_dir(base_log_dir)? {
        let path = entry?.path();
        if !path.is_dir() {
            continue;
        }
        if let Some(started) = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(parse_run_folder)
        {
            runs.push((path, started));
        }
    }

    // Newest first
    runs.sort_by(|a, b| b.1.cmp(&a.1));

    let mut removed = 0;
    for (index, (path, started)) in runs.iter().enumerate() {
        if *started < cutoff || index >= retention_runs {
            match std::fs::remove_dir_all(path) {
                Ok(()) => removed += 1,
                Err(e) => eprintln!(
                    "Warning: Failed to remove old log directory {}: {}",
                    path.display(),
                    e
                ),
            }
        }
    }

    Ok(removed)
}
