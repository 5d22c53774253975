//! Logging setup with optional file output.
//!
//! Each process writes to `run.log` in the configured directory. On startup the
//! previous `run.log` is archived under a timestamped name and only the newest
//! `max_files` archives are kept.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use tracing::level_filters::LevelFilter;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::{LoggingError, LoggingResult};

const ARCHIVE_PREFIX: &str = "dash-finality.";
const ACTIVE_LOG_NAME: &str = "run.log";
const ARCHIVE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d.%H%M%S";

/// Keeps the background log writer alive. Buffered lines are flushed on drop.
#[derive(Debug)]
pub struct LoggingGuard {
    _worker_guard: Option<WorkerGuard>,
}

impl LoggingGuard {
    pub fn writes_to_file(&self) -> bool {
        self._worker_guard.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive such as `info` or `dash_spv_finality=debug`.
    /// When unset, `RUST_LOG` is used, falling back to `info`.
    #[serde(default)]
    pub level: Option<String>,
    /// Also log to stderr.
    #[serde(default = "default_console")]
    pub console: bool,
    #[serde(default)]
    pub file: Option<LogFileConfig>,
}

fn default_console() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: None,
            console: true,
            file: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogFileConfig {
    pub log_dir: PathBuf,
    /// Archived logs kept besides the active one.
    pub max_files: usize,
}

/// Console-only logging at `level`.
pub fn init_console_logging(level: LevelFilter) -> LoggingResult<LoggingGuard> {
    init_logging(LoggingConfig {
        level: Some(level.to_string()),
        console: true,
        file: None,
    })
}

/// Install the global tracing subscriber described by `config`.
///
/// Keep the returned guard alive for as long as logs should reach the file.
/// With neither console nor file output nothing is installed and the tracing
/// macros stay no-ops.
///
/// # Errors
///
/// Fails when the log directory cannot be prepared, when an invalid filter
/// directive is given, or when a global subscriber is already installed.
pub fn init_logging(config: LoggingConfig) -> LoggingResult<LoggingGuard> {
    if !config.console && config.file.is_none() {
        return Ok(LoggingGuard {
            _worker_guard: None,
        });
    }

    let env_filter = build_filter(config.level.as_deref())?;

    let (file_layer, guard) = match &config.file {
        Some(file_config) => {
            let (writer, guard) = open_log_file(file_config)?;
            let layer = fmt::layer().with_target(true).with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };
    let console_layer = config.console.then(|| fmt::layer().with_target(true).with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .map_err(|e| LoggingError::SubscriberInit(e.to_string()))?;

    tracing::debug!("Logging initialized (console: {}, file: {})", config.console, guard.is_some());
    Ok(LoggingGuard {
        _worker_guard: guard,
    })
}

fn build_filter(level: Option<&str>) -> LoggingResult<EnvFilter> {
    match level {
        Some(directive) => EnvFilter::try_new(directive)
            .map_err(|e| LoggingError::SubscriberInit(format!("invalid filter '{}': {}", directive, e))),
        None => Ok(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(LevelFilter::INFO.to_string()))),
    }
}

/// Prepare the log directory and open a fresh `run.log` behind a non-blocking writer.
fn open_log_file(config: &LogFileConfig) -> LoggingResult<(NonBlocking, WorkerGuard)> {
    fs::create_dir_all(&config.log_dir)?;
    archive_active_log(&config.log_dir)?;
    prune_archives(&config.log_dir, config.max_files)?;

    let file = File::create(config.log_dir.join(ACTIVE_LOG_NAME))?;
    Ok(tracing_appender::non_blocking(file))
}

/// Rename an existing `run.log` to `dash-finality.<timestamp>.log`, the
/// timestamp being the file's last modification.
fn archive_active_log(log_dir: &Path) -> LoggingResult<Option<PathBuf>> {
    let active = log_dir.join(ACTIVE_LOG_NAME);
    if !active.exists() {
        return Ok(None);
    }

    let modified: DateTime<Local> = fs::metadata(&active)
        .and_then(|metadata| metadata.modified())
        .map(DateTime::from)
        .unwrap_or_else(|_| Local::now());
    let archive = free_archive_path(log_dir, &modified.format(ARCHIVE_TIMESTAMP_FORMAT).to_string())?;

    fs::rename(&active, &archive).map_err(|e| LoggingError::RotationFailed(e.to_string()))?;
    Ok(Some(archive))
}

fn free_archive_path(log_dir: &Path, stamp: &str) -> LoggingResult<PathBuf> {
    let first = log_dir.join(format!("{}{}.log", ARCHIVE_PREFIX, stamp));
    if !first.exists() {
        return Ok(first);
    }
    (1..=999)
        .map(|n| log_dir.join(format!("{}{}-{}.log", ARCHIVE_PREFIX, stamp, n)))
        .find(|candidate| !candidate.exists())
        .ok_or_else(|| LoggingError::RotationFailed(format!("no free archive name for {}", stamp)))
}

fn is_archive(name: &str) -> bool {
    name.starts_with(ARCHIVE_PREFIX) && name.ends_with(".log")
}

/// Delete the oldest archives until at most `max_files` remain.
fn prune_archives(log_dir: &Path, max_files: usize) -> LoggingResult<usize> {
    let entries = fs::read_dir(log_dir).map_err(|e| LoggingError::RotationFailed(e.to_string()))?;
    let mut archives: Vec<(Option<std::time::SystemTime>, PathBuf)> = entries
        .filter_map(Result::ok)
        .filter(|entry| entry.file_name().to_str().is_some_and(is_archive))
        .map(|entry| (entry.metadata().and_then(|m| m.modified()).ok(), entry.path()))
        .collect();

    if archives.len() <= max_files {
        return Ok(0);
    }

    // Oldest first; names carry the timestamp so they break ties.
    archives.sort();
    let excess = archives.len() - max_files;
    let mut removed = 0;
    for (_, path) in archives.into_iter().take(excess) {
        match fs::remove_file(&path) {
            Ok(()) => removed += 1,
            Err(e) => tracing::warn!("Failed to remove old log file {}: {}", path.display(), e),
        }
    }
    Ok(removed)
}
