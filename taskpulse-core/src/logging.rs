//! Logging infrastructure for taskpulse
//!
//! Logs are written to `~/.local/state/taskpulse/` following XDG standards,
//! one file per UTC day named `taskpulse.YYYY-MM-DD.log`. Stdout is left to
//! the CLI's own output.

use crate::config::{Config, LoggingConfig};
use crate::error::{Error, Result};
use chrono::{NaiveDate, Utc};
use std::path::PathBuf;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_FILE_PREFIX: &str = "taskpulse";
const LOG_FILE_SUFFIX: &str = "log";

/// Initialize the logging system
///
/// Sets up tracing with:
/// - Daily-rotated file output in the XDG state directory
/// - At most `max_files` retained log files
/// - Log level from config, overridable via RUST_LOG
pub fn init(config: &LoggingConfig) -> Result<LoggingGuard> {
    let log_dir = Config::state_dir();
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix(LOG_FILE_SUFFIX)
        .max_log_files(config.max_files.max(1))
        .build(&log_dir)
        .map_err(|e| Error::Config(format!("failed to create log appender: {}", e)))?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    // A second init in the same process (tests) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .try_init();

    tracing::info!(
        log_file = %current_log_file().display(),
        level = %config.level,
        "Logging initialized"
    );

    Ok(LoggingGuard { _guard: guard })
}

/// Guard that keeps the logging system alive
///
/// When dropped, flushes any pending log writes.
pub struct LoggingGuard {
    _guard: tracing_appender::non_blocking::WorkerGuard,
}

/// Log file written on `date` (UTC), e.g. `taskpulse.2026-10-19.log`.
pub fn log_file_path(date: NaiveDate) -> PathBuf {
    Config::state_dir().join(format!(
        "{}.{}.{}",
        LOG_FILE_PREFIX,
        date.format("%Y-%m-%d"),
        LOG_FILE_SUFFIX
    ))
}

/// Log file currently being written.
pub fn current_log_file() -> PathBuf {
    log_file_path(Utc::now().date_naive())
}
