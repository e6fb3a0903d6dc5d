//! Logging setup for the binary.
//!
//! The terminal belongs to the UI, so logs go to a daily rolling file through
//! a non-blocking writer. `RUST_LOG` overrides the default filter.

use crate::error::{Error, Result};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log file name prefix inside the log directory.
pub const LOG_FILE_PREFIX: &str = "architect.log";

/// Default filter for this crate.
pub const fn default_filter(debug: bool) -> &'static str {
    if debug {
        "architect=debug"
    } else {
        "architect=info"
    }
}

/// Install the global subscriber.
///
/// Keep the returned guard alive for as long as logs should be written;
/// dropping it flushes the writer.
pub fn init_logging(log_dir: &Path, debug: bool) -> Result<WorkerGuard> {
    std::fs::create_dir_all(log_dir)?;

    let appender = RollingFileAppender::new(Rotation::DAILY, log_dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(debug)));

    let file_layer = fmt::layer()
        .with_writer(writer)
        .with_target(false)
        .with_thread_names(true)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .try_init()
        .map_err(|e| Error::Logging(e.to_string()))?;

    Ok(guard)
}
