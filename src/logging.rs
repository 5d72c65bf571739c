//! File-based logging bootstrap. stdout carries the wire protocol, so log
//! output must never reach it; everything goes to a rolling file under the
//! log directory instead.

use anyhow::Context;
use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use std::path::PathBuf;

const LOG_FILE_BASENAME: &str = "campusd";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 5 * 1024 * 1024;
const MAX_LOG_FILES: usize = 3;

fn default_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

fn log_dir() -> PathBuf {
    std::env::var_os("CAMPUSD_LOG_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::temp_dir().join("campusd-logs"))
}

/// Starts file logging. The returned handle must stay alive for the life
/// of the process; dropping it flushes and stops the logger. Failure is
/// reported, not fatal — the daemon still serves requests without logs.
pub fn init() -> anyhow::Result<LoggerHandle> {
    let dir = log_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create log directory {}", dir.display()))?;

    let level = std::env::var("CAMPUSD_LOG").unwrap_or_else(|_| default_level().to_string());
    let handle = Logger::try_with_str(&level)
        .with_context(|| format!("invalid log level {}", level))?
        .log_to_file(
            FileSpec::default()
                .directory(&dir)
                .basename(LOG_FILE_BASENAME),
        )
        .rotate(
            Criterion::Size(MAX_LOG_FILE_SIZE_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(MAX_LOG_FILES),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        .start()
        .context("failed to start logger")?;

    log::info!(
        "event=app_start version={} log_dir={}",
        env!("CARGO_PKG_VERSION"),
        dir.display()
    );
    Ok(handle)
}
