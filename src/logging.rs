//! Logging setup for the command-line tool
//!
//! Logs go to stderr so that stdout only carries the resolved facts. When a
//! log file is configured, JSON lines are written there instead through a
//! non-blocking `tracing-appender` writer.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::config::LogConfig;

/// Build the filter: `RUST_LOG` wins over the configured level
pub fn env_filter(config: &LogConfig) -> EnvFilter {
    env_filter_with(std::env::var(EnvFilter::DEFAULT_ENV).ok(), config)
}

fn env_filter_with(rust_log: Option<String>, config: &LogConfig) -> EnvFilter {
    rust_log
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(&config.level))
}

/// Install the global subscriber
///
/// The returned guard flushes the log file when dropped and must be kept
/// alive until the program exits.
pub fn init(config: &LogConfig) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = env_filter(config);

    let Some(file) = &config.file else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init()
            .map_err(|e| anyhow::anyhow!("failed to install logger: {e}"))?;
        return Ok(None);
    };

    let directory = file
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(directory)?;
    let file_name = file
        .file_name()
        .ok_or_else(|| anyhow::anyhow!("log file path {:?} has no file name", file))?;

    let appender = tracing_appender::rolling::never(directory, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_writer(writer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install logger: {e}"))?;

    Ok(Some(guard))
}
