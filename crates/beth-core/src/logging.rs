//! Structured logging setup.
//!
//! Filter precedence: `BETH_LOG` environment variable, then the configured
//! level. Output goes to stderr unless a log file is configured, in which
//! case a non-blocking file writer is used.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::LoggingConfig;

/// Environment variable overriding the configured filter.
pub const LOG_ENV: &str = "BETH_LOG";

/// Builds the filter from `BETH_LOG` or the configured level.
///
/// # Errors
/// Returns an error if the directive cannot be parsed.
pub fn build_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    match std::env::var(LOG_ENV) {
        Ok(directive) if !directive.trim().is_empty() => EnvFilter::try_new(&directive)
            .with_context(|| format!("Invalid {LOG_ENV} filter '{directive}'")),
        _ => EnvFilter::try_new(&config.level)
            .with_context(|| format!("Invalid log level '{}'", config.level)),
    }
}

/// Installs the global subscriber.
///
/// The returned guard flushes the file writer on drop; keep it alive for the
/// lifetime of the process. Returns `None` when logging to stderr.
///
/// # Errors
/// Returns an error if the filter is invalid, the log file cannot be opened,
/// or a global subscriber is already installed.
pub fn init(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let filter = build_filter(config)?;
    let registry = tracing_subscriber::registry().with(filter);

    if let Some(file) = &config.file {
        let (writer, guard) = tracing_appender::non_blocking(open_log_file(file)?);
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_target(true)
                    .with_writer(writer),
            )
            .try_init()
            .context("Failed to install log subscriber")?;
        return Ok(Some(guard));
    }

    registry
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .try_init()
        .context("Failed to install log subscriber")?;
    Ok(None)
}

fn open_log_file(path: &Path) -> Result<fs::File> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
    }
    fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_invalid_level_rejected() {
        let config = LoggingConfig {
            level: "beth=verbose".to_string(),
            file: None,
        };
        if std::env::var(LOG_ENV).is_err() {
            assert!(build_filter(&config).is_err());
        }
    }

    #[test]
    fn test_log_file_parent_created() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("logs").join("beth.log");

        open_log_file(&path).unwrap();

        assert!(path.exists());
    }
}
