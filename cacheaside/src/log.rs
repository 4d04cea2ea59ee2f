//! Logging setup.
//!
//! Events go to stderr, and also to a daily-rolling file when a log directory
//! is configured. `RUST_LOG` overrides the configured level.

use std::fs;

use time::macros::format_description;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::fmt::time::LocalTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::app::AppError;
use crate::config::LoggingSettings;

/// Base name of the log files; the appender adds a date suffix.
pub const LOG_FILE_NAME: &str = "cacheaside.log";

/// Install the global subscriber.
///
/// `verbose` raises the configured level to `debug` unless `RUST_LOG` is set.
/// Keep the returned guard alive for the life of the program; dropping it
/// flushes and stops the file writer.
pub fn init(settings: &LoggingSettings, verbose: bool) -> Result<Option<WorkerGuard>, AppError> {
    let level = if verbose { "debug" } else { settings.level.as_str() };
    let filter = build_filter(level, std::env::var(EnvFilter::DEFAULT_ENV).ok())?;
    let timestamps = format_description!("[hour]:[minute]:[second].[subsecond digits:3]");

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_timer(LocalTime::new(timestamps))
        .with_target(false);

    let (file_layer, guard) = match &settings.directory {
        Some(dir) => {
            fs::create_dir_all(dir).map_err(|e| {
                AppError::Logging(format!("cannot create {}: {}", dir.display(), e))
            })?;
            let (writer, guard) = tracing_appender::non_blocking(rolling::daily(dir, LOG_FILE_NAME));
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_timer(LocalTime::new(timestamps));
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| AppError::Logging(e.to_string()))?;

    Ok(guard)
}

/// `RUST_LOG` wins over the configured level when set and non-empty.
fn build_filter(level: &str, env: Option<String>) -> Result<EnvFilter, AppError> {
    let directives = env
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| level.to_string());
    EnvFilter::try_new(&directives)
        .map_err(|e| AppError::Logging(format!("invalid filter '{}': {}", directives, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_from_level() {
        let filter = build_filter("cacheaside=debug,warn", None).unwrap();
        assert!(filter.to_string().contains("cacheaside=debug"));
    }

    #[test]
    fn test_env_overrides_level() {
        let filter = build_filter("info", Some("trace".to_string())).unwrap();
        assert!(filter.to_string().contains("trace"));
    }

    #[test]
    fn test_blank_env_is_ignored() {
        let filter = build_filter("warn", Some("  ".to_string())).unwrap();
        assert!(filter.to_string().contains("warn"));
    }

    #[test]
    fn test_invalid_directive() {
        let err = build_filter("cacheaside=loud", None).unwrap_err();
        assert!(matches!(err, AppError::Logging(_)));
        assert!(err.to_string().contains("cacheaside=loud"));
    }
}
