//! CLI error type.

use std::path::PathBuf;

use cacheaside::app::AppError;
use cacheaside::cache::StoreError;
use cacheaside::config::ConfigError;
use cacheaside::CacheError;
use thiserror::Error;

/// Errors reported by CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid combination of arguments or settings.
    #[error("{0}")]
    Config(String),

    /// The config file could not be read or written.
    #[error(transparent)]
    ConfigFile(#[from] ConfigError),

    /// Bootstrapping the backend failed.
    #[error(transparent)]
    App(#[from] AppError),

    /// A cache-aside lookup failed.
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// A raw store lookup failed.
    #[error("Cache backend error: {0}")]
    Store(#[from] StoreError),

    /// The JSON source file is unusable.
    #[error("Invalid source file {path}: {message}")]
    Source { path: PathBuf, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_error_display() {
        let err = CliError::Source {
            path: PathBuf::from("users.json"),
            message: "entry 2 has no integer 'id'".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid source file users.json: entry 2 has no integer 'id'"
        );
    }

    #[test]
    fn test_app_error_is_transparent() {
        let err: CliError = AppError::Logging("bad filter".to_string()).into();
        assert_eq!(err.to_string(), "Failed to initialize logging: bad filter");
    }
}
