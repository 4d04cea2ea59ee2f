//! Application error types.

use thiserror::Error;

use crate::cache::StoreError;
use crate::config::{BackendKind, ConfigError};
use crate::error::CacheError;

/// Errors that can occur while bootstrapping the cache-aside layer.
#[derive(Debug, Error)]
pub enum AppError {
    /// The configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The configured backend was not compiled in.
    #[error("Backend '{0}' is not available in this build (enable the '{0}' feature)")]
    BackendUnavailable(BackendKind),

    /// Connecting to the backend failed.
    #[error("Failed to connect to {backend} backend: {source}")]
    Connect {
        backend: BackendKind,
        source: StoreError,
    },

    /// A cache-aside repository could not be built.
    #[error("Failed to build cached repository: {0}")]
    Cache(#[from] CacheError),

    /// Logging could not be initialized.
    #[error("Failed to initialize logging: {0}")]
    Logging(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::KeyError;

    #[test]
    fn test_backend_unavailable_display() {
        let err = AppError::BackendUnavailable(BackendKind::Redis);
        assert_eq!(
            err.to_string(),
            "Backend 'redis' is not available in this build (enable the 'redis' feature)"
        );
    }

    #[test]
    fn test_connect_error_keeps_source() {
        let err = AppError::Connect {
            backend: BackendKind::Redis,
            source: StoreError::Connection("refused".to_string()),
        };
        assert!(err.to_string().contains("redis backend"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_from_cache_error() {
        let err: AppError = CacheError::Key(KeyError::EmptyPrefix).into();
        assert!(matches!(err, AppError::Cache(_)));
    }
}
