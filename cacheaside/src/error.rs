//! Error type for cache clients and the cache-aside repository.

use thiserror::Error;

use crate::cache::{CodecError, KeyError, StoreError};

/// Boxed error from a caller-supplied repository.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type for cache-aside operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Errors surfaced by [`EntityCacheClient`](crate::cache::clients::EntityCacheClient)
/// and [`CachedRepository`](crate::cached::CachedRepository).
///
/// A missing entry or entity is never an error; it is `Ok(None)` or a key in
/// the `missing` list of a batch lookup.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The key-value backend failed. Never retried.
    #[error("Cache backend error: {0}")]
    Store(#[from] StoreError),

    /// A stored value did not decode. Not treated as a miss.
    #[error("Failed to decode cached value at '{key}': {source}")]
    Decode { key: String, source: CodecError },

    /// An entity could not be encoded for storage.
    #[error("Failed to encode value for '{key}': {source}")]
    Encode { key: String, source: CodecError },

    /// A key could not be mapped back to an id.
    #[error("Invalid cache key: {0}")]
    Key(#[from] KeyError),

    /// Lookups need a non-empty key.
    #[error("Cache key must not be empty")]
    EmptyKey,

    /// `set_many` got a different number of keys and entities.
    #[error("Got {keys} keys for {entities} entities")]
    LengthMismatch { keys: usize, entities: usize },

    /// Some writes of a batch failed; the rest were committed.
    #[error("{failed} of {total} cache writes failed")]
    PartialWrite {
        failed: usize,
        total: usize,
        errors: Vec<(String, StoreError)>,
    },

    /// The backing repository failed.
    #[error("Repository error: {0}")]
    Repository(#[source] BoxError),
}

impl CacheError {
    /// Wrap a repository error.
    pub fn repository<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        CacheError::Repository(Box::new(err))
    }
}
