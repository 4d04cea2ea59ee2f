//! Core traits for the key-value cache tier.
//!
//! The `KeyValueStore` trait is the raw backend interface the cache-aside
//! layer talks to. It knows nothing about entities or serialization: keys are
//! strings, values are bytes, and every write carries its own expiration.
//!
//! # Design Principles
//!
//! - **String keys**: Human-readable in `redis-cli` and logs
//! - **Vec<u8> values**: Raw bytes, the codec lives one layer up
//! - **Absence is not an error**: a missing key is `Ok(None)`, never `Err`
//! - **Batch round-trips**: `get_many` / `set_many` map onto `MGET` and a
//!   pipelined `SET`, not onto concurrent requests
//! - **Dyn-compatible**: Uses `Pin<Box<dyn Future>>` for trait object support

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use thiserror::Error;

/// Errors reported by a key-value backend.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The backend could not be reached or the connection dropped.
    #[error("Connection error: {0}")]
    Connection(String),

    /// The backend rejected a command.
    #[error("Command failed: {0}")]
    Command(String),

    /// Value exceeds the maximum size the backend accepts.
    #[error("Value too large: {size} bytes (max: {max})")]
    ValueTooLarge { size: u64, max: u64 },
}

/// Boxed future type for dyn-compatible async methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Per-entry outcome of a batched write, in input order.
pub type WriteOutcomes = Vec<Result<(), StoreError>>;

/// Converts a configured expiration into a backend TTL.
///
/// `Duration::ZERO` means "store indefinitely", matching the `SET` convention
/// of key-value stores that treat a missing expiry as persistent.
pub fn expiration_ttl(expiration: Duration) -> Option<Duration> {
    if expiration.is_zero() {
        None
    } else {
        Some(expiration)
    }
}

/// String-keyed key-value backend with per-entry expiration.
///
/// # Absence vs. failure
///
/// `get` and `get_many` return `None` for keys that hold no value. An `Err`
/// always means the backend itself failed (connectivity, rejected command),
/// and callers propagate it without retrying.
///
/// # Batched writes
///
/// `set_many` is fire-and-collect rather than all-or-nothing: the outer
/// `Result` fails only when the batch could not be issued at all, otherwise
/// each entry reports its own outcome and successful entries stay written.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync` for use across async tasks.
pub trait KeyValueStore: Send + Sync {
    /// Retrieve a value by key.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(data))` if the key exists
    /// - `Ok(None)` if the key is not found
    /// - `Err(_)` if the backend fails
    fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Option<Vec<u8>>, StoreError>>;

    /// Retrieve several values in one round-trip.
    ///
    /// The returned vector has one slot per input key, in input order.
    fn get_many<'a>(
        &'a self,
        keys: &'a [String],
    ) -> BoxFuture<'a, Result<Vec<Option<Vec<u8>>>, StoreError>>;

    /// Store a value, replacing any existing one.
    ///
    /// # Arguments
    ///
    /// * `key` - The cache key
    /// * `value` - The encoded value
    /// * `ttl` - Time-to-live, `None` for no expiration
    fn set<'a>(
        &'a self,
        key: &'a str,
        value: Vec<u8>,
        ttl: Option<Duration>,
    ) -> BoxFuture<'a, Result<(), StoreError>>;

    /// Store several values with the same TTL in one batch.
    ///
    /// Returns one outcome per entry, in input order.
    fn set_many(
        &self,
        entries: Vec<(String, Vec<u8>)>,
        ttl: Option<Duration>,
    ) -> BoxFuture<'_, Result<WriteOutcomes, StoreError>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_expiration_means_no_ttl() {
        assert_eq!(expiration_ttl(Duration::ZERO), None);
    }

    #[test]
    fn test_nonzero_expiration_is_ttl() {
        let ttl = Duration::from_secs(90);
        assert_eq!(expiration_ttl(ttl), Some(ttl));
    }

    #[test]
    fn test_store_error_display() {
        let err = StoreError::ValueTooLarge { size: 100, max: 50 };
        assert!(err.to_string().contains("100"));
        assert!(err.to_string().contains("50"));

        let err = StoreError::Connection("refused".to_string());
        assert_eq!(err.to_string(), "Connection error: refused");
    }
}
