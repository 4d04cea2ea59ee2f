//! Key-value backend implementations.
//!
//! Each provider implements the `KeyValueStore` trait. Callers usually hold
//! them as `Arc<dyn KeyValueStore>`, built by `app::StoreBackend::connect()`.
//!
//! # Available Providers
//!
//! - [`MemoryStore`]: In-process cache using moka, per-entry TTL
//! - [`RedisStore`]: Redis over a multiplexed connection manager
//!   (cargo feature `redis`)

mod memory;
#[cfg(feature = "redis")]
mod redis;

pub use memory::MemoryStore;
#[cfg(feature = "redis")]
pub use self::redis::RedisStore;
