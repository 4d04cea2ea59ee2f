//! Cache tier: key-value backends, codecs, key format and typed clients.
//!
//! # Layers
//!
//! ```text
//! EntityCacheClient<T, C>   typed find/set, batch hit/miss split
//!         │
//!         ├── Codec<T>      T ↔ bytes (JSON default, bincode)
//!         │
//!         ▼
//! Arc<dyn KeyValueStore>    string → bytes with per-entry TTL
//!         │
//!         ├── MemoryStore   moka, in-process
//!         └── RedisStore    redis (feature `redis`)
//! ```
//!
//! [`KeySpace`] owns the `prefix:id` key format used by the cache-aside
//! repository in [`crate::cached`].

pub mod clients;
pub mod codec;
pub mod key;
pub mod providers;
mod traits;

pub use clients::{BatchLookup, EntityCacheClient};
pub use codec::{BincodeCodec, Codec, CodecError, JsonCodec};
pub use key::{KeyError, KeySpace, KEY_SEPARATOR};
pub use providers::MemoryStore;
#[cfg(feature = "redis")]
pub use providers::RedisStore;
pub use traits::{expiration_ttl, BoxFuture, KeyValueStore, StoreError, WriteOutcomes};
