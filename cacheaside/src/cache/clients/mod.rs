//! Typed cache clients.
//!
//! These clients wrap the generic `KeyValueStore` trait with value
//! serialization, turning string → bytes storage into string → entity
//! storage.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │        EntityCacheClient<T, C>       │
//! │                                      │
//! │  T ↔ bytes via Codec (JSON default)  │
//! │  Hit/miss split, write collection    │
//! └──────────────────┬───────────────────┘
//!                    │
//!                    ▼
//! ┌──────────────────────────────────────┐
//! │        Arc<dyn KeyValueStore>        │
//! │                                      │
//! │  Generic key-value store with TTL    │
//! └──────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use cacheaside::cache::clients::EntityCacheClient;
//!
//! let users: EntityCacheClient<User> = EntityCacheClient::new(store);
//!
//! users.set_one("user:1", &john, Duration::from_secs(600)).await?;
//!
//! if let Some(user) = users.find_one("user:1").await? {
//!     // Cache hit
//! }
//! ```

mod entity;

pub use entity::{BatchLookup, EntityCacheClient};
