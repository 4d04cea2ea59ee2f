//! cacheaside - read-through caching for keyed entity repositories
//!
//! Wraps any repository of `i64`-keyed entities with a cache-aside layer over
//! a key-value store with TTL. Lookups go to the cache first; misses are
//! fetched from the repository in one batch and written back.
//!
//! # Layers
//!
//! - [`cache`] - key-value backends ([`MemoryStore`], `RedisStore`), codecs,
//!   key construction, and the typed [`EntityCacheClient`]
//! - [`repository`] - the [`Repository`] trait the authoritative source
//!   implements
//! - [`cached`] - [`CachedRepository`], the read-through orchestrator
//! - [`config`], [`app`], [`log`] - INI configuration, backend bootstrap,
//!   and tracing setup
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use std::time::Duration;
//! use cacheaside::{CachedRepository, MemoryStore};
//!
//! let store = Arc::new(MemoryStore::new(64 * 1024 * 1024));
//! let users = CachedRepository::new(
//!     user_repo,
//!     |u: &User| u.id,
//!     "user",
//!     store,
//!     Duration::from_secs(600),
//! )?;
//!
//! let found = users.find_many(&[1, 2, 3]).await?;
//! ```

pub mod app;
pub mod cache;
pub mod cached;
pub mod config;
pub mod error;
pub mod log;
pub mod repository;

pub use cache::{EntityCacheClient, KeyValueStore, MemoryStore};
pub use cached::{CachedRepository, WriteBackPolicy};
pub use error::{CacheError, CacheResult};
pub use repository::{FnRepository, Repository};

#[cfg(feature = "redis")]
pub use cache::RedisStore;
