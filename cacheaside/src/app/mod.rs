//! Application bootstrap.
//!
//! Turns a [`ConfigFile`](crate::config::ConfigFile) into a connected
//! key-value backend and cache-aside repositories configured from its
//! `[cache]` section.
//!
//! ```text
//! ConfigFile ──► connect_store ──► Arc<dyn KeyValueStore>
//!                                        │
//!                 CacheAsideApp::cached ─┴─► CachedRepository<T, R>
//! ```

mod bootstrap;
mod error;

pub use bootstrap::{connect_store, CacheAsideApp};
pub use error::AppError;
