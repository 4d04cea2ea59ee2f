//! Read-through cache-aside repository.
//!
//! [`CachedRepository`] puts an [`EntityCacheClient`](crate::cache::EntityCacheClient)
//! in front of any [`Repository`](crate::repository::Repository):
//!
//! ```text
//! caller ──► CachedRepository ──► cache (hit: done)
//!                   │
//!                   └─ miss ──► repository ──► cache write-back ──► caller
//! ```
//!
//! Per id the lookup ends in one of three states: cache hit, repository hit
//! (now cached), or absent (not cached). There are no retries; every I/O
//! failure reaches the caller, except write-back failures under
//! [`WriteBackPolicy::FailOpen`].
//!
//! # Example
//!
//! ```ignore
//! use cacheaside::cached::CachedRepository;
//!
//! let users = CachedRepository::builder(user_repo, |u: &User| u.id, "user")
//!     .expiration(Duration::from_secs(600))
//!     .build(store)?;
//!
//! let john = users.find_one(1).await?;
//! let team = users.find_many(&[1, 2, 3]).await?;
//! ```

mod policy;
mod repository;

pub use policy::WriteBackPolicy;
pub use repository::{CachedRepository, CachedRepositoryBuilder, IdFn, DEFAULT_EXPIRATION};
