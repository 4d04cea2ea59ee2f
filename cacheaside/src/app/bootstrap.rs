//! Application bootstrap implementation.
//!
//! Connects the configured key-value backend once and hands out cache-aside
//! repositories that share it.

use std::sync::Arc;

use tracing::info;

use super::error::AppError;
use crate::cache::{Codec, JsonCodec, KeyValueStore, MemoryStore};
use crate::cached::{CachedRepository, IdFn};
use crate::config::{format_duration, format_size, BackendKind, CacheSettings, ConfigFile};
use crate::repository::Repository;

/// Connect the backend selected by `[cache] backend`.
///
/// # Errors
///
/// - [`AppError::Connect`] if the Redis server cannot be reached
/// - [`AppError::BackendUnavailable`] if Redis is selected but the crate was
///   built without the `redis` feature
pub async fn connect_store(settings: &CacheSettings) -> Result<Arc<dyn KeyValueStore>, AppError> {
    match settings.backend {
        BackendKind::Memory => {
            info!(
                max_size = %format_size(settings.memory_size),
                "Using in-memory cache backend"
            );
            Ok(Arc::new(MemoryStore::new(settings.memory_size)))
        }
        BackendKind::Redis => connect_redis(&settings.redis_url).await,
    }
}

#[cfg(feature = "redis")]
async fn connect_redis(url: &str) -> Result<Arc<dyn KeyValueStore>, AppError> {
    use crate::cache::RedisStore;

    let store = RedisStore::connect(url)
        .await
        .map_err(|source| AppError::Connect {
            backend: BackendKind::Redis,
            source,
        })?;
    info!("Connected to Redis cache backend");
    Ok(Arc::new(store))
}

#[cfg(not(feature = "redis"))]
async fn connect_redis(_url: &str) -> Result<Arc<dyn KeyValueStore>, AppError> {
    Err(AppError::BackendUnavailable(BackendKind::Redis))
}

/// A connected cache-aside application.
///
/// # Example
///
/// ```ignore
/// use cacheaside::app::CacheAsideApp;
/// use cacheaside::config::ConfigFile;
///
/// let app = CacheAsideApp::start(ConfigFile::load()?).await?;
/// let users = app.cached(user_repo, |u: &User| u.id)?;
/// let orders = app.cached_as(order_repo, |o: &Order| o.id, "order")?;
/// ```
pub struct CacheAsideApp {
    config: ConfigFile,
    store: Arc<dyn KeyValueStore>,
}

impl CacheAsideApp {
    /// Connect the configured backend.
    pub async fn start(config: ConfigFile) -> Result<Self, AppError> {
        let store = connect_store(&config.cache).await?;
        info!(
            backend = %config.cache.backend,
            prefix = %config.cache.prefix,
            expiration = %format_duration(config.cache.expiration),
            write_back = %config.cache.write_back,
            "Cache-aside layer ready"
        );
        Ok(Self { config, store })
    }

    /// Use an already connected backend.
    pub fn with_store(config: ConfigFile, store: Arc<dyn KeyValueStore>) -> Self {
        Self { config, store }
    }

    /// Wrap a repository using the configured prefix, expiration and
    /// write-back policy.
    pub fn cached<T, R>(&self, repo: R, id: IdFn<T>) -> Result<CachedRepository<T, R>, AppError>
    where
        R: Repository<T>,
        JsonCodec: Codec<T>,
    {
        let prefix = self.config.cache.prefix.clone();
        self.cached_as(repo, id, prefix)
    }

    /// Like [`cached`](Self::cached), with an explicit key prefix for a
    /// second entity type sharing the backend.
    pub fn cached_as<T, R>(
        &self,
        repo: R,
        id: IdFn<T>,
        prefix: impl Into<String>,
    ) -> Result<CachedRepository<T, R>, AppError>
    where
        R: Repository<T>,
        JsonCodec: Codec<T>,
    {
        let cached = CachedRepository::builder(repo, id, prefix)
            .expiration(self.config.cache.expiration)
            .write_back(self.config.cache.write_back)
            .build(Arc::clone(&self.store))?;
        Ok(cached)
    }

    /// The shared backend.
    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    /// The configuration the app was started with.
    pub fn config(&self) -> &ConfigFile {
        &self.config
    }
}
