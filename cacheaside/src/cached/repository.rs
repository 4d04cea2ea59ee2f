//! Cache-aside repository.

use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::cache::{BatchLookup, Codec, EntityCacheClient, JsonCodec, KeySpace, KeyValueStore};
use crate::error::{CacheError, CacheResult};
use crate::repository::Repository;

use super::policy::WriteBackPolicy;

/// Identity extractor: the stable id of an entity.
pub type IdFn<T> = fn(&T) -> i64;

/// Default expiration of cached entities.
pub const DEFAULT_EXPIRATION: Duration = Duration::from_secs(600);

/// Read-through cache in front of a [`Repository`].
///
/// Lookups consult the cache first and only reach the repository for ids the
/// cache does not hold; whatever the repository returns is written back with
/// the configured expiration. Absent entities are never cached.
///
/// The struct holds only immutable configuration, so one instance can serve
/// concurrent callers (wrap it in an `Arc`). Concurrent misses on the same id
/// each reach the repository.
pub struct CachedRepository<T, R, C = JsonCodec> {
    repo: R,
    cache: EntityCacheClient<T, C>,
    keys: KeySpace,
    id: IdFn<T>,
    expiration: Duration,
    write_back: WriteBackPolicy,
}

impl<T, R> CachedRepository<T, R, JsonCodec>
where
    R: Repository<T>,
    JsonCodec: Codec<T>,
{
    /// Create a cache-aside repository with the JSON codec and fail-closed
    /// write-back.
    ///
    /// # Arguments
    ///
    /// * `repo` - The authoritative source
    /// * `id` - Identity extractor
    /// * `prefix` - Key prefix, unique per entity type
    /// * `store` - The key-value backend
    /// * `expiration` - TTL of cached entries, `Duration::ZERO` for none
    pub fn new(
        repo: R,
        id: IdFn<T>,
        prefix: impl Into<String>,
        store: Arc<dyn KeyValueStore>,
        expiration: Duration,
    ) -> CacheResult<Self> {
        Self::builder(repo, id, prefix)
            .expiration(expiration)
            .build(store)
    }

    /// Start building a cache-aside repository.
    pub fn builder(
        repo: R,
        id: IdFn<T>,
        prefix: impl Into<String>,
    ) -> CachedRepositoryBuilder<T, R, JsonCodec> {
        CachedRepositoryBuilder {
            repo,
            id,
            prefix: prefix.into(),
            expiration: DEFAULT_EXPIRATION,
            write_back: WriteBackPolicy::default(),
            codec: JsonCodec,
            _entity: PhantomData,
        }
    }
}

impl<T, R, C> CachedRepository<T, R, C>
where
    R: Repository<T>,
    C: Codec<T>,
{
    /// Find one entity by id.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(entity))` from the cache, or from the repository after
    ///   writing it back
    /// - `Ok(None)` if neither holds the entity
    /// - `Err(_)` on a cache or repository failure, or a failed write-back
    ///   under [`WriteBackPolicy::FailClosed`]
    pub async fn find_one(&self, id: i64) -> CacheResult<Option<T>> {
        let key = self.keys.key(id);

        if let Some(entity) = self.cache.find_one(&key).await? {
            debug!(key = %key, "Cache hit");
            return Ok(Some(entity));
        }

        let fetched = self
            .repo
            .find_one(id)
            .await
            .map_err(CacheError::repository)?;
        let Some(entity) = fetched else {
            debug!(key = %key, "Cache miss, not in repository");
            return Ok(None);
        };

        debug!(key = %key, "Cache miss, filled from repository");
        let written = self.cache.set_one(&key, &entity, self.expiration).await;
        self.write_back.settle(written)?;
        Ok(Some(entity))
    }

    /// Find the entities that exist among `ids`.
    ///
    /// Cached entities come first, followed by those fetched from the
    /// repository, so the result is not in `ids` order. Ids found nowhere
    /// are simply absent from the result.
    pub async fn find_many(&self, ids: &[i64]) -> CacheResult<Vec<T>> {
        let keys = self.keys.keys(ids);
        let BatchLookup { mut found, missing } = self.cache.find_many(&keys).await?;
        if missing.is_empty() {
            return Ok(found);
        }

        let missing_ids = missing
            .iter()
            .map(|key| self.keys.id_from_key(key))
            .collect::<Result<Vec<_>, _>>()?;

        let fetched = self
            .repo
            .find_many(&missing_ids)
            .await
            .map_err(CacheError::repository)?;

        debug!(
            prefix = self.keys.prefix(),
            requested = ids.len(),
            hits = found.len(),
            misses = missing_ids.len(),
            fetched = fetched.len(),
            "Cache-aside batch lookup"
        );
        if fetched.is_empty() {
            return Ok(found);
        }

        // Keys come from the entities themselves; the repository result need
        // not line up with missing_ids.
        let fetched_keys: Vec<String> = fetched
            .iter()
            .map(|entity| self.keys.key((self.id)(entity)))
            .collect();
        let written = self
            .cache
            .set_many(&fetched_keys, &fetched, self.expiration)
            .await;
        self.write_back.settle(written)?;

        found.extend(fetched);
        Ok(found)
    }

    /// The key prefix.
    pub fn prefix(&self) -> &str {
        self.keys.prefix()
    }

    /// TTL of cached entries.
    pub fn expiration(&self) -> Duration {
        self.expiration
    }

    /// Write-back failure policy.
    pub fn write_back(&self) -> WriteBackPolicy {
        self.write_back
    }

    /// The typed cache client.
    pub fn cache(&self) -> &EntityCacheClient<T, C> {
        &self.cache
    }
}

/// Builder for [`CachedRepository`].
pub struct CachedRepositoryBuilder<T, R, C = JsonCodec> {
    repo: R,
    id: IdFn<T>,
    prefix: String,
    expiration: Duration,
    write_back: WriteBackPolicy,
    codec: C,
    _entity: PhantomData<fn() -> T>,
}

impl<T, R, C> CachedRepositoryBuilder<T, R, C>
where
    R: Repository<T>,
    C: Codec<T>,
{
    /// Set the TTL of cached entries (`Duration::ZERO` for none).
    pub fn expiration(mut self, expiration: Duration) -> Self {
        self.expiration = expiration;
        self
    }

    /// Set the write-back failure policy.
    pub fn write_back(mut self, policy: WriteBackPolicy) -> Self {
        self.write_back = policy;
        self
    }

    /// Use a different codec.
    pub fn codec<C2>(self, codec: C2) -> CachedRepositoryBuilder<T, R, C2>
    where
        C2: Codec<T>,
    {
        CachedRepositoryBuilder {
            repo: self.repo,
            id: self.id,
            prefix: self.prefix,
            expiration: self.expiration,
            write_back: self.write_back,
            codec,
            _entity: PhantomData,
        }
    }

    /// Build the repository on top of a key-value backend.
    ///
    /// Fails if the prefix is empty.
    pub fn build(self, store: Arc<dyn KeyValueStore>) -> CacheResult<CachedRepository<T, R, C>> {
        let keys = KeySpace::new(self.prefix)?;
        Ok(CachedRepository {
            repo: self.repo,
            cache: EntityCacheClient::with_codec(store, self.codec),
            keys,
            id: self.id,
            expiration: self.expiration,
            write_back: self.write_back,
        })
    }
}
