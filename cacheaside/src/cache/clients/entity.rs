//! Typed entity cache client.
//!
//! This client wraps a generic `KeyValueStore` with:
//! - Value translation: `T` ↔ bytes through a [`Codec`]
//! - Batch lookups that split hits from misses
//! - Batch writes that collect per-entry failures
//!
//! Unlike the raw store, decode failures are errors: a corrupt entry surfaces
//! as [`CacheError::Decode`] instead of silently turning into a miss.

use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::cache::codec::{Codec, JsonCodec};
use crate::cache::traits::{expiration_ttl, KeyValueStore};
use crate::error::{CacheError, CacheResult};

/// Result of a batch lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchLookup<T> {
    /// Decoded values of the keys that were present, in input key order.
    pub found: Vec<T>,

    /// Keys that held no value, in input key order.
    pub missing: Vec<String>,
}

impl<T> BatchLookup<T> {
    /// Whether every requested key was present.
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Cache client for entities of type `T`.
pub struct EntityCacheClient<T, C = JsonCodec> {
    /// The underlying key-value store.
    store: Arc<dyn KeyValueStore>,

    /// Codec shared by the read and write paths.
    codec: C,

    _entity: PhantomData<fn() -> T>,
}

impl<T> EntityCacheClient<T, JsonCodec>
where
    JsonCodec: Codec<T>,
{
    /// Create a client using the default JSON codec.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_codec(store, JsonCodec)
    }
}

impl<T, C> EntityCacheClient<T, C>
where
    C: Codec<T>,
{
    /// Create a client with an explicit codec.
    pub fn with_codec(store: Arc<dyn KeyValueStore>, codec: C) -> Self {
        Self {
            store,
            codec,
            _entity: PhantomData,
        }
    }

    /// The underlying store.
    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    /// Look up one entity.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(entity))` on a hit
    /// - `Ok(None)` if the key holds no value
    /// - `Err(_)` on an empty key, a backend failure or a decode failure
    pub async fn find_one(&self, key: &str) -> CacheResult<Option<T>> {
        if key.is_empty() {
            return Err(CacheError::EmptyKey);
        }
        match self.store.get(key).await? {
            Some(bytes) => self.decode(key, &bytes).map(Some),
            None => Ok(None),
        }
    }

    /// Look up several entities in one round-trip.
    ///
    /// Every key either contributes a decoded value to `found` or appears in
    /// `missing`. An empty key list does not touch the backend.
    pub async fn find_many(&self, keys: &[String]) -> CacheResult<BatchLookup<T>> {
        if keys.is_empty() {
            return Ok(BatchLookup {
                found: Vec::new(),
                missing: Vec::new(),
            });
        }
        if keys.iter().any(|key| key.is_empty()) {
            return Err(CacheError::EmptyKey);
        }

        let values = self.store.get_many(keys).await?;

        let mut found = Vec::with_capacity(keys.len());
        let mut missing = Vec::new();
        for (key, value) in keys.iter().zip(values) {
            match value {
                Some(bytes) => found.push(self.decode(key, &bytes)?),
                None => missing.push(key.clone()),
            }
        }
        // A short reply from the backend leaves the tail unresolved
        missing.extend(keys.iter().skip(found.len() + missing.len()).cloned());

        debug!(
            requested = keys.len(),
            hits = found.len(),
            misses = missing.len(),
            "Entity cache batch lookup"
        );
        Ok(BatchLookup { found, missing })
    }

    /// Store one entity.
    ///
    /// `Duration::ZERO` stores the entry without expiration.
    pub async fn set_one(&self, key: &str, entity: &T, expiration: Duration) -> CacheResult<()> {
        let bytes = self.encode(key, entity)?;
        self.store.set(key, bytes, expiration_ttl(expiration)).await?;
        Ok(())
    }

    /// Store several entities with the same expiration.
    ///
    /// `keys[i]` is the key of `entities[i]`. All writes are issued in one
    /// batch; writes that succeed stay committed even when others fail, and
    /// the failures come back as [`CacheError::PartialWrite`].
    pub async fn set_many(
        &self,
        keys: &[String],
        entities: &[T],
        expiration: Duration,
    ) -> CacheResult<()> {
        if keys.len() != entities.len() {
            return Err(CacheError::LengthMismatch {
                keys: keys.len(),
                entities: entities.len(),
            });
        }
        if keys.is_empty() {
            return Ok(());
        }

        let mut entries = Vec::with_capacity(keys.len());
        for (key, entity) in keys.iter().zip(entities) {
            entries.push((key.clone(), self.encode(key, entity)?));
        }

        let outcomes = self
            .store
            .set_many(entries, expiration_ttl(expiration))
            .await?;

        let errors: Vec<_> = keys
            .iter()
            .zip(outcomes)
            .filter_map(|(key, outcome)| outcome.err().map(|err| (key.clone(), err)))
            .collect();

        if errors.is_empty() {
            return Ok(());
        }
        Err(CacheError::PartialWrite {
            failed: errors.len(),
            total: keys.len(),
            errors,
        })
    }

    fn decode(&self, key: &str, bytes: &[u8]) -> CacheResult<T> {
        self.codec.decode(bytes).map_err(|source| CacheError::Decode {
            key: key.to_string(),
            source,
        })
    }

    fn encode(&self, key: &str, entity: &T) -> CacheResult<Vec<u8>> {
        self.codec.encode(entity).map_err(|source| CacheError::Encode {
            key: key.to_string(),
            source,
        })
    }
}
