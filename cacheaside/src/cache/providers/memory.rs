//! In-memory key-value backend using moka.
//!
//! This provider wraps `moka::future::Cache` to give the cache-aside layer an
//! in-process backend with the same contract as Redis: string keys, byte
//! values, and a TTL chosen per write.
//!
//! # Per-entry expiration
//!
//! Each stored value carries the TTL it was written with. A moka `Expiry`
//! policy reads that TTL on create and on update, so rewriting a key resets
//! its lifetime the way `SET key value PX ttl` does. Entries written without
//! a TTL never expire; they only leave through size-based eviction.

use std::time::{Duration, Instant};

use moka::future::Cache as MokaCache;
use moka::Expiry;

use crate::cache::traits::{BoxFuture, KeyValueStore, StoreError, WriteOutcomes};

/// A stored value together with the TTL it was written with.
#[derive(Clone)]
struct StoredValue {
    data: Vec<u8>,
    ttl: Option<Duration>,
}

/// Expiry policy that honours the TTL stored alongside each value.
struct EntryExpiry;

impl Expiry<String, StoredValue> for EntryExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &StoredValue,
        _created_at: Instant,
    ) -> Option<Duration> {
        value.ttl
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &StoredValue,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        value.ttl
    }
}

/// In-memory key-value backend using moka.
///
/// Lock-free reads, concurrent writes, and size-bounded LRU eviction. Values
/// larger than the whole capacity are rejected with
/// [`StoreError::ValueTooLarge`] instead of being inserted and immediately
/// evicted.
pub struct MemoryStore {
    /// The underlying moka cache.
    cache: MokaCache<String, StoredValue>,

    /// Maximum size in bytes.
    max_size_bytes: u64,
}

impl MemoryStore {
    /// Create a new memory store.
    ///
    /// # Arguments
    ///
    /// * `max_size_bytes` - Maximum total size of keys and values in bytes
    pub fn new(max_size_bytes: u64) -> Self {
        let cache = MokaCache::builder()
            // Weight each entry by its key and data size
            .weigher(|key: &String, value: &StoredValue| -> u32 {
                // moka uses u32 for weights, cap at u32::MAX for very large entries
                (key.len() + value.data.len()).min(u32::MAX as usize) as u32
            })
            .max_capacity(max_size_bytes)
            .expire_after(EntryExpiry)
            .build();

        Self {
            cache,
            max_size_bytes,
        }
    }

    /// Maximum configured size in bytes.
    pub fn max_size_bytes(&self) -> u64 {
        self.max_size_bytes
    }

    /// Current number of entries.
    ///
    /// moka is eventually consistent; call [`MemoryStore::sync`] first for
    /// an exact count.
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }

    /// Run pending maintenance (expiry and eviction).
    pub async fn sync(&self) {
        self.cache.run_pending_tasks().await;
    }

    fn check_size(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        let size = (key.len() + value.len()) as u64;
        if size > self.max_size_bytes {
            return Err(StoreError::ValueTooLarge {
                size,
                max: self.max_size_bytes,
            });
        }
        Ok(())
    }

    async fn insert(&self, key: String, data: Vec<u8>, ttl: Option<Duration>) -> Result<(), StoreError> {
        self.check_size(&key, &data)?;
        self.cache.insert(key, StoredValue { data, ttl }).await;
        Ok(())
    }
}

impl KeyValueStore for MemoryStore {
    fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Option<Vec<u8>>, StoreError>> {
        Box::pin(async move { Ok(self.cache.get(key).await.map(|stored| stored.data)) })
    }

    fn get_many<'a>(
        &'a self,
        keys: &'a [String],
    ) -> BoxFuture<'a, Result<Vec<Option<Vec<u8>>>, StoreError>> {
        Box::pin(async move {
            let mut values = Vec::with_capacity(keys.len());
            for key in keys {
                values.push(self.cache.get(key.as_str()).await.map(|stored| stored.data));
            }
            Ok(values)
        })
    }

    fn set<'a>(
        &'a self,
        key: &'a str,
        value: Vec<u8>,
        ttl: Option<Duration>,
    ) -> BoxFuture<'a, Result<(), StoreError>> {
        Box::pin(async move { self.insert(key.to_string(), value, ttl).await })
    }

    fn set_many(
        &self,
        entries: Vec<(String, Vec<u8>)>,
        ttl: Option<Duration>,
    ) -> BoxFuture<'_, Result<WriteOutcomes, StoreError>> {
        Box::pin(async move {
            let mut outcomes = Vec::with_capacity(entries.len());
            for (key, data) in entries {
                outcomes.push(self.insert(key, data, ttl).await);
            }
            Ok(outcomes)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_new() {
        let store = MemoryStore::new(1_000_000);
        assert_eq!(store.max_size_bytes(), 1_000_000);
        assert_eq!(store.entry_count(), 0);
    }

    #[tokio::test]
    async fn test_memory_store_set_and_get() {
        let store = MemoryStore::new(1_000_000);

        store.set("user:1", vec![1, 2, 3], None).await.unwrap();

        let value = store.get("user:1").await.unwrap();
        assert_eq!(value, Some(vec![1, 2, 3]));
    }

    #[tokio::test]
    async fn test_memory_store_get_missing_is_none() {
        let store = MemoryStore::new(1_000_000);

        let value = store.get("user:404").await.unwrap();
        assert!(value.is_none());
    }

    #[tokio::test]
    async fn test_memory_store_get_many_preserves_slots() {
        let store = MemoryStore::new(1_000_000);
        store.set("user:1", vec![1], None).await.unwrap();
        store.set("user:3", vec![3], None).await.unwrap();

        let keys = vec![
            "user:1".to_string(),
            "user:2".to_string(),
            "user:3".to_string(),
        ];
        let values = store.get_many(&keys).await.unwrap();

        assert_eq!(values, vec![Some(vec![1]), None, Some(vec![3])]);
    }

    #[tokio::test]
    async fn test_memory_store_replace_existing() {
        let store = MemoryStore::new(1_000_000);

        store.set("user:1", vec![1, 2, 3], None).await.unwrap();
        store.set("user:1", vec![4, 5, 6, 7], None).await.unwrap();
        store.sync().await;

        let value = store.get("user:1").await.unwrap();
        assert_eq!(value, Some(vec![4, 5, 6, 7]));
        assert_eq!(store.entry_count(), 1);
    }

    #[tokio::test]
    async fn test_memory_store_entry_ttl_expires() {
        let store = MemoryStore::new(1_000_000);

        store
            .set("user:1", vec![1], Some(Duration::from_millis(50)))
            .await
            .unwrap();
        store.set("user:2", vec![2], None).await.unwrap();

        assert!(store.get("user:1").await.unwrap().is_some());

        tokio::time::sleep(Duration::from_millis(120)).await;
        store.sync().await;

        assert!(store.get("user:1").await.unwrap().is_none());
        assert_eq!(store.get("user:2").await.unwrap(), Some(vec![2]));
    }

    #[tokio::test]
    async fn test_memory_store_rewrite_resets_ttl() {
        let store = MemoryStore::new(1_000_000);

        store
            .set("user:1", vec![1], Some(Duration::from_millis(50)))
            .await
            .unwrap();
        store.set("user:1", vec![1], None).await.unwrap();

        tokio::time::sleep(Duration::from_millis(120)).await;
        store.sync().await;

        assert_eq!(store.get("user:1").await.unwrap(), Some(vec![1]));
    }

    #[tokio::test]
    async fn test_memory_store_rejects_oversized_value() {
        let store = MemoryStore::new(16);

        let result = store.set("user:1", vec![0u8; 64], None).await;

        assert!(matches!(result, Err(StoreError::ValueTooLarge { .. })));
        assert!(store.get("user:1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_memory_store_set_many_collects_outcomes() {
        let store = MemoryStore::new(64);

        let outcomes = store
            .set_many(
                vec![
                    ("user:1".to_string(), vec![1]),
                    ("user:2".to_string(), vec![0u8; 128]),
                    ("user:3".to_string(), vec![3]),
                ],
                None,
            )
            .await
            .unwrap();

        assert!(outcomes[0].is_ok());
        assert!(outcomes[1].is_err());
        assert!(outcomes[2].is_ok());
        assert_eq!(store.get("user:1").await.unwrap(), Some(vec![1]));
        assert_eq!(store.get("user:3").await.unwrap(), Some(vec![3]));
    }

    #[tokio::test]
    async fn test_memory_store_concurrent_access() {
        use std::sync::Arc;

        let store = Arc::new(MemoryStore::new(10_000_000));
        let mut handles = Vec::new();

        for i in 0..50 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                let key = format!("user:{}", i);
                let data = vec![i as u8; 100];

                store.set(&key, data.clone(), None).await.unwrap();
                let result = store.get(&key).await.unwrap();
                assert_eq!(result, Some(data));
            }));
        }

        for handle in handles {
            handle.await.unwrap();
        }

        store.sync().await;
        assert_eq!(store.entry_count(), 50);
    }
}
