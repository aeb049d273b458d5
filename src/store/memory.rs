use crate::core::cache::KeyValueCollection;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

struct CacheValue {
    value: Vec<u8>,
    expires_at: Option<Instant>,
}

impl CacheValue {
    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|expiry| expiry < Instant::now())
    }
}

/// In-memory collection, used for tests and when no data directory is usable.
pub struct MemoryCollection {
    inner: Mutex<BTreeMap<Vec<u8>, CacheValue>>,
}

impl MemoryCollection {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(BTreeMap::new()),
        }
    }
}

impl Default for MemoryCollection {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyValueCollection for MemoryCollection {
    async fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        let mut cache = self.inner.lock().await;
        if let Some(entry) = cache.get(key) {
            if entry.is_expired() {
                debug!("Cache entry expired for key: {:?}", String::from_utf8_lossy(key));
                cache.remove(key);
                return None;
            }
            debug!("Cache HIT for key: {:?}", String::from_utf8_lossy(key));
            return Some(entry.value.clone());
        }
        debug!("Cache MISS for key: {:?}", String::from_utf8_lossy(key));
        None
    }

    async fn try_put(&self, key: &[u8], value: &[u8], ttl: Option<Duration>) -> Result<()> {
        let expires_at = ttl.map(|duration| Instant::now() + duration);
        let mut cache = self.inner.lock().await;
        debug!("Cache PUT for key: {:?}", String::from_utf8_lossy(key));
        cache.insert(
            key.to_vec(),
            CacheValue {
                value: value.to_vec(),
                expires_at,
            },
        );
        Ok(())
    }

    async fn remove(&self, key: &[u8]) -> bool {
        let mut cache = self.inner.lock().await;
        debug!("Cache REMOVE for key: {:?}", String::from_utf8_lossy(key));
        cache.remove(key).is_some()
    }

    async fn clear(&self) {
        let mut cache = self.inner.lock().await;
        cache.clear();
        debug!("Cache CLEAR");
    }

    async fn entries(&self) -> Vec<(Vec<u8>, Vec<u8>)> {
        let mut cache = self.inner.lock().await;
        cache.retain(|_, entry| !entry.is_expired());
        cache
            .iter()
            .map(|(key, entry)| (key.clone(), entry.value.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::sleep;

    #[tokio::test]
    async fn test_collection_get_put() {
        let collection = MemoryCollection::new();

        assert!(collection.get(b"key1").await.is_none());

        collection.put(b"key1", b"123", None).await;
        assert_eq!(collection.get(b"key1").await, Some(b"123".to_vec()));
        assert!(collection.get(b"key2").await.is_none());
    }

    #[tokio::test]
    async fn test_collection_ttl_expiration() {
        let collection = MemoryCollection::new();

        collection
            .put(b"key1", b"123", Some(Duration::from_millis(10)))
            .await;
        assert_eq!(collection.get(b"key1").await, Some(b"123".to_vec()));

        sleep(Duration::from_millis(20)).await;
        assert!(collection.get(b"key1").await.is_none());
        assert!(collection.entries().await.is_empty());
    }

    #[tokio::test]
    async fn test_collection_remove_and_clear() {
        let collection = MemoryCollection::new();

        collection.put(b"key1", b"1", None).await;
        collection.put(b"key2", b"2", None).await;

        assert!(collection.remove(b"key1").await);
        assert!(!collection.remove(b"key1").await);
        assert!(collection.get(b"key1").await.is_none());

        collection.clear().await;
        assert!(collection.get(b"key2").await.is_none());
    }

    #[tokio::test]
    async fn test_entries_in_key_order() {
        let collection = MemoryCollection::new();

        collection.put(b"b", b"2", None).await;
        collection.put(b"a", b"1", None).await;
        collection.put(b"c", b"3", None).await;

        let keys: Vec<Vec<u8>> = collection.entries().await.into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec![b"a".to_vec(), b"b".to_vec(), b"c".to_vec()]);
    }
}
