use crate::core::cache::KeyValueCollection;
use anyhow::{Context, Result};
use async_trait::async_trait;
use fjall::{Keyspace, PartitionHandle, PersistMode};
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime};
use tracing::debug;

#[derive(Serialize, Deserialize)]
struct CacheEntry {
    value: Vec<u8>,
    expires_at: Option<SystemTime>,
}

impl CacheEntry {
    fn is_expired(&self) -> bool {
        self.expires_at
            .is_some_and(|expires_at| SystemTime::now() > expires_at)
    }
}

/// Collection stored in a fjall partition. Storage errors are logged and
/// treated as misses; callers always have a fallback for a missing value.
pub struct DiskCollection {
    keyspace: Keyspace,
    partition: PartitionHandle,
}

impl DiskCollection {
    pub fn new(keyspace: Keyspace, partition: PartitionHandle) -> Self {
        Self {
            keyspace,
            partition,
        }
    }

    /// Pushes journal writes to OS buffers so they survive process exit.
    fn flush(&self) -> Result<()> {
        self.keyspace.persist(PersistMode::Buffer)?;
        Ok(())
    }

    fn read(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let Some(raw) = self.partition.get(key)? else {
            debug!("Cache MISS for key: {:?}", String::from_utf8_lossy(key));
            return Ok(None);
        };
        let entry: CacheEntry = serde_json::from_slice(&raw)?;
        if entry.is_expired() {
            debug!("Cache entry expired for key: {:?}", String::from_utf8_lossy(key));
            self.partition.remove(key)?;
            return Ok(None);
        }
        debug!("Cache HIT for key: {:?}", String::from_utf8_lossy(key));
        Ok(Some(entry.value))
    }

    fn write(&self, key: &[u8], value: &[u8], ttl: Option<Duration>) -> Result<()> {
        let entry = CacheEntry {
            value: value.to_vec(),
            expires_at: ttl.map(|d| SystemTime::now() + d),
        };
        self.partition.insert(key, serde_json::to_vec(&entry)?)?;
        self.flush()?;
        debug!("Cache PUT for key: {:?}", String::from_utf8_lossy(key));
        Ok(())
    }

    fn delete(&self, key: &[u8]) -> Result<bool> {
        let existed = self.partition.contains_key(key)?;
        self.partition.remove(key)?;
        self.flush()?;
        Ok(existed)
    }

    fn scan(&self) -> Result<Vec<(Vec<u8>, Vec<u8>)>> {
        let mut live = Vec::new();
        for item in self.partition.iter() {
            let (key, raw) = item?;
            let entry: CacheEntry = serde_json::from_slice(&raw)?;
            if !entry.is_expired() {
                live.push((key.to_vec(), entry.value));
            }
        }
        Ok(live)
    }

    fn wipe(&self) -> Result<()> {
        let keys = self
            .partition
            .iter()
            .map(|item| item.map(|(key, _)| key))
            .collect::<Result<Vec<_>, _>>()?;
        for key in keys {
            self.partition.remove(key)?;
        }
        self.flush()
    }
}

#[async_trait]
impl KeyValueCollection for DiskCollection {
    async fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        self.read(key).unwrap_or_else(|e| {
            debug!("DiskCollection get error: {}", e);
            None
        })
    }

    async fn try_put(&self, key: &[u8], value: &[u8], ttl: Option<Duration>) -> Result<()> {
        self.write(key, value, ttl)
            .with_context(|| format!("Failed to write {:?}", String::from_utf8_lossy(key)))
    }

    async fn remove(&self, key: &[u8]) -> bool {
        self.delete(key).unwrap_or_else(|e| {
            debug!("DiskCollection remove error: {}", e);
            false
        })
    }

    async fn clear(&self) {
        if let Err(e) = self.wipe() {
            debug!("DiskCollection clear error: {}", e);
        }
    }

    async fn entries(&self) -> Vec<(Vec<u8>, Vec<u8>)> {
        self.scan().unwrap_or_else(|e| {
            debug!("DiskCollection scan error: {}", e);
            Vec::new()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fjall::PartitionCreateOptions;
    use tempfile::tempdir;
    use tokio::time::sleep;

    fn open(path: &std::path::Path) -> DiskCollection {
        let keyspace = fjall::Config::new(path).open().unwrap();
        let partition = keyspace
            .open_partition("test", PartitionCreateOptions::default())
            .unwrap();
        DiskCollection::new(keyspace, partition)
    }

    #[tokio::test]
    async fn test_disk_collection_get_put() {
        let dir = tempdir().unwrap();
        let collection = open(dir.path());

        assert!(collection.get(b"key1").await.is_none());
        collection.put(b"key1", b"123", None).await;
        assert_eq!(collection.get(b"key1").await, Some(b"123".to_vec()));
        assert!(collection.get(b"key2").await.is_none());

        collection.try_put(b"key2", b"456", None).await.unwrap();
        assert_eq!(collection.get(b"key2").await, Some(b"456".to_vec()));
    }

    #[tokio::test]
    async fn test_disk_collection_ttl_expiration() {
        let dir = tempdir().unwrap();
        let collection = open(dir.path());

        collection
            .put(b"key1", b"123", Some(Duration::from_millis(10)))
            .await;
        assert_eq!(collection.get(b"key1").await, Some(b"123".to_vec()));

        sleep(Duration::from_millis(20)).await;
        assert!(collection.get(b"key1").await.is_none());
    }

    #[tokio::test]
    async fn test_disk_collection_remove_clear_entries() {
        let dir = tempdir().unwrap();
        let collection = open(dir.path());

        collection.put(b"002", b"b", None).await;
        collection.put(b"001", b"a", None).await;
        collection.put(b"003", b"c", None).await;

        assert!(collection.remove(b"003").await);
        assert!(!collection.remove(b"003").await);

        let entries = collection.entries().await;
        assert_eq!(
            entries,
            vec![
                (b"001".to_vec(), b"a".to_vec()),
                (b"002".to_vec(), b"b".to_vec())
            ]
        );

        collection.clear().await;
        assert!(collection.entries().await.is_empty());
    }
}
