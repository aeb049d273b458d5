use crate::core::cache::KeyValueCollection;
use anyhow::{Context, Result, anyhow};
use chrono::Utc;
use serde::{Serialize, de::DeserializeOwned};
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::debug;

/// A saved record together with the id it is stored under.
#[derive(Debug, Clone, PartialEq)]
pub struct Stored<T> {
    pub id: u64,
    pub record: T,
}

/// Typed, insertion-ordered list of records on top of a collection.
///
/// Ids are derived from the wall clock in microseconds and bumped past the
/// current maximum, so they stay unique and increasing within a list. Keys are
/// the zero-padded id, which keeps key order equal to insertion order.
pub struct RecordList<T> {
    collection: Arc<dyn KeyValueCollection>,
    _marker: PhantomData<T>,
}

fn key_for(id: u64) -> Vec<u8> {
    format!("{id:020}").into_bytes()
}

fn id_from_key(key: &[u8]) -> Result<u64> {
    std::str::from_utf8(key)?
        .parse()
        .map_err(|e| anyhow!("Invalid record key: {e}"))
}

impl<T> RecordList<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(collection: Arc<dyn KeyValueCollection>) -> Self {
        Self {
            collection,
            _marker: PhantomData,
        }
    }

    pub async fn append(&self, record: &T) -> Result<u64> {
        let last = self
            .collection
            .entries()
            .await
            .last()
            .and_then(|(key, _)| id_from_key(key).ok())
            .unwrap_or(0);
        let now = u64::try_from(Utc::now().timestamp_micros()).unwrap_or(0);
        let id = now.max(last + 1);

        let value = serde_json::to_vec(record).context("Failed to serialize record")?;
        self.collection
            .try_put(&key_for(id), &value, None)
            .await
            .context("Failed to save record")?;
        debug!("Appended record {}", id);
        Ok(id)
    }

    pub async fn list(&self) -> Result<Vec<Stored<T>>> {
        self.collection
            .entries()
            .await
            .into_iter()
            .map(|(key, value)| {
                let id = id_from_key(&key)?;
                let record = serde_json::from_slice(&value)
                    .with_context(|| format!("Failed to parse saved record {id}"))?;
                Ok(Stored { id, record })
            })
            .collect()
    }

    pub async fn get(&self, id: u64) -> Result<Option<T>> {
        match self.collection.get(&key_for(id)).await {
            Some(value) => Ok(Some(
                serde_json::from_slice(&value)
                    .with_context(|| format!("Failed to parse saved record {id}"))?,
            )),
            None => Ok(None),
        }
    }

    /// Replaces the record stored under `id`; fails when there is none.
    pub async fn update(&self, id: u64, record: &T) -> Result<()> {
        let key = key_for(id);
        if self.collection.get(&key).await.is_none() {
            return Err(anyhow!("No saved record with id {id}"));
        }
        let value = serde_json::to_vec(record).context("Failed to serialize record")?;
        self.collection
            .try_put(&key, &value, None)
            .await
            .with_context(|| format!("Failed to update record {id}"))
    }

    pub async fn delete(&self, id: u64) -> bool {
        self.collection.remove(&key_for(id)).await
    }

    pub async fn clear(&self) {
        self.collection.clear().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::records::DenominationCount;
    use crate::store::memory::MemoryCollection;
    use std::time::Duration;

    fn list() -> RecordList<DenominationCount> {
        RecordList::new(Arc::new(MemoryCollection::new()))
    }

    /// Serves reads from an inner collection but refuses every write.
    struct ReadOnlyCollection(MemoryCollection);

    #[async_trait::async_trait]
    impl KeyValueCollection for ReadOnlyCollection {
        async fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
            self.0.get(key).await
        }

        async fn try_put(&self, _key: &[u8], _value: &[u8], _ttl: Option<Duration>) -> Result<()> {
            Err(anyhow!("disk is read-only"))
        }

        async fn remove(&self, key: &[u8]) -> bool {
            self.0.remove(key).await
        }

        async fn clear(&self) {
            self.0.clear().await
        }

        async fn entries(&self) -> Vec<(Vec<u8>, Vec<u8>)> {
            self.0.entries().await
        }
    }

    #[tokio::test]
    async fn test_append_and_list_keep_insertion_order() {
        let records = list();
        let first = records
            .append(&DenominationCount {
                value: 500.0,
                quantity: 3,
            })
            .await
            .unwrap();
        let second = records
            .append(&DenominationCount {
                value: 10.0,
                quantity: 7,
            })
            .await
            .unwrap();
        assert!(second > first);

        let saved = records.list().await.unwrap();
        assert_eq!(saved.len(), 2);
        assert_eq!(saved[0].id, first);
        assert_eq!(saved[0].record.value, 500.0);
        assert_eq!(saved[1].record.quantity, 7);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let records = list();
        let id = records
            .append(&DenominationCount {
                value: 100.0,
                quantity: 1,
            })
            .await
            .unwrap();

        records
            .update(
                id,
                &DenominationCount {
                    value: 100.0,
                    quantity: 4,
                },
            )
            .await
            .unwrap();
        assert_eq!(records.get(id).await.unwrap().unwrap().quantity, 4);

        assert!(records.delete(id).await);
        assert!(records.get(id).await.unwrap().is_none());
        assert!(records.update(id, &DenominationCount { value: 1.0, quantity: 1 }).await.is_err());
    }

    #[tokio::test]
    async fn test_clear() {
        let records = list();
        records
            .append(&DenominationCount {
                value: 2.0,
                quantity: 2,
            })
            .await
            .unwrap();
        records.clear().await;
        assert!(records.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_writes_are_reported() {
        let inner = MemoryCollection::new();
        let existing = DenominationCount {
            value: 50.0,
            quantity: 2,
        };
        inner
            .put(&key_for(7), &serde_json::to_vec(&existing).unwrap(), None)
            .await;
        let records: RecordList<DenominationCount> =
            RecordList::new(Arc::new(ReadOnlyCollection(inner)));

        let err = records
            .append(&DenominationCount {
                value: 500.0,
                quantity: 1,
            })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Failed to save record");
        assert_eq!(format!("{err:#}"), "Failed to save record: disk is read-only");

        let err = records
            .update(
                7,
                &DenominationCount {
                    value: 50.0,
                    quantity: 9,
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Failed to update record 7");

        let saved = records.list().await.unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].record, existing);
    }
}
