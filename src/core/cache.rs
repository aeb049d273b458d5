//! Storage abstractions shared by the rate cache and the saved record lists.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// A named bag of byte keys and values. Iteration order follows key order, so
/// callers that need insertion order use sortable keys.
#[async_trait]
pub trait KeyValueCollection: Send + Sync {
    async fn get(&self, key: &[u8]) -> Option<Vec<u8>>;

    /// Stores `value`; entries with a `ttl` stop being returned once it lapses.
    /// Fails when the backing storage rejects the write.
    async fn try_put(&self, key: &[u8], value: &[u8], ttl: Option<Duration>) -> Result<()>;

    /// Best-effort [`try_put`](Self::try_put) for cached data that can be
    /// fetched again. Failures are only logged.
    async fn put(&self, key: &[u8], value: &[u8], ttl: Option<Duration>) {
        if let Err(e) = self.try_put(key, value, ttl).await {
            debug!("Cache PUT failed for key {:?}: {:#}", String::from_utf8_lossy(key), e);
        }
    }

    async fn remove(&self, key: &[u8]) -> bool;

    async fn clear(&self);

    /// All live entries in key order.
    async fn entries(&self) -> Vec<(Vec<u8>, Vec<u8>)>;
}

pub trait Store: Send + Sync {
    /// Returns the collection called `name`. Persistent collections are backed
    /// by disk; `None` means the backing storage could not be opened.
    fn get_collection(
        &self,
        name: &str,
        persist: bool,
        create_if_missing: bool,
    ) -> Option<Arc<dyn KeyValueCollection>>;

    fn remove_collection(&self, name: &str) -> bool;
}
