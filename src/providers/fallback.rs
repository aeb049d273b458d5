use crate::core::{CurrencyRateProvider, KeyValueCollection, RateSource, RateTable};
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, warn};

/// Serves live rates when the provider answers, otherwise the last stored
/// table, otherwise the bundled table.
pub struct FallbackRateProvider {
    inner: Arc<dyn CurrencyRateProvider>,
    cache: Option<Arc<dyn KeyValueCollection>>,
    bundled: Option<RateTable>,
}

impl FallbackRateProvider {
    pub fn new(
        inner: Arc<dyn CurrencyRateProvider>,
        cache: Option<Arc<dyn KeyValueCollection>>,
        bundled: Option<RateTable>,
    ) -> Self {
        Self {
            inner,
            cache,
            bundled,
        }
    }

    pub async fn fetch(&self, base: &str) -> Result<(RateTable, RateSource)> {
        let key = base.trim().to_uppercase();

        let error = match self.inner.latest_rates(&key).await {
            Ok(table) => {
                self.store(&key, &table).await;
                return Ok((table, RateSource::Live));
            }
            Err(e) => e,
        };
        warn!("Live rate fetch for {} failed: {:#}", key, error);

        if let Some(table) = self.cached(&key).await {
            debug!("Serving cached rates for {} from {}", key, table.fetched_at);
            return Ok((table, RateSource::Cached));
        }
        if let Some(table) = &self.bundled {
            debug!("Serving bundled rates quoted against {}", table.base);
            return Ok((table.clone(), RateSource::Bundled));
        }
        Err(error.context(format!("No cached or bundled rates available for {key}")))
    }

    async fn store(&self, key: &str, table: &RateTable) {
        let Some(cache) = &self.cache else {
            return;
        };
        match serde_json::to_vec(table) {
            Ok(bytes) => cache.put(key.as_bytes(), &bytes, None).await,
            Err(e) => warn!("Failed to serialize rates for {}: {}", key, e),
        }
    }

    async fn cached(&self, key: &str) -> Option<RateTable> {
        let bytes = self.cache.as_ref()?.get(key.as_bytes()).await?;
        match serde_json::from_slice(&bytes) {
            Ok(table) => Some(table),
            Err(e) => {
                warn!("Ignoring unreadable cached rates for {}: {}", key, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryCollection;
    use anyhow::bail;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct MockRateProvider {
        online: AtomicBool,
        inr: f64,
    }

    impl MockRateProvider {
        fn new(online: bool, inr: f64) -> Arc<Self> {
            Arc::new(Self {
                online: AtomicBool::new(online),
                inr,
            })
        }
    }

    #[async_trait]
    impl CurrencyRateProvider for MockRateProvider {
        async fn latest_rates(&self, base: &str) -> Result<RateTable> {
            if !self.online.load(Ordering::SeqCst) {
                bail!("network unreachable");
            }
            let rates = HashMap::from([("INR".to_string(), self.inr)]);
            Ok(RateTable::new(base, rates, Utc::now()))
        }
    }

    fn bundled() -> RateTable {
        let rates = HashMap::from([("USD".to_string(), 0.012)]);
        RateTable::new("INR", rates, Utc::now())
    }

    #[tokio::test]
    async fn test_live_rates_are_cached() {
        let provider = MockRateProvider::new(true, 83.0);
        let cache: Arc<dyn KeyValueCollection> = Arc::new(MemoryCollection::new());
        let rates = FallbackRateProvider::new(provider.clone(), Some(cache.clone()), None);

        let (table, source) = rates.fetch("usd").await.unwrap();
        assert_eq!(source, RateSource::Live);
        assert_eq!(table.rate("USD", "INR").unwrap(), 83.0);
        assert!(cache.get(b"USD").await.is_some());

        provider.online.store(false, Ordering::SeqCst);
        let (table, source) = rates.fetch("USD").await.unwrap();
        assert_eq!(source, RateSource::Cached);
        assert!(source.is_offline());
        assert_eq!(table.rate("USD", "INR").unwrap(), 83.0);
    }

    #[tokio::test]
    async fn test_latest_successful_fetch_wins() {
        let cache: Arc<dyn KeyValueCollection> = Arc::new(MemoryCollection::new());
        let first = FallbackRateProvider::new(
            MockRateProvider::new(true, 82.0),
            Some(cache.clone()),
            None,
        );
        first.fetch("USD").await.unwrap();
        let second = FallbackRateProvider::new(
            MockRateProvider::new(true, 84.0),
            Some(cache.clone()),
            None,
        );
        second.fetch("USD").await.unwrap();

        let offline =
            FallbackRateProvider::new(MockRateProvider::new(false, 0.0), Some(cache), None);
        let (table, _) = offline.fetch("USD").await.unwrap();
        assert_eq!(table.rate("USD", "INR").unwrap(), 84.0);
    }

    #[tokio::test]
    async fn test_bundled_rates_when_nothing_cached() {
        let rates = FallbackRateProvider::new(
            MockRateProvider::new(false, 0.0),
            Some(Arc::new(MemoryCollection::new())),
            Some(bundled()),
        );
        let (table, source) = rates.fetch("USD").await.unwrap();
        assert_eq!(source, RateSource::Bundled);
        assert_eq!(table.base, "INR");
        assert!((table.rate("USD", "INR").unwrap() - 1.0 / 0.012).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_error_when_no_fallback() {
        let rates = FallbackRateProvider::new(MockRateProvider::new(false, 0.0), None, None);
        let err = rates.fetch("USD").await.unwrap_err();
        assert!(format!("{err:#}").contains("network unreachable"));
    }
}
