//! Exchange rate abstractions

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Display;

/// Rates quoted against `base`: one unit of `base` buys `rates[code]` units of
/// `code`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateTable {
    pub base: String,
    pub rates: HashMap<String, f64>,
    pub fetched_at: DateTime<Utc>,
}

impl RateTable {
    pub fn new(base: &str, rates: HashMap<String, f64>, fetched_at: DateTime<Utc>) -> Self {
        let base = base.to_uppercase();
        let mut rates: HashMap<String, f64> = rates
            .into_iter()
            .map(|(code, rate)| (code.to_uppercase(), rate))
            .collect();
        rates.insert(base.clone(), 1.0);
        Self {
            base,
            rates,
            fetched_at,
        }
    }

    fn quote(&self, code: &str) -> Result<f64> {
        let code = code.to_uppercase();
        match self.rates.get(&code) {
            Some(rate) if rate.is_finite() && *rate > 0.0 => Ok(*rate),
            Some(rate) => Err(anyhow!("Invalid rate {rate} for currency: {code}")),
            None => Err(anyhow!("Unknown currency: {code}")),
        }
    }

    /// Cross rate from `from` to `to` through the table base.
    pub fn rate(&self, from: &str, to: &str) -> Result<f64> {
        Ok(self.quote(to)? / self.quote(from)?)
    }

    pub fn currencies(&self) -> Vec<&str> {
        let mut codes: Vec<&str> = self.rates.keys().map(String::as_str).collect();
        codes.sort_unstable();
        codes
    }
}

/// Where a rate table came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RateSource {
    Live,
    /// Last successful fetch, served because the live fetch failed.
    Cached,
    /// Rates shipped with the configuration.
    Bundled,
}

impl RateSource {
    pub fn is_offline(&self) -> bool {
        !matches!(self, RateSource::Live)
    }
}

impl Display for RateSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                RateSource::Live => "live",
                RateSource::Cached => "cached",
                RateSource::Bundled => "bundled",
            }
        )
    }
}

#[async_trait]
pub trait CurrencyRateProvider: Send + Sync {
    async fn latest_rates(&self, base: &str) -> Result<RateTable>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> RateTable {
        let rates = HashMap::from([("inr".to_string(), 83.0), ("EUR".to_string(), 0.92)]);
        RateTable::new("usd", rates, Utc::now())
    }

    #[test]
    fn test_cross_rate() {
        let table = table();
        assert_eq!(table.base, "USD");
        assert_eq!(table.rate("USD", "INR").unwrap(), 83.0);
        assert!((table.rate("EUR", "INR").unwrap() - 83.0 / 0.92).abs() < 1e-9);
        assert_eq!(table.rate("inr", "inr").unwrap(), 1.0);
        assert_eq!(table.currencies(), vec!["EUR", "INR", "USD"]);
    }

    #[test]
    fn test_unknown_currency() {
        let err = table().rate("USD", "XYZ").unwrap_err();
        assert_eq!(err.to_string(), "Unknown currency: XYZ");
    }
}
