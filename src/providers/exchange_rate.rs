use crate::core::{CurrencyRateProvider, RateTable};
use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::debug;

/// Client for an open.er-api.com compatible endpoint.
pub struct ExchangeRateProvider {
    base_url: String,
}

impl ExchangeRateProvider {
    pub fn new(base_url: &str) -> Self {
        ExchangeRateProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct LatestRatesResponse {
    result: String,
    base_code: Option<String>,
    #[serde(default)]
    rates: HashMap<String, f64>,
    #[serde(rename = "error-type")]
    error_type: Option<String>,
}

#[async_trait]
impl CurrencyRateProvider for ExchangeRateProvider {
    async fn latest_rates(&self, base: &str) -> Result<RateTable> {
        let base = base.trim().to_uppercase();
        if base.is_empty() {
            bail!("Base currency must not be blank");
        }

        let url = format!("{}/latest/{}", self.base_url, base);
        debug!("Requesting exchange rates from {}", url);

        let client = reqwest::Client::builder()
            .user_agent("fincalc/1.0")
            .build()?;
        let response = client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Failed to send rate request for {base}"))?
            .error_for_status()
            .with_context(|| format!("Rate request for {base} failed"))?;

        let response_text = response
            .text()
            .await
            .with_context(|| format!("Failed to get response text for {base}"))?;

        if response_text.trim().is_empty() {
            return Err(anyhow!("Received empty rate response for {}", base));
        }

        let parsed: LatestRatesResponse = serde_json::from_str(&response_text)
            .with_context(|| format!("Failed to parse rate response for {base}"))?;

        if parsed.result != "success" {
            bail!(
                "Rate provider returned '{}' for {}: {}",
                parsed.result,
                base,
                parsed.error_type.as_deref().unwrap_or("no details")
            );
        }
        if parsed.rates.is_empty() {
            bail!("Rate response for {} has no rates", base);
        }

        let table_base = parsed.base_code.unwrap_or(base);
        debug!(
            "Fetched {} rates against {}",
            parsed.rates.len(),
            table_base
        );
        Ok(RateTable::new(&table_base, parsed.rates, Utc::now()))
    }
}
