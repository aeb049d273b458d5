use super::export::ExportArgs;
use super::{amount, ui};
use crate::calc::currency;
use crate::core::config::AppConfig;
use crate::core::{CurrencyRateProvider, KeyValueCollection, RateSource, RateTable, Store};
use crate::providers::{ExchangeRateProvider, FallbackRateProvider};
use crate::store::KeyValueStore;
use anyhow::Result;
use chrono::Utc;
use clap::Subcommand;
use comfy_table::Cell;
use std::sync::Arc;
use tracing::debug;

/// Collection holding the last successful rate table per base currency.
pub const RATES_COLLECTION: &str = "rates";

#[derive(Subcommand, Debug, Clone)]
pub enum CurrencyCommand {
    /// Convert an amount between two currencies
    Convert {
        /// Amount to convert
        #[arg(value_parser = amount)]
        amount: f64,
        /// Currency code to convert from, e.g. USD
        from: String,
        /// Currency code to convert to (defaults to config currency)
        to: Option<String>,
        #[command(flatten)]
        output: ExportArgs,
    },
    /// List exchange rates against a base currency
    Rates {
        /// Base currency (defaults to config currency)
        base: Option<String>,
        #[command(flatten)]
        output: ExportArgs,
    },
}

/// Builds the fallback chain from config: live provider, stored tables and
/// the bundled rates.
pub fn rate_provider(config: &AppConfig, store: &KeyValueStore) -> FallbackRateProvider {
    let live: Arc<dyn CurrencyRateProvider> =
        Arc::new(ExchangeRateProvider::new(config.rates_base_url()));
    let cache: Option<Arc<dyn KeyValueCollection>> =
        store.get_collection(RATES_COLLECTION, true, true);
    let bundled = (!config.fallback_rates.is_empty()).then(|| {
        RateTable::new(&config.currency, config.fallback_rates.clone(), Utc::now())
    });
    FallbackRateProvider::new(live, cache, bundled)
}

async fn fetch_rates(config: &AppConfig, base: &str) -> Result<(RateTable, RateSource)> {
    let store = KeyValueStore::open(&config.default_data_path()?);
    let provider = rate_provider(config, &store);

    let pb = ui::new_spinner(&format!("Fetching {} exchange rates", base.to_uppercase()));
    let fetched = provider.fetch(base).await;
    pb.finish_and_clear();

    let (table, source) = fetched?;
    debug!("Using {} rates against {}", source, table.base);
    ui::print_offline_notice(source, &table.fetched_at.format("%Y-%m-%d %H:%M UTC").to_string());
    Ok((table, source))
}

pub async fn run(command: CurrencyCommand, config: &AppConfig) -> Result<()> {
    match command {
        CurrencyCommand::Convert {
            amount,
            from,
            to,
            output,
        } => {
            let to = to.unwrap_or_else(|| config.currency.clone());
            let (table, _) = fetch_rates(config, &from).await?;
            let result = currency::convert(amount, &from, &to, &table)?;
            ui::print_summary(
                "Currency conversion",
                &[
                    (
                        "Rate",
                        format!("1 {} = {:.6} {}", result.from, result.rate, result.to),
                    ),
                    (
                        "Converted",
                        format!(
                            "{} {} = {} {}",
                            ui::format_money(result.amount),
                            result.from,
                            ui::format_money(result.converted),
                            result.to
                        ),
                    ),
                ],
            );
            output.write(&result, std::slice::from_ref(&result))
        }
        CurrencyCommand::Rates { base, output } => {
            let base = base.unwrap_or_else(|| config.currency.clone()).to_uppercase();
            let (table, _) = fetch_rates(config, &base).await?;

            let mut rows = Vec::new();
            let mut out = ui::new_styled_table();
            out.set_header(vec![
                ui::header_cell("Currency"),
                ui::header_cell(&format!("Per 1 {base}")),
            ]);
            for code in table.currencies() {
                let rate = table.rate(&base, code)?;
                out.add_row(vec![Cell::new(code), ui::number_cell(format!("{rate:.6}"))]);
                rows.push(currency::convert(1.0, &base, code, &table)?);
            }
            println!("{out}");
            output.write(&table, &rows)
        }
    }
}
