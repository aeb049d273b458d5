//! Command handlers. Each handler runs one calculator and renders its result.

pub mod currency;
pub mod export;
pub mod invest;
pub mod loan;
pub mod records;
pub mod setup;
pub mod tools;
pub mod ui;

use crate::core::validate::parse_amount;
use anyhow::Result;

/// clap value parser for numeric options; accepts `1,00,000` style input.
pub(crate) fn amount(raw: &str) -> Result<f64> {
    parse_amount("Value", raw)
}
