use crate::core::currency::RateTable;
use crate::core::validate::ensure_non_negative;
use anyhow::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionResult {
    pub amount: f64,
    pub from: String,
    pub to: String,
    pub rate: f64,
    pub converted: f64,
}

pub fn convert(amount: f64, from: &str, to: &str, table: &RateTable) -> Result<ConversionResult> {
    ensure_non_negative("Amount", amount)?;
    let rate = table.rate(from, to)?;
    Ok(ConversionResult {
        amount,
        from: from.to_uppercase(),
        to: to.to_uppercase(),
        rate,
        converted: amount * rate,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::collections::HashMap;

    fn table() -> RateTable {
        let rates = HashMap::from([
            ("INR".to_string(), 83.12),
            ("EUR".to_string(), 0.9231),
            ("JPY".to_string(), 151.7),
        ]);
        RateTable::new("USD", rates, Utc::now())
    }

    #[test]
    fn test_convert() {
        let result = convert(10.0, "usd", "inr", &table()).unwrap();
        assert_eq!(result.from, "USD");
        assert_eq!(result.to, "INR");
        assert!((result.converted - 831.2).abs() < 1e-9);
    }

    #[test]
    fn test_round_trip_returns_original() {
        let table = table();
        for (from, to) in [("INR", "EUR"), ("EUR", "JPY"), ("USD", "INR"), ("JPY", "JPY")] {
            for amount in [0.01, 1.0, 1234.56, 98_765_432.1] {
                let there = convert(amount, from, to, &table).unwrap();
                let back = convert(there.converted, to, from, &table).unwrap();
                assert!(
                    (back.converted - amount).abs() <= amount * 1e-12,
                    "{from}->{to}->{from} {amount}"
                );
            }
        }
    }

    #[test]
    fn test_convert_rejects_unknown_and_negative() {
        assert!(convert(10.0, "USD", "ABC", &table()).is_err());
        assert!(convert(-1.0, "USD", "INR", &table()).is_err());
    }
}
