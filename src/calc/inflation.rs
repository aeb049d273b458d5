use crate::core::validate::{ensure_positive, ensure_rate};
use anyhow::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InflationResult {
    pub current_amount: f64,
    pub annual_rate: f64,
    pub years: f64,
    /// What the same basket will cost after `years`.
    pub future_amount: f64,
    pub increase: f64,
    /// What `current_amount` held today will buy after `years`, in today's money.
    pub purchasing_power: f64,
}

pub fn inflation(current_amount: f64, annual_rate: f64, years: f64) -> Result<InflationResult> {
    ensure_positive("Amount", current_amount)?;
    ensure_rate("Inflation rate", annual_rate)?;
    ensure_positive("Years", years)?;

    let growth = (1.0 + annual_rate / 100.0).powf(years);
    let future_amount = current_amount * growth;

    Ok(InflationResult {
        current_amount,
        annual_rate,
        years,
        future_amount,
        increase: future_amount - current_amount,
        purchasing_power: current_amount / growth,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inflation() {
        let result = inflation(100000.0, 6.0, 10.0).unwrap();
        assert!((result.future_amount - 179084.77).abs() < 0.01);
        assert!((result.purchasing_power - 55839.48).abs() < 0.01);
        assert!((result.increase - 79084.77).abs() < 0.01);
    }

    #[test]
    fn test_zero_inflation() {
        let result = inflation(5000.0, 0.0, 3.0).unwrap();
        assert_eq!(result.future_amount, 5000.0);
        assert_eq!(result.purchasing_power, 5000.0);
    }
}
