//! Fixed and recurring deposits.

use crate::core::validate::{ensure_months, ensure_positive, ensure_rate};
use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Compounding {
    Monthly,
    Quarterly,
    HalfYearly,
    Yearly,
    /// No compounding; interest is paid on the principal only.
    Simple,
}

impl Compounding {
    /// Compounding periods per year; `None` for simple interest.
    pub fn periods_per_year(&self) -> Option<u32> {
        match self {
            Compounding::Monthly => Some(12),
            Compounding::Quarterly => Some(4),
            Compounding::HalfYearly => Some(2),
            Compounding::Yearly => Some(1),
            Compounding::Simple => None,
        }
    }

    /// Growth factor of one unit over `months` at `annual_rate` percent.
    pub fn growth(&self, annual_rate: f64, months: f64) -> f64 {
        let years = months / 12.0;
        match self.periods_per_year() {
            Some(f) => {
                let f = f as f64;
                (1.0 + annual_rate / (100.0 * f)).powf(f * years)
            }
            None => 1.0 + annual_rate * years / 100.0,
        }
    }
}

impl FromStr for Compounding {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', '_', ' '], "").as_str() {
            "monthly" | "m" => Ok(Compounding::Monthly),
            "quarterly" | "q" => Ok(Compounding::Quarterly),
            "halfyearly" | "h" => Ok(Compounding::HalfYearly),
            "yearly" | "annually" | "y" => Ok(Compounding::Yearly),
            "simple" | "none" => Ok(Compounding::Simple),
            _ => Err(anyhow!("Invalid compounding frequency: {}", s)),
        }
    }
}

impl Display for Compounding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Compounding::Monthly => "Monthly",
                Compounding::Quarterly => "Quarterly",
                Compounding::HalfYearly => "Half-yearly",
                Compounding::Yearly => "Yearly",
                Compounding::Simple => "Simple interest",
            }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FdResult {
    pub principal: f64,
    pub annual_rate: f64,
    pub tenure_months: u32,
    pub compounding: Compounding,
    pub maturity_amount: f64,
    pub interest_earned: f64,
}

pub fn fixed_deposit(
    principal: f64,
    annual_rate: f64,
    tenure_months: u32,
    compounding: Compounding,
) -> Result<FdResult> {
    ensure_positive("Deposit amount", principal)?;
    ensure_rate("Interest rate", annual_rate)?;
    ensure_months("Tenure", tenure_months)?;

    let maturity_amount = principal * compounding.growth(annual_rate, tenure_months as f64);
    Ok(FdResult {
        principal,
        annual_rate,
        tenure_months,
        compounding,
        maturity_amount,
        interest_earned: maturity_amount - principal,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RdResult {
    pub monthly_deposit: f64,
    pub annual_rate: f64,
    pub tenure_months: u32,
    pub compounding: Compounding,
    pub total_deposit: f64,
    pub maturity_amount: f64,
    pub interest_earned: f64,
}

/// Each monthly instalment earns interest from the month it is paid until
/// maturity, so instalment `i` of `n` grows for `n - i + 1` months.
pub fn recurring_deposit(
    monthly_deposit: f64,
    annual_rate: f64,
    tenure_months: u32,
    compounding: Compounding,
) -> Result<RdResult> {
    ensure_positive("Monthly deposit", monthly_deposit)?;
    ensure_rate("Interest rate", annual_rate)?;
    ensure_months("Tenure", tenure_months)?;

    let maturity_amount: f64 = (1..=tenure_months)
        .map(|i| monthly_deposit * compounding.growth(annual_rate, (tenure_months - i + 1) as f64))
        .sum();
    let total_deposit = monthly_deposit * tenure_months as f64;

    Ok(RdResult {
        monthly_deposit,
        annual_rate,
        tenure_months,
        compounding,
        total_deposit,
        maturity_amount,
        interest_earned: maturity_amount - total_deposit,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64, tolerance: f64) {
        assert!(
            (actual - expected).abs() < tolerance,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_fd_quarterly() {
        let result = fixed_deposit(100000.0, 7.0, 12, Compounding::Quarterly).unwrap();
        assert_close(result.maturity_amount, 107185.90, 0.01);
        assert_close(result.interest_earned, 7185.90, 0.01);
    }

    #[test]
    fn test_fd_simple_and_yearly() {
        let simple = fixed_deposit(100000.0, 6.0, 24, Compounding::Simple).unwrap();
        assert_close(simple.maturity_amount, 112000.0, 1e-6);

        let yearly = fixed_deposit(100000.0, 6.0, 24, Compounding::Yearly).unwrap();
        assert_close(yearly.maturity_amount, 112360.0, 1e-6);
    }

    #[test]
    fn test_fd_monotonic_in_rate_and_tenure() {
        for compounding in [
            Compounding::Monthly,
            Compounding::Quarterly,
            Compounding::HalfYearly,
            Compounding::Yearly,
            Compounding::Simple,
        ] {
            let mut last = 0.0;
            for rate in [1.0, 4.5, 7.0, 9.25] {
                let amount = fixed_deposit(50000.0, rate, 36, compounding).unwrap().maturity_amount;
                assert!(amount > last);
                last = amount;
            }
            let mut last = 0.0;
            for months in [1, 6, 12, 60, 120] {
                let amount = fixed_deposit(50000.0, 7.0, months, compounding).unwrap().maturity_amount;
                assert!(amount > last);
                last = amount;
            }
        }
    }

    #[test]
    fn test_rd_quarterly() {
        let result = recurring_deposit(1000.0, 7.0, 12, Compounding::Quarterly).unwrap();
        assert_eq!(result.total_deposit, 12000.0);
        assert_close(result.maturity_amount, 12462.13, 0.01);
        assert!(result.interest_earned > 0.0);
    }

    #[test]
    fn test_rd_monotonic() {
        let mut last = 0.0;
        for rate in [2.0, 5.0, 8.0] {
            let amount = recurring_deposit(2000.0, rate, 24, Compounding::Quarterly)
                .unwrap()
                .maturity_amount;
            assert!(amount > last);
            last = amount;
        }
        let mut last = 0.0;
        for months in [3, 12, 36, 60] {
            let amount = recurring_deposit(2000.0, 6.5, months, Compounding::Monthly)
                .unwrap()
                .maturity_amount;
            assert!(amount > last);
            last = amount;
        }
    }

    #[test]
    fn test_compounding_parsing() {
        assert_eq!("half-yearly".parse::<Compounding>().unwrap(), Compounding::HalfYearly);
        assert_eq!("Q".parse::<Compounding>().unwrap(), Compounding::Quarterly);
        assert!("weekly".parse::<Compounding>().is_err());
    }
}
