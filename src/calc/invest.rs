//! Market-linked and small-savings investments: SIP, lumpsum, PPF and CAGR.

use crate::core::validate::{ensure_months, ensure_non_negative, ensure_positive, ensure_range, ensure_rate};
use anyhow::{Result, anyhow, bail};
use rust_decimal::{Decimal, prelude::*};
use rust_finprim::rate::cagr as finprim_cagr;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const PPF_MIN_DEPOSIT: f64 = 500.0;
pub const PPF_MAX_DEPOSIT: f64 = 150_000.0;
pub const PPF_LOCK_IN_YEARS: u32 = 15;
pub const PPF_EXTENSION_BLOCK: u32 = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SipResult {
    pub monthly_investment: f64,
    pub annual_return: f64,
    pub tenure_months: u32,
    pub step_up_pct: f64,
    pub invested: f64,
    pub estimated_returns: f64,
    pub total_value: f64,
}

/// Future value of a monthly SIP paid at the start of each month. With a
/// non-zero `step_up_pct` the instalment rises by that percentage every
/// twelve months.
pub fn sip(
    monthly_investment: f64,
    annual_return: f64,
    tenure_months: u32,
    step_up_pct: f64,
) -> Result<SipResult> {
    ensure_positive("Monthly investment", monthly_investment)?;
    ensure_rate("Expected return", annual_return)?;
    ensure_months("Tenure", tenure_months)?;
    ensure_range("Annual step-up", step_up_pct, 0.0, 100.0)?;

    let i = annual_return / 12.0 / 100.0;
    let mut instalment = monthly_investment;
    let mut invested = 0.0;
    let mut total_value = 0.0;
    for month in 0..tenure_months {
        if month > 0 && month % 12 == 0 {
            instalment *= 1.0 + step_up_pct / 100.0;
        }
        invested += instalment;
        total_value = (total_value + instalment) * (1.0 + i);
    }

    Ok(SipResult {
        monthly_investment,
        annual_return,
        tenure_months,
        step_up_pct,
        invested,
        estimated_returns: total_value - invested,
        total_value,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LumpsumResult {
    pub principal: f64,
    pub annual_return: f64,
    pub tenure_months: u32,
    pub estimated_returns: f64,
    pub total_value: f64,
}

pub fn lumpsum(principal: f64, annual_return: f64, tenure_months: u32) -> Result<LumpsumResult> {
    ensure_positive("Investment amount", principal)?;
    ensure_rate("Expected return", annual_return)?;
    ensure_months("Tenure", tenure_months)?;

    let total_value = principal * (1.0 + annual_return / 100.0).powf(tenure_months as f64 / 12.0);
    Ok(LumpsumResult {
        principal,
        annual_return,
        tenure_months,
        estimated_returns: total_value - principal,
        total_value,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PpfYear {
    pub year: u32,
    pub opening_balance: f64,
    pub deposit: f64,
    pub interest: f64,
    pub closing_balance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PpfResult {
    pub yearly_deposit: f64,
    pub annual_rate: f64,
    pub years: u32,
    pub total_deposit: f64,
    pub total_interest: f64,
    pub maturity_amount: f64,
    pub breakdown: Vec<PpfYear>,
}

/// PPF with the deposit made at the start of every year and interest
/// compounded yearly. The account runs 15 years and extends in 5-year blocks.
pub fn ppf(yearly_deposit: f64, annual_rate: f64, years: u32) -> Result<PpfResult> {
    ensure_range("Yearly deposit", yearly_deposit, PPF_MIN_DEPOSIT, PPF_MAX_DEPOSIT)?;
    ensure_rate("Interest rate", annual_rate)?;
    if years < PPF_LOCK_IN_YEARS || (years - PPF_LOCK_IN_YEARS) % PPF_EXTENSION_BLOCK != 0 {
        bail!(
            "Tenure must be {PPF_LOCK_IN_YEARS} years, extendable in blocks of {PPF_EXTENSION_BLOCK} years"
        );
    }

    let r = annual_rate / 100.0;
    let mut balance = 0.0;
    let breakdown: Vec<PpfYear> = (1..=years)
        .map(|year| {
            let opening_balance = balance;
            let interest = (opening_balance + yearly_deposit) * r;
            balance = opening_balance + yearly_deposit + interest;
            PpfYear {
                year,
                opening_balance,
                deposit: yearly_deposit,
                interest,
                closing_balance: balance,
            }
        })
        .collect();

    let total_deposit = yearly_deposit * years as f64;
    Ok(PpfResult {
        yearly_deposit,
        annual_rate,
        years,
        total_deposit,
        total_interest: balance - total_deposit,
        maturity_amount: balance,
        breakdown,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CagrResult {
    pub initial_value: f64,
    pub final_value: f64,
    pub years: f64,
    /// Compound annual growth rate in percent.
    pub cagr: f64,
    /// Total change in percent.
    pub absolute_return: f64,
}

pub fn cagr(initial_value: f64, final_value: f64, years: f64) -> Result<CagrResult> {
    ensure_positive("Initial value", initial_value)?;
    ensure_non_negative("Final value", final_value)?;
    ensure_positive("Duration", years)?;

    let begin_bal = Decimal::from_f64(initial_value).ok_or_else(|| anyhow!("Invalid initial value"))?;
    let end_bal = Decimal::from_f64(final_value).ok_or_else(|| anyhow!("Invalid final value"))?;
    let n_years = Decimal::from_f64(years).ok_or_else(|| anyhow!("Invalid duration"))?;

    let rate = finprim_cagr(begin_bal, end_bal, n_years);
    let percentage = (rate * Decimal::from(100))
        .to_f64()
        .ok_or_else(|| anyhow!("CAGR percentage conversion failed"))?;
    debug!("cagr: {begin_bal}, {end_bal}, {n_years} = {rate}");

    Ok(CagrResult {
        initial_value,
        final_value,
        years,
        cagr: percentage,
        absolute_return: (final_value - initial_value) / initial_value * 100.0,
    })
}
