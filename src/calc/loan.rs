//! EMI, amortization and eligibility for fixed-rate loans.

use crate::core::validate::{
    MAX_TENURE_MONTHS, ensure_months, ensure_non_negative, ensure_positive, ensure_range, ensure_rate,
};
use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

/// Balances below this are treated as fully repaid.
pub const BALANCE_EPSILON: f64 = 1e-6;

/// Converts an annual percentage rate into the monthly fraction used by
/// every loan formula.
pub fn monthly_rate(annual_rate: f64) -> f64 {
    annual_rate / 12.0 / 100.0
}

/// Inputs shared by the loan restructuring calculators.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    pub principal: f64,
    pub annual_rate: f64,
    pub tenure_months: u32,
}

impl Loan {
    pub fn new(principal: f64, annual_rate: f64, tenure_months: u32) -> Result<Self> {
        Ok(Self {
            principal: ensure_positive("Principal", principal)?,
            annual_rate: ensure_rate("Interest rate", annual_rate)?,
            tenure_months: ensure_months("Tenure", tenure_months)?,
        })
    }

    pub fn emi(&self) -> f64 {
        emi_amount(self.principal, monthly_rate(self.annual_rate), self.tenure_months)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmiResult {
    pub principal: f64,
    pub annual_rate: f64,
    pub tenure_months: u32,
    pub emi: f64,
    pub total_interest: f64,
    pub total_payment: f64,
}

/// One month of an amortization schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Installment {
    pub month: u32,
    pub opening_balance: f64,
    pub payment: f64,
    pub interest: f64,
    pub principal: f64,
    pub closing_balance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearSummary {
    pub year: u32,
    pub principal: f64,
    pub interest: f64,
    pub payment: f64,
    pub closing_balance: f64,
}

/// Raw EMI for a balance, monthly rate (fraction) and number of months.
pub fn emi_amount(principal: f64, monthly_rate: f64, months: u32) -> f64 {
    if months == 0 {
        return principal;
    }
    if monthly_rate == 0.0 {
        return principal / months as f64;
    }
    let growth = (1.0 + monthly_rate).powi(months as i32);
    principal * monthly_rate * growth / (growth - 1.0)
}

pub fn emi(principal: f64, annual_rate: f64, tenure_months: u32) -> Result<EmiResult> {
    let loan = Loan::new(principal, annual_rate, tenure_months)?;
    let emi = loan.emi();
    let total_payment = emi * tenure_months as f64;

    Ok(EmiResult {
        principal,
        annual_rate,
        tenure_months,
        emi,
        total_interest: total_payment - principal,
        total_payment,
    })
}

/// Runs a fixed `emi` against `balance` starting after month `start_month`
/// until the balance is repaid or `max_months` payments have been made. The
/// payment that clears the loan is trimmed to the outstanding amount, so the
/// last closing balance is exactly zero when the loan is repaid.
pub fn amortize(
    balance: f64,
    monthly_rate: f64,
    emi: f64,
    start_month: u32,
    max_months: u32,
) -> Vec<Installment> {
    let mut schedule = Vec::with_capacity(max_months as usize);
    let mut balance = balance;

    for offset in 1..=max_months {
        if balance <= BALANCE_EPSILON {
            break;
        }
        let interest = balance * monthly_rate;
        let mut principal = emi - interest;
        let is_last = offset == max_months;
        if principal >= balance - BALANCE_EPSILON || is_last {
            principal = balance;
        }
        let payment = principal + interest;
        let closing_balance = balance - principal;

        schedule.push(Installment {
            month: start_month + offset,
            opening_balance: balance,
            payment,
            interest,
            principal,
            closing_balance,
        });
        balance = closing_balance;
    }

    schedule
}

pub fn amortization_schedule(
    principal: f64,
    annual_rate: f64,
    tenure_months: u32,
) -> Result<Vec<Installment>> {
    let loan = Loan::new(principal, annual_rate, tenure_months)?;
    Ok(amortize(
        loan.principal,
        monthly_rate(loan.annual_rate),
        loan.emi(),
        0,
        loan.tenure_months,
    ))
}

/// Rolls a monthly schedule into 12-month groups. The year is counted from
/// the first month in the schedule.
pub fn yearly_summary(schedule: &[Installment]) -> Vec<YearSummary> {
    schedule
        .chunks(12)
        .enumerate()
        .map(|(index, months)| YearSummary {
            year: index as u32 + 1,
            principal: months.iter().map(|m| m.principal).sum(),
            interest: months.iter().map(|m| m.interest).sum(),
            payment: months.iter().map(|m| m.payment).sum(),
            closing_balance: months.last().map_or(0.0, |m| m.closing_balance),
        })
        .collect()
}

pub fn total_interest(schedule: &[Installment]) -> f64 {
    schedule.iter().map(|m| m.interest).sum()
}

/// Number of payments of `emi` needed to clear `balance`.
pub fn months_to_repay(balance: f64, monthly_rate: f64, emi: f64) -> Result<u32> {
    if balance <= BALANCE_EPSILON {
        return Ok(0);
    }
    if emi <= balance * monthly_rate {
        bail!("EMI of {emi:.2} does not cover the monthly interest of {:.2}", balance * monthly_rate);
    }
    let months = if monthly_rate == 0.0 {
        balance / emi
    } else {
        -(1.0 - balance * monthly_rate / emi).ln() / (1.0 + monthly_rate).ln()
    };
    // Guard against 11.9999999 style results from the logarithms.
    let months = (months - 1e-9).ceil().max(1.0);
    if months > MAX_TENURE_MONTHS as f64 {
        bail!("Repaying {balance:.2} with an EMI of {emi:.2} would take more than {MAX_TENURE_MONTHS} months");
    }
    Ok(months as u32)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EligibilityResult {
    pub monthly_income: f64,
    pub existing_emis: f64,
    pub foir: f64,
    pub max_emi: f64,
    pub eligible_amount: f64,
    pub total_interest: f64,
    pub total_payment: f64,
}

/// Largest loan whose EMI fits in `monthly_income × foir%` after existing
/// obligations.
pub fn eligibility(
    monthly_income: f64,
    existing_emis: f64,
    annual_rate: f64,
    tenure_months: u32,
    foir: f64,
) -> Result<EligibilityResult> {
    ensure_positive("Monthly income", monthly_income)?;
    ensure_non_negative("Existing EMIs", existing_emis)?;
    ensure_rate("Interest rate", annual_rate)?;
    ensure_months("Tenure", tenure_months)?;
    ensure_range("FOIR", foir, 1.0, 100.0)?;

    let max_emi = (monthly_income * foir / 100.0 - existing_emis).max(0.0);
    let r = monthly_rate(annual_rate);
    let n = tenure_months as f64;
    let eligible_amount = if r == 0.0 {
        max_emi * n
    } else {
        let growth = (1.0 + r).powi(tenure_months as i32);
        max_emi * (growth - 1.0) / (r * growth)
    };
    let total_payment = max_emi * n;

    Ok(EligibilityResult {
        monthly_income,
        existing_emis,
        foir,
        max_emi,
        eligible_amount,
        total_interest: total_payment - eligible_amount,
        total_payment,
    })
}
