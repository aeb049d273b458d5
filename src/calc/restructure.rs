//! Mid-life changes to a loan: part prepayment, payment moratorium and a
//! change in the rate of interest. Each one replays the original schedule up
//! to the change and re-amortizes the outstanding balance from there.

use super::loan::{
    BALANCE_EPSILON, EmiResult, Installment, Loan, amortize, emi, emi_amount, monthly_rate,
    months_to_repay, total_interest,
};
use crate::core::validate::{ensure_months, ensure_positive, ensure_rate};
use anyhow::{Result, anyhow, bail};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrepaymentMode {
    ReduceEmi,
    ReduceTenure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoratoriumMode {
    /// Finish on the original last month, pay a higher EMI after the pause.
    IncreaseEmi,
    /// Keep the EMI, pay for longer.
    ExtendTenure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateChangeMode {
    KeepEmi,
    KeepTenure,
}

fn normalize(s: &str) -> String {
    s.trim().to_lowercase().replace(['-', '_', ' '], "")
}

impl FromStr for PrepaymentMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "emi" | "reduceemi" => Ok(PrepaymentMode::ReduceEmi),
            "tenure" | "reducetenure" => Ok(PrepaymentMode::ReduceTenure),
            _ => Err(anyhow!("Invalid prepayment mode: {}", s)),
        }
    }
}

impl FromStr for MoratoriumMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "emi" | "increaseemi" => Ok(MoratoriumMode::IncreaseEmi),
            "tenure" | "extendtenure" => Ok(MoratoriumMode::ExtendTenure),
            _ => Err(anyhow!("Invalid moratorium mode: {}", s)),
        }
    }
}

impl FromStr for RateChangeMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "emi" | "keepemi" => Ok(RateChangeMode::KeepEmi),
            "tenure" | "keeptenure" => Ok(RateChangeMode::KeepTenure),
            _ => Err(anyhow!("Invalid rate change mode: {}", s)),
        }
    }
}

impl Display for PrepaymentMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrepaymentMode::ReduceEmi => write!(f, "Reduce EMI"),
            PrepaymentMode::ReduceTenure => write!(f, "Reduce tenure"),
        }
    }
}

impl Display for MoratoriumMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MoratoriumMode::IncreaseEmi => write!(f, "Increase EMI"),
            MoratoriumMode::ExtendTenure => write!(f, "Extend tenure"),
        }
    }
}

impl Display for RateChangeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RateChangeMode::KeepEmi => write!(f, "Keep EMI"),
            RateChangeMode::KeepTenure => write!(f, "Keep tenure"),
        }
    }
}

/// The untouched loan split at `after_month`: installments already paid and
/// the balance outstanding after them.
struct Checkpoint {
    baseline: EmiResult,
    paid: Vec<Installment>,
    balance: f64,
}

fn checkpoint(loan: &Loan, after_month: u32) -> Result<Checkpoint> {
    if after_month >= loan.tenure_months {
        bail!(
            "Change must happen before the last installment (month {})",
            loan.tenure_months
        );
    }
    let baseline = emi(loan.principal, loan.annual_rate, loan.tenure_months)?;
    // `amortize` closes out its final period, so run one month past the
    // checkpoint and drop it to keep the true mid-schedule balance.
    let mut paid = amortize(
        loan.principal,
        monthly_rate(loan.annual_rate),
        baseline.emi,
        0,
        after_month + 1,
    );
    paid.truncate(after_month as usize);
    let balance = paid.last().map_or(loan.principal, |m| m.closing_balance);
    debug!("Outstanding after month {}: {:.2}", after_month, balance);

    Ok(Checkpoint {
        baseline,
        paid,
        balance,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrepaymentResult {
    pub original: EmiResult,
    pub prepayment: f64,
    pub after_month: u32,
    pub mode: PrepaymentMode,
    pub new_emi: f64,
    pub new_tenure_months: u32,
    pub total_interest: f64,
    pub interest_saved: f64,
    pub months_saved: u32,
    pub schedule: Vec<Installment>,
}

/// Applies a one-off prepayment right after installment `after_month`
/// (0 means before the first installment). A prepayment at or above the
/// outstanding balance closes the loan.
pub fn prepayment(
    loan: &Loan,
    amount: f64,
    after_month: u32,
    mode: PrepaymentMode,
) -> Result<PrepaymentResult> {
    ensure_positive("Prepayment amount", amount)?;
    let Checkpoint {
        baseline,
        paid,
        balance,
    } = checkpoint(loan, after_month)?;

    let r = monthly_rate(loan.annual_rate);
    let remaining = loan.tenure_months - after_month;
    let prepayment = amount.min(balance);
    let new_balance = balance - prepayment;

    let (new_emi, rest) = if new_balance <= BALANCE_EPSILON {
        (0.0, Vec::new())
    } else {
        match mode {
            PrepaymentMode::ReduceEmi => {
                let new_emi = emi_amount(new_balance, r, remaining);
                (new_emi, amortize(new_balance, r, new_emi, after_month, remaining))
            }
            PrepaymentMode::ReduceTenure => {
                let months = months_to_repay(new_balance, r, baseline.emi)?;
                (
                    baseline.emi,
                    amortize(new_balance, r, baseline.emi, after_month, months),
                )
            }
        }
    };

    let mut schedule = paid;
    schedule.extend(rest);
    let new_tenure_months = schedule.len() as u32;
    let total_interest = total_interest(&schedule);

    Ok(PrepaymentResult {
        interest_saved: (baseline.total_interest - total_interest).max(0.0),
        months_saved: loan.tenure_months - new_tenure_months,
        original: baseline,
        prepayment,
        after_month,
        mode,
        new_emi,
        new_tenure_months,
        total_interest,
        schedule,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoratoriumResult {
    pub original: EmiResult,
    pub start_after_month: u32,
    pub moratorium_months: u32,
    pub mode: MoratoriumMode,
    pub accrued_interest: f64,
    pub new_emi: f64,
    pub remaining_installments: u32,
    pub total_tenure_months: u32,
    pub total_interest: f64,
    pub extra_interest: f64,
    pub schedule: Vec<Installment>,
}

/// Skips `months` installments starting right after `start_after_month`.
/// Simple interest accrues on the outstanding balance during the pause and is
/// added to it when payments resume. Paused months appear in the schedule
/// with a zero payment and negative principal.
pub fn moratorium(
    loan: &Loan,
    start_after_month: u32,
    months: u32,
    mode: MoratoriumMode,
) -> Result<MoratoriumResult> {
    ensure_months("Moratorium period", months)?;
    if mode == MoratoriumMode::IncreaseEmi
        && start_after_month.saturating_add(months) >= loan.tenure_months
    {
        bail!(
            "Moratorium of {} months after month {} leaves no installments before month {}",
            months,
            start_after_month,
            loan.tenure_months
        );
    }
    let Checkpoint {
        baseline,
        paid,
        balance,
    } = checkpoint(loan, start_after_month)?;

    let r = monthly_rate(loan.annual_rate);
    let monthly_accrual = balance * r;
    let accrued_interest = monthly_accrual * months as f64;

    let mut schedule = paid;
    let mut running = balance;
    for offset in 1..=months {
        schedule.push(Installment {
            month: start_after_month + offset,
            opening_balance: running,
            payment: 0.0,
            interest: monthly_accrual,
            principal: -monthly_accrual,
            closing_balance: running + monthly_accrual,
        });
        running += monthly_accrual;
    }

    let new_balance = balance + accrued_interest;
    let resume_after = start_after_month + months;
    let (new_emi, rest) = match mode {
        MoratoriumMode::IncreaseEmi => {
            let remaining = loan.tenure_months - resume_after;
            let new_emi = emi_amount(new_balance, r, remaining);
            (new_emi, amortize(new_balance, r, new_emi, resume_after, remaining))
        }
        MoratoriumMode::ExtendTenure => {
            let count = months_to_repay(new_balance, r, baseline.emi)?;
            (
                baseline.emi,
                amortize(new_balance, r, baseline.emi, resume_after, count),
            )
        }
    };
    let remaining_installments = rest.len() as u32;
    schedule.extend(rest);

    let total_interest = total_interest(&schedule);
    Ok(MoratoriumResult {
        extra_interest: total_interest - baseline.total_interest,
        original: baseline,
        start_after_month,
        moratorium_months: months,
        mode,
        accrued_interest,
        new_emi,
        remaining_installments,
        total_tenure_months: schedule.len() as u32,
        total_interest,
        schedule,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateChangeResult {
    pub original: EmiResult,
    pub after_month: u32,
    pub new_rate: f64,
    pub mode: RateChangeMode,
    pub new_emi: f64,
    pub new_tenure_months: u32,
    pub total_interest: f64,
    /// Positive when the change costs more interest than the original loan.
    pub interest_difference: f64,
    pub schedule: Vec<Installment>,
}

/// Re-prices the loan at `new_rate` from the installment after `after_month`.
pub fn rate_change(
    loan: &Loan,
    after_month: u32,
    new_rate: f64,
    mode: RateChangeMode,
) -> Result<RateChangeResult> {
    ensure_rate("New interest rate", new_rate)?;
    let Checkpoint {
        baseline,
        paid,
        balance,
    } = checkpoint(loan, after_month)?;

    let r = monthly_rate(new_rate);
    let remaining = loan.tenure_months - after_month;
    let (new_emi, rest) = match mode {
        RateChangeMode::KeepTenure => {
            let new_emi = emi_amount(balance, r, remaining);
            (new_emi, amortize(balance, r, new_emi, after_month, remaining))
        }
        RateChangeMode::KeepEmi => {
            let months = months_to_repay(balance, r, baseline.emi)?;
            (baseline.emi, amortize(balance, r, baseline.emi, after_month, months))
        }
    };

    let mut schedule = paid;
    schedule.extend(rest);
    let total_interest = total_interest(&schedule);

    Ok(RateChangeResult {
        interest_difference: total_interest - baseline.total_interest,
        original: baseline,
        after_month,
        new_rate,
        mode,
        new_emi,
        new_tenure_months: schedule.len() as u32,
        total_interest,
        schedule,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loan() -> Loan {
        Loan::new(1_000_000.0, 9.0, 120).unwrap()
    }

    fn assert_close(actual: f64, expected: f64, tolerance: f64) {
        assert!(
            (actual - expected).abs() < tolerance,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("emi".parse::<PrepaymentMode>().unwrap(), PrepaymentMode::ReduceEmi);
        assert_eq!(
            "reduce-tenure".parse::<PrepaymentMode>().unwrap(),
            PrepaymentMode::ReduceTenure
        );
        assert_eq!(
            "Extend Tenure".parse::<MoratoriumMode>().unwrap(),
            MoratoriumMode::ExtendTenure
        );
        assert_eq!("keep_emi".parse::<RateChangeMode>().unwrap(), RateChangeMode::KeepEmi);
        assert!("sideways".parse::<RateChangeMode>().is_err());
    }

    #[test]
    fn test_prepayment_reduce_emi() {
        let loan = loan();
        let result = prepayment(&loan, 200_000.0, 24, PrepaymentMode::ReduceEmi).unwrap();

        assert!(result.new_emi < result.original.emi);
        assert_eq!(result.new_tenure_months, 120);
        assert_eq!(result.months_saved, 0);
        assert!(result.interest_saved > 0.0);
        assert!(result.total_interest <= result.original.total_interest);
        assert_close(result.schedule.last().unwrap().closing_balance, 0.0, 1e-6);
        // Installments before the prepayment are unchanged.
        assert_close(result.schedule[23].payment, result.original.emi, 1e-6);
        assert_close(result.schedule[24].payment, result.new_emi, 1e-6);
    }

    #[test]
    fn test_prepayment_reduce_tenure() {
        let loan = loan();
        let result = prepayment(&loan, 200_000.0, 24, PrepaymentMode::ReduceTenure).unwrap();

        assert_close(result.new_emi, result.original.emi, 1e-9);
        assert!(result.new_tenure_months < 120);
        assert_eq!(result.months_saved, 120 - result.new_tenure_months);
        assert!(result.total_interest <= result.original.total_interest);
        let last = result.schedule.last().unwrap();
        assert_close(last.closing_balance, 0.0, 1e-6);
        assert!(last.payment <= result.original.emi + 1e-6);
    }

    #[test]
    fn test_prepayment_never_increases_interest() {
        let loan = loan();
        for after_month in [0, 1, 60, 119] {
            for amount in [1000.0, 250_000.0] {
                for mode in [PrepaymentMode::ReduceEmi, PrepaymentMode::ReduceTenure] {
                    let result = prepayment(&loan, amount, after_month, mode).unwrap();
                    assert!(
                        result.total_interest <= result.original.total_interest + 1e-6,
                        "{after_month} {amount} {mode}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_prepayment_closing_the_loan() {
        let loan = loan();
        let result = prepayment(&loan, 5_000_000.0, 12, PrepaymentMode::ReduceTenure).unwrap();
        assert_eq!(result.new_tenure_months, 12);
        assert_eq!(result.new_emi, 0.0);
        assert!(result.prepayment < 1_000_000.0);
    }

    #[test]
    fn test_prepayment_after_last_month_is_rejected() {
        let loan = loan();
        assert!(prepayment(&loan, 1000.0, 120, PrepaymentMode::ReduceEmi).is_err());
        assert!(prepayment(&loan, 0.0, 10, PrepaymentMode::ReduceEmi).is_err());
    }

    #[test]
    fn test_moratorium_increase_emi() {
        let loan = loan();
        let result = moratorium(&loan, 12, 6, MoratoriumMode::IncreaseEmi).unwrap();

        let balance_at_12 = result.schedule[11].closing_balance;
        assert_close(result.accrued_interest, balance_at_12 * monthly_rate(9.0) * 6.0, 1e-6);
        assert!(result.new_emi > result.original.emi);
        assert_eq!(result.remaining_installments, 102);
        assert_eq!(result.total_tenure_months, 120);
        assert_eq!(result.schedule.last().unwrap().month, 120);
        assert!(result.extra_interest > 0.0);

        let paused = &result.schedule[12];
        assert_eq!(paused.month, 13);
        assert_eq!(paused.payment, 0.0);
        assert_close(result.schedule[18].opening_balance, balance_at_12 + result.accrued_interest, 1e-6);
        assert_close(result.schedule.last().unwrap().closing_balance, 0.0, 1e-6);
    }

    #[test]
    fn test_moratorium_increase_emi_needs_installments_left() {
        let loan = loan();
        assert!(moratorium(&loan, 114, 6, MoratoriumMode::IncreaseEmi).is_err());
        assert!(moratorium(&loan, 100, 30, MoratoriumMode::IncreaseEmi).is_err());

        let result = moratorium(&loan, 113, 6, MoratoriumMode::IncreaseEmi).unwrap();
        assert_eq!(result.remaining_installments, 1);
        assert_eq!(result.schedule.last().unwrap().month, 120);
        assert_close(result.schedule.last().unwrap().closing_balance, 0.0, 1e-6);

        // Extending the tenure still works when the pause runs past the end.
        assert!(moratorium(&loan, 114, 6, MoratoriumMode::ExtendTenure).is_ok());
    }

    #[test]
    fn test_moratorium_extend_tenure() {
        let loan = loan();
        let result = moratorium(&loan, 12, 3, MoratoriumMode::ExtendTenure).unwrap();
        assert_close(result.new_emi, result.original.emi, 1e-9);
        assert!(result.remaining_installments > 108);
        assert_eq!(result.total_tenure_months, 12 + 3 + result.remaining_installments);
        assert_close(result.schedule.last().unwrap().closing_balance, 0.0, 1e-6);
    }

    #[test]
    fn test_rate_change_keep_tenure() {
        let loan = loan();
        let higher = rate_change(&loan, 36, 10.5, RateChangeMode::KeepTenure).unwrap();
        assert!(higher.new_emi > higher.original.emi);
        assert_eq!(higher.new_tenure_months, 120);
        assert!(higher.interest_difference > 0.0);

        let lower = rate_change(&loan, 36, 7.5, RateChangeMode::KeepTenure).unwrap();
        assert!(lower.new_emi < lower.original.emi);
        assert!(lower.interest_difference < 0.0);
        assert_close(lower.schedule.last().unwrap().closing_balance, 0.0, 1e-6);
    }

    #[test]
    fn test_rate_change_keep_emi() {
        let loan = loan();
        let higher = rate_change(&loan, 36, 10.5, RateChangeMode::KeepEmi).unwrap();
        assert!(higher.new_tenure_months > 120);
        let lower = rate_change(&loan, 36, 7.5, RateChangeMode::KeepEmi).unwrap();
        assert!(lower.new_tenure_months < 120);
        assert_close(lower.schedule.last().unwrap().closing_balance, 0.0, 1e-6);
    }

    #[test]
    fn test_rate_change_emi_below_interest() {
        let loan = Loan::new(1_000_000.0, 6.0, 360).unwrap();
        let err = rate_change(&loan, 12, 30.0, RateChangeMode::KeepEmi).unwrap_err();
        assert!(err.to_string().contains("does not cover the monthly interest"));
    }
}
