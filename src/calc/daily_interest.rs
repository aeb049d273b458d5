//! Interest accrued day by day on a balance that moves with dated deposits and
//! withdrawals, as savings accounts compute it.

use crate::core::validate::{ensure_non_negative, ensure_rate};
use anyhow::{Result, bail};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const DAYS_IN_YEAR: f64 = 365.0;

/// A deposit (positive) or withdrawal (negative) on a given day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub date: NaiveDate,
    pub amount: f64,
}

/// A run of days over which the balance did not change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterestSegment {
    pub from: NaiveDate,
    /// Last day of the run, inclusive.
    pub to: NaiveDate,
    pub days: i64,
    pub balance: f64,
    pub interest: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyInterestResult {
    pub opening_balance: f64,
    pub annual_rate: f64,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub days: i64,
    pub total_interest: f64,
    pub closing_balance: f64,
    pub segments: Vec<InterestSegment>,
}

/// Accrues interest for every day in `[start, end)`. Transactions dated on a
/// day take effect together, before that day's interest; those dated on `end`
/// only move the closing balance. Interest is reported, not credited to the balance.
pub fn daily_interest(
    opening_balance: f64,
    annual_rate: f64,
    start: NaiveDate,
    end: NaiveDate,
    transactions: &[Transaction],
) -> Result<DailyInterestResult> {
    ensure_non_negative("Opening balance", opening_balance)?;
    ensure_rate("Interest rate", annual_rate)?;
    if end <= start {
        bail!("End date must be after the start date");
    }

    let mut ordered: Vec<&Transaction> = transactions.iter().collect();
    ordered.sort_by_key(|t| t.date);
    if let Some(t) = ordered.iter().find(|t| t.date < start || t.date > end) {
        bail!("Transaction on {} is outside {} to {}", t.date, start, end);
    }
    if let Some(t) = ordered.iter().find(|t| !t.amount.is_finite()) {
        bail!("Transaction on {} has an invalid amount", t.date);
    }

    let daily_rate = annual_rate / 100.0 / DAYS_IN_YEAR;
    let mut balance = opening_balance;
    let mut segments = Vec::new();
    let mut pending = ordered.into_iter().peekable();
    let mut segment_start = start;

    // Each pass covers one run of days with a constant balance, ending at the
    // next transaction date or at `end`.
    loop {
        // Same-day transactions net out before the balance is checked.
        let mut applied_on = None;
        while let Some(t) = pending.next_if(|t| t.date <= segment_start) {
            balance += t.amount;
            applied_on = Some(t.date);
        }
        if let Some(day) = applied_on.filter(|_| balance < -1e-9) {
            bail!("Withdrawal on {} exceeds the available balance", day);
        }
        if segment_start >= end {
            break;
        }

        let segment_end = pending.peek().map_or(end, |t| t.date.min(end));
        let days = (segment_end - segment_start).num_days();
        segments.push(InterestSegment {
            from: segment_start,
            to: segment_end.pred_opt().unwrap_or(segment_end),
            days,
            balance,
            interest: balance * daily_rate * days as f64,
        });
        segment_start = segment_end;
    }

    Ok(DailyInterestResult {
        opening_balance,
        annual_rate,
        start,
        end,
        days: (end - start).num_days(),
        total_interest: segments.iter().map(|s| s.interest).sum(),
        closing_balance: balance,
        segments,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_constant_balance() {
        let result = daily_interest(100000.0, 3.65, date(2024, 1, 1), date(2024, 1, 11), &[]).unwrap();
        assert_eq!(result.days, 10);
        assert_eq!(result.segments.len(), 1);
        assert!((result.total_interest - 100.0).abs() < 1e-9);
        assert_eq!(result.closing_balance, 100000.0);
    }

    #[test]
    fn test_transactions_split_segments() {
        let transactions = vec![
            Transaction {
                date: date(2024, 1, 21),
                amount: -50000.0,
            },
            Transaction {
                date: date(2024, 1, 11),
                amount: 50000.0,
            },
        ];
        let result = daily_interest(
            100000.0,
            3.65,
            date(2024, 1, 1),
            date(2024, 1, 31),
            &transactions,
        )
        .unwrap();

        assert_eq!(result.segments.len(), 3);
        assert_eq!(result.segments[0].to, date(2024, 1, 10));
        assert_eq!(result.segments[1].from, date(2024, 1, 11));
        assert_eq!(result.segments[1].balance, 150000.0);
        assert_eq!(result.segments[2].balance, 100000.0);
        // 10 days at 100k, 10 days at 150k, 10 days at 100k, at 1 per 100k per day.
        assert!((result.total_interest - 350.0).abs() < 1e-9);
        assert_eq!(result.closing_balance, 100000.0);
    }

    #[test]
    fn test_transactions_on_boundaries() {
        let transactions = vec![
            Transaction {
                date: date(2024, 1, 1),
                amount: 100000.0,
            },
            Transaction {
                date: date(2024, 1, 11),
                amount: 25000.0,
            },
        ];
        let result = daily_interest(0.0, 3.65, date(2024, 1, 1), date(2024, 1, 11), &transactions).unwrap();
        assert_eq!(result.segments.len(), 1);
        assert!((result.total_interest - 100.0).abs() < 1e-9);
        assert_eq!(result.closing_balance, 125000.0);
    }

    #[test]
    fn test_invalid_input() {
        let start = date(2024, 1, 1);
        let end = date(2024, 2, 1);
        assert!(daily_interest(100.0, 4.0, end, start, &[]).is_err());

        let outside = [Transaction {
            date: date(2024, 3, 1),
            amount: 10.0,
        }];
        assert!(daily_interest(100.0, 4.0, start, end, &outside).is_err());

        let overdraw = [Transaction {
            date: date(2024, 1, 5),
            amount: -500.0,
        }];
        let err = daily_interest(100.0, 4.0, start, end, &overdraw).unwrap_err();
        assert!(err.to_string().contains("exceeds the available balance"));
    }

    #[test]
    fn test_same_day_transactions_net_out() {
        let start = date(2024, 1, 1);
        let end = date(2024, 1, 11);
        let transactions = [
            Transaction {
                date: date(2024, 1, 6),
                amount: -1500.0,
            },
            Transaction {
                date: date(2024, 1, 6),
                amount: 2000.0,
            },
        ];
        let result = daily_interest(1000.0, 3.65, start, end, &transactions).unwrap();
        assert_eq!(result.segments.len(), 2);
        assert_eq!(result.segments[1].balance, 1500.0);
        assert_eq!(result.closing_balance, 1500.0);

        let short = [
            Transaction {
                date: date(2024, 1, 6),
                amount: 200.0,
            },
            Transaction {
                date: date(2024, 1, 6),
                amount: -1500.0,
            },
        ];
        let err = daily_interest(1000.0, 3.65, start, end, &short).unwrap_err();
        assert_eq!(err.to_string(), "Withdrawal on 2024-01-06 exceeds the available balance");
    }
}
