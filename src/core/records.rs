//! Entities the user saves between runs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// Collection names used in the store.
pub const DENOMINATIONS: &str = "denominations";
pub const LOAN_PROFILES: &str = "loan_profiles";
pub const CASH_BOOK: &str = "cash_book";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DenominationCount {
    pub value: f64,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanProfile {
    pub name: String,
    pub principal: f64,
    pub annual_rate: f64,
    pub tenure_months: u32,
    pub start_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Credit,
    Debit,
}

impl FromStr for EntryKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "credit" | "cr" | "in" => Ok(EntryKind::Credit),
            "debit" | "dr" | "out" => Ok(EntryKind::Debit),
            _ => Err(anyhow::anyhow!("Invalid entry kind: {}", s)),
        }
    }
}

impl Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryKind::Credit => write!(f, "Credit"),
            EntryKind::Debit => write!(f, "Debit"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashBookEntry {
    pub date: NaiveDate,
    pub description: String,
    pub amount: f64,
    pub kind: EntryKind,
}

impl CashBookEntry {
    /// Amount with credits positive and debits negative.
    pub fn signed_amount(&self) -> f64 {
        match self.kind {
            EntryKind::Credit => self.amount,
            EntryKind::Debit => -self.amount,
        }
    }
}

/// Running balance over entries in the order given.
pub fn cash_book_balance<'a>(entries: impl IntoIterator<Item = &'a CashBookEntry>) -> f64 {
    entries.into_iter().map(CashBookEntry::signed_amount).sum()
}
