//! Cash counting by note and coin denomination.

use crate::core::records::DenominationCount;
use crate::core::validate::ensure_positive;
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Indian rupee notes and coins, largest first.
pub const DEFAULT_DENOMINATIONS: [f64; 10] =
    [2000.0, 500.0, 200.0, 100.0, 50.0, 20.0, 10.0, 5.0, 2.0, 1.0];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DenominationLine {
    pub value: f64,
    pub quantity: u32,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DenominationSummary {
    pub lines: Vec<DenominationLine>,
    pub total_pieces: u64,
    pub total_amount: f64,
    pub amount_in_words: String,
}

/// Totals the counts, merging repeated denominations and listing them from
/// the largest value down. Zero quantities are dropped.
pub fn summarize(counts: &[DenominationCount]) -> Result<DenominationSummary> {
    let mut lines: Vec<DenominationLine> = Vec::new();
    for count in counts {
        ensure_positive("Denomination", count.value)?;
        if count.quantity == 0 {
            continue;
        }
        match lines.iter_mut().find(|line| line.value == count.value) {
            Some(line) => line.quantity += count.quantity,
            None => lines.push(DenominationLine {
                value: count.value,
                quantity: count.quantity,
                total: 0.0,
            }),
        }
    }
    lines.sort_by(|a, b| b.value.total_cmp(&a.value));
    for line in &mut lines {
        line.total = line.value * line.quantity as f64;
    }

    let total_amount: f64 = lines.iter().map(|line| line.total).sum();
    Ok(DenominationSummary {
        total_pieces: lines.iter().map(|line| line.quantity as u64).sum(),
        amount_in_words: amount_in_words(total_amount),
        total_amount,
        lines,
    })
}

const ONES: [&str; 20] = [
    "Zero", "One", "Two", "Three", "Four", "Five", "Six", "Seven", "Eight", "Nine", "Ten",
    "Eleven", "Twelve", "Thirteen", "Fourteen", "Fifteen", "Sixteen", "Seventeen", "Eighteen",
    "Nineteen",
];

const TENS: [&str; 10] = [
    "", "", "Twenty", "Thirty", "Forty", "Fifty", "Sixty", "Seventy", "Eighty", "Ninety",
];

fn below_hundred(n: u64) -> String {
    if n < 20 {
        ONES[n as usize].to_string()
    } else if n % 10 == 0 {
        TENS[(n / 10) as usize].to_string()
    } else {
        format!("{} {}", TENS[(n / 10) as usize], ONES[(n % 10) as usize])
    }
}

fn below_thousand(n: u64) -> String {
    match (n / 100, n % 100) {
        (0, rest) => below_hundred(rest),
        (hundreds, 0) => format!("{} Hundred", ONES[hundreds as usize]),
        (hundreds, rest) => format!("{} Hundred {}", ONES[hundreds as usize], below_hundred(rest)),
    }
}

/// Spells out a whole number in the Indian system (thousand, lakh, crore).
pub fn number_in_words(n: u64) -> String {
    if n == 0 {
        return ONES[0].to_string();
    }

    let crore = n / 10_000_000;
    let mut parts = Vec::new();
    if crore > 0 {
        parts.push(format!("{} Crore", number_in_words(crore)));
    }
    let rest = n % 10_000_000;
    for (unit, name) in [(100_000, "Lakh"), (1_000, "Thousand")] {
        let count = rest / unit % 100;
        if count > 0 {
            parts.push(format!("{} {}", below_hundred(count), name));
        }
    }
    if rest % 1000 > 0 {
        parts.push(below_thousand(rest % 1000));
    }
    parts.join(" ")
}

/// Rupees and paise in words, e.g. "One Hundred Rupees and Fifty Paise Only".
pub fn amount_in_words(amount: f64) -> String {
    let paise_total = (amount.abs() * 100.0).round() as u64;
    let rupees = paise_total / 100;
    let paise = paise_total % 100;

    let mut words = format!("{} Rupees", number_in_words(rupees));
    if paise > 0 {
        words.push_str(&format!(" and {} Paise", below_hundred(paise)));
    }
    words.push_str(" Only");
    words
}
