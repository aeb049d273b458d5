//! Input sanitisation applied before any calculation runs.
//!
//! Every check names the offending field so the message can be shown to the
//! user as-is.

use anyhow::{Result, anyhow, bail};

/// Parses a user-entered number. Blank, non-numeric and non-finite input is
/// rejected. Thousands separators (`,` and `_`) are accepted.
pub fn parse_amount(field: &str, raw: &str) -> Result<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        bail!("{field} must not be blank");
    }

    let cleaned: String = trimmed.chars().filter(|c| *c != ',' && *c != '_').collect();
    let value: f64 = cleaned
        .parse()
        .map_err(|_| anyhow!("{field} must be a number, got '{trimmed}'"))?;

    if !value.is_finite() {
        bail!("{field} must be a finite number");
    }
    Ok(value)
}

pub fn ensure_positive(field: &str, value: f64) -> Result<f64> {
    if !value.is_finite() || value <= 0.0 {
        bail!("{field} must be greater than zero");
    }
    Ok(value)
}

pub fn ensure_non_negative(field: &str, value: f64) -> Result<f64> {
    if !value.is_finite() || value < 0.0 {
        bail!("{field} must not be negative");
    }
    Ok(value)
}

/// Inclusive range check.
pub fn ensure_range(field: &str, value: f64, min: f64, max: f64) -> Result<f64> {
    if !value.is_finite() || value < min || value > max {
        bail!("{field} must be between {min} and {max}");
    }
    Ok(value)
}

/// Longest term any calculator accepts, 100 years.
pub const MAX_TENURE_MONTHS: u32 = 1200;

pub fn ensure_months(field: &str, months: u32) -> Result<u32> {
    if months == 0 {
        bail!("{field} must be at least one month");
    }
    if months > MAX_TENURE_MONTHS {
        bail!("{field} must not exceed {MAX_TENURE_MONTHS} months");
    }
    Ok(months)
}

/// Annual interest rates are accepted in percent, 0 to 100.
pub fn ensure_rate(field: &str, rate: f64) -> Result<f64> {
    ensure_range(field, rate, 0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("Principal", " 100000 ").unwrap(), 100000.0);
        assert_eq!(parse_amount("Principal", "1,00,000.50").unwrap(), 100000.5);
        assert_eq!(parse_amount("Principal", "-12.5").unwrap(), -12.5);
    }

    #[test]
    fn test_parse_amount_rejects_bad_input() {
        let err = parse_amount("Principal", "   ").unwrap_err();
        assert_eq!(err.to_string(), "Principal must not be blank");

        let err = parse_amount("Rate", "ten").unwrap_err();
        assert_eq!(err.to_string(), "Rate must be a number, got 'ten'");

        assert!(parse_amount("Rate", "inf").is_err());
        assert!(parse_amount("Rate", "NaN").is_err());
    }

    #[test]
    fn test_range_checks() {
        assert!(ensure_positive("Principal", 0.0).is_err());
        assert!(ensure_positive("Principal", 1.0).is_ok());
        assert!(ensure_non_negative("Amount", 0.0).is_ok());
        assert!(ensure_non_negative("Amount", -0.01).is_err());
        assert!(ensure_rate("Rate", 100.0).is_ok());
        assert!(ensure_rate("Rate", 100.5).is_err());
        assert!(ensure_months("Tenure", 0).is_err());
        assert_eq!(ensure_months("Tenure", MAX_TENURE_MONTHS).unwrap(), 1200);

        let err = ensure_range("Deposit", 10.0, 500.0, 150000.0).unwrap_err();
        assert_eq!(err.to_string(), "Deposit must be between 500 and 150000");
    }

    #[test]
    fn test_months_upper_bound() {
        let err = ensure_months("Tenure", MAX_TENURE_MONTHS + 1).unwrap_err();
        assert_eq!(err.to_string(), "Tenure must not exceed 1200 months");
        assert!(ensure_months("Tenure", 3_000_000_000).is_err());
        assert!(ensure_months("Tenure", u32::MAX).is_err());
    }
}
