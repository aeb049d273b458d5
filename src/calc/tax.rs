//! GST on a sale amount.

use crate::core::validate::{ensure_positive, ensure_range};
use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// Slabs offered as presets; any rate from 0 to 100 is accepted.
pub const GST_SLABS: [f64; 5] = [3.0, 5.0, 12.0, 18.0, 28.0];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GstMode {
    /// The amount excludes GST; tax is added on top.
    Exclusive,
    /// The amount already includes GST; tax is extracted from it.
    Inclusive,
}

impl FromStr for GstMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "exclusive" | "add" | "excl" => Ok(GstMode::Exclusive),
            "inclusive" | "remove" | "incl" => Ok(GstMode::Inclusive),
            _ => Err(anyhow!("Invalid GST mode: {}", s)),
        }
    }
}

impl Display for GstMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GstMode::Exclusive => write!(f, "Add GST"),
            GstMode::Inclusive => write!(f, "Remove GST"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GstResult {
    pub mode: GstMode,
    pub rate: f64,
    pub net_amount: f64,
    pub gst_amount: f64,
    pub cgst: f64,
    pub sgst: f64,
    pub total_amount: f64,
}

pub fn gst(amount: f64, rate: f64, mode: GstMode) -> Result<GstResult> {
    ensure_positive("Amount", amount)?;
    ensure_range("GST rate", rate, 0.0, 100.0)?;

    let (net_amount, gst_amount) = match mode {
        GstMode::Exclusive => (amount, amount * rate / 100.0),
        GstMode::Inclusive => {
            let net = amount * 100.0 / (100.0 + rate);
            (net, amount - net)
        }
    };

    Ok(GstResult {
        mode,
        rate,
        net_amount,
        gst_amount,
        cgst: gst_amount / 2.0,
        sgst: gst_amount / 2.0,
        total_amount: net_amount + gst_amount,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gst_exclusive() {
        let result = gst(1000.0, 18.0, GstMode::Exclusive).unwrap();
        assert_eq!(result.gst_amount, 180.0);
        assert_eq!(result.cgst, 90.0);
        assert_eq!(result.sgst, 90.0);
        assert_eq!(result.total_amount, 1180.0);
    }

    #[test]
    fn test_gst_inclusive() {
        let result = gst(1180.0, 18.0, GstMode::Inclusive).unwrap();
        assert!((result.net_amount - 1000.0).abs() < 1e-9);
        assert!((result.gst_amount - 180.0).abs() < 1e-9);
        assert!((result.total_amount - 1180.0).abs() < 1e-9);
    }

    #[test]
    fn test_gst_inclusive_undoes_exclusive() {
        for rate in GST_SLABS {
            let added = gst(2499.0, rate, GstMode::Exclusive).unwrap();
            let removed = gst(added.total_amount, rate, GstMode::Inclusive).unwrap();
            assert!((removed.net_amount - 2499.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_gst_validation() {
        assert!(gst(0.0, 18.0, GstMode::Exclusive).is_err());
        assert!(gst(100.0, 120.0, GstMode::Exclusive).is_err());
        assert_eq!("incl".parse::<GstMode>().unwrap(), GstMode::Inclusive);
    }
}
