//! Personal-finance formulas. Every function here is a pure function of its
//! inputs and returns a serializable result record.

pub mod currency;
pub mod daily_interest;
pub mod denomination;
pub mod deposit;
pub mod inflation;
pub mod invest;
pub mod loan;
pub mod restructure;
pub mod scientific;
pub mod tax;
