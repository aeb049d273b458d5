//! Configuration, storage abstractions and shared types

pub mod cache;
pub mod config;
pub mod currency;
pub mod log;
pub mod records;
pub mod validate;

// Re-export main types for cleaner imports
pub use cache::{KeyValueCollection, Store};
pub use currency::{CurrencyRateProvider, RateSource, RateTable};
