pub mod exchange_rate;
pub mod fallback;

pub use exchange_rate::ExchangeRateProvider;
pub use fallback::FallbackRateProvider;
