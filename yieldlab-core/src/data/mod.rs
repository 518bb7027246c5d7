//! Market data providers

pub mod circuit_breaker;
pub mod csv_import;
pub mod provider;
pub mod synthetic;
pub mod yahoo;

pub use circuit_breaker::CircuitBreaker;
pub use csv_import::CsvProvider;
pub use provider::{DataSource, MarketData, MarketDataProvider, ProviderError, StaticProvider};
pub use synthetic::SyntheticProvider;
pub use yahoo::YahooProvider;
