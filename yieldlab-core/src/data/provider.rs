//! Market data provider trait and structured error types.
//!
//! The MarketDataProvider trait abstracts over data sources (Yahoo Finance, CSV
//! files, synthetic data) so the analysis pipeline never knows where prices and
//! dividends came from, and tests can supply fixtures directly.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{DividendPaymentSeries, PriceSeries};

/// Structured error types for data operations.
///
/// `NotFound` is permanent for the ticker; `DataUnavailable` and `RateLimited`
/// are transient and may succeed on a later attempt.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("ticker not found: {ticker}")]
    NotFound { ticker: String },

    #[error("data unavailable: {0}")]
    DataUnavailable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("hard stop: data provider has blocked requests (circuit breaker tripped)")]
    CircuitBreakerTripped,

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("failed to parse {source_name}: {reason}")]
    Parse { source_name: String, reason: String },
}

/// Where the data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataSource {
    YahooFinance,
    CsvImport,
    Synthetic,
    Fixture,
}

/// Price and dividend history for one ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketData {
    pub ticker: String,
    pub prices: PriceSeries,
    pub dividends: DividendPaymentSeries,
    pub source: DataSource,
}

/// Trait for market data providers.
///
/// Implementations return the full available history for a ticker.
pub trait MarketDataProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch daily prices and dividend payments for a ticker.
    fn fetch(&self, ticker: &str) -> Result<MarketData, ProviderError>;

    /// Check if the provider is currently available (not rate-limited, not blocked).
    fn is_available(&self) -> bool {
        true
    }
}

/// In-memory provider serving pre-built market data, keyed by ticker.
///
/// Used for fixtures and for replaying data fetched elsewhere.
#[derive(Debug, Clone, Default)]
pub struct StaticProvider {
    data: Vec<MarketData>,
}

impl StaticProvider {
    pub fn new(data: Vec<MarketData>) -> Self {
        Self { data }
    }

    pub fn with(mut self, data: MarketData) -> Self {
        self.data.push(data);
        self
    }
}

impl MarketDataProvider for StaticProvider {
    fn name(&self) -> &str {
        "static"
    }

    fn fetch(&self, ticker: &str) -> Result<MarketData, ProviderError> {
        self.data
            .iter()
            .find(|d| d.ticker.eq_ignore_ascii_case(ticker))
            .cloned()
            .ok_or_else(|| ProviderError::NotFound {
                ticker: ticker.to_string(),
            })
    }
}
