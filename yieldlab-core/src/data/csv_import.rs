//! CSV market data provider.
//!
//! Reads two files per ticker from a directory:
//! - `<TICKER>_prices.csv` with columns `date,close[,adj_close]`
//! - `<TICKER>_dividends.csv` with columns `date,amount`
//!
//! Dates are `YYYY-MM-DD`. A missing price file means the ticker is unknown; a
//! missing dividend file means the ticker has never paid.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::debug;

use super::provider::{DataSource, MarketData, MarketDataProvider, ProviderError};
use crate::domain::{DividendPayment, DividendPaymentSeries, PricePoint, PriceSeries};

#[derive(Debug, Deserialize)]
struct PriceRow {
    date: NaiveDate,
    close: f64,
    #[serde(default)]
    adj_close: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct DividendRow {
    date: NaiveDate,
    amount: f64,
}

/// Loads price and dividend history from CSV files on disk.
#[derive(Debug, Clone)]
pub struct CsvProvider {
    dir: PathBuf,
}

impl CsvProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn prices_path(&self, ticker: &str) -> PathBuf {
        self.dir.join(format!("{}_prices.csv", ticker.to_uppercase()))
    }

    pub fn dividends_path(&self, ticker: &str) -> PathBuf {
        self.dir.join(format!("{}_dividends.csv", ticker.to_uppercase()))
    }

    fn read_rows<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<Vec<T>, ProviderError> {
        let parse_err = |reason: String| ProviderError::Parse {
            source_name: path.display().to_string(),
            reason,
        };
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(|e| parse_err(e.to_string()))?;
        reader
            .deserialize()
            .collect::<Result<Vec<T>, _>>()
            .map_err(|e| parse_err(e.to_string()))
    }
}

impl MarketDataProvider for CsvProvider {
    fn name(&self) -> &str {
        "csv"
    }

    fn fetch(&self, ticker: &str) -> Result<MarketData, ProviderError> {
        let prices_path = self.prices_path(ticker);
        if !prices_path.exists() {
            return Err(ProviderError::NotFound {
                ticker: ticker.to_string(),
            });
        }

        let prices: Vec<PricePoint> = Self::read_rows::<PriceRow>(&prices_path)?
            .into_iter()
            .map(|r| PricePoint {
                date: r.date,
                close: r.close,
                adj_close: r.adj_close,
            })
            .collect();

        let dividends_path = self.dividends_path(ticker);
        let payments: Vec<DividendPayment> = if dividends_path.exists() {
            Self::read_rows::<DividendRow>(&dividends_path)?
                .into_iter()
                .map(|r| DividendPayment {
                    date: r.date,
                    amount: r.amount,
                })
                .collect()
        } else {
            debug!(ticker, path = %dividends_path.display(), "no dividend file");
            Vec::new()
        };

        Ok(MarketData {
            ticker: ticker.to_uppercase(),
            prices: PriceSeries::new(prices),
            dividends: DividendPaymentSeries::new(payments),
            source: DataSource::CsvImport,
        })
    }
}
