//! Cross-ticker comparison of dividend profiles.
//!
//! Each ticker is analysed independently. By default a ticker that fails is
//! recorded in [`AssetComparisonAggregator::failures`] and the rest carry on;
//! `strict` mode aborts on the first failure instead.
//!
//! Aggregated tables keep tickers in input order and years sorted ascending.
//! A ticker with no value for a year leaves the cell empty, never zero.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};
use yieldlab_core::data::MarketDataProvider;
use yieldlab_core::{AnalysisConfig, AnalysisError, DividendAsset, Visualizer};

#[derive(Debug, Error)]
pub enum CompareError {
    #[error("no tickers to compare")]
    NoTickers,

    #[error("invalid analysis settings: {0}")]
    InvalidConfig(#[source] AnalysisError),

    #[error("analysis of '{ticker}' failed: {source}")]
    Asset {
        ticker: String,
        #[source]
        source: AnalysisError,
    },
}

/// A ticker that could not be analysed.
#[derive(Debug)]
pub struct TickerFailure {
    pub ticker: String,
    pub error: AnalysisError,
}

/// Values pivoted ticker × year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PivotTable {
    tickers: Vec<String>,
    /// One entry per year; each row has one cell per ticker, in ticker order.
    rows: BTreeMap<i32, Vec<Option<f64>>>,
}

impl PivotTable {
    fn from_columns(columns: Vec<(String, Vec<(i32, Option<f64>)>)>) -> Self {
        let years: BTreeSet<i32> = columns
            .iter()
            .flat_map(|(_, col)| col.iter().map(|&(year, _)| year))
            .collect();

        let mut rows: BTreeMap<i32, Vec<Option<f64>>> = years
            .into_iter()
            .map(|year| (year, vec![None; columns.len()]))
            .collect();
        for (i, (_, col)) in columns.iter().enumerate() {
            for &(year, value) in col {
                if let Some(row) = rows.get_mut(&year) {
                    row[i] = value;
                }
            }
        }

        Self {
            tickers: columns.into_iter().map(|(ticker, _)| ticker).collect(),
            rows,
        }
    }

    pub fn tickers(&self) -> &[String] {
        &self.tickers
    }

    pub fn years(&self) -> Vec<i32> {
        self.rows.keys().copied().collect()
    }

    pub fn rows(&self) -> impl Iterator<Item = (i32, &[Option<f64>])> {
        self.rows.iter().map(|(&year, row)| (year, row.as_slice()))
    }

    pub fn get(&self, ticker: &str, year: i32) -> Option<f64> {
        let col = self.tickers.iter().position(|t| t == ticker)?;
        self.rows.get(&year).and_then(|row| row[col])
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// One scalar per ticker, in ticker order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickerValues {
    entries: Vec<(String, f64)>,
}

impl TickerValues {
    pub fn get(&self, ticker: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(t, _)| t == ticker)
            .map(|&(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(t, v)| (t.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, f64)> for TickerValues {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Every comparison aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonTable {
    pub annual_yields: PivotTable,
    pub percent_changes: PivotTable,
    pub max_annual_drawdowns: TickerValues,
    pub standard_deviations: TickerValues,
    #[serde(default)]
    pub sharpe_ratios: TickerValues,
}

/// Builds a [`DividendAsset`] per ticker and pivots their results.
#[derive(Debug)]
pub struct AssetComparisonAggregator {
    assets: Vec<DividendAsset>,
    failures: Vec<TickerFailure>,
}

impl AssetComparisonAggregator {
    /// Analyse every ticker with `provider`.
    ///
    /// Duplicate tickers (case-insensitive) are analysed once, at the position
    /// of their first occurrence.
    pub fn new<S: AsRef<str>>(
        tickers: &[S],
        provider: &dyn MarketDataProvider,
        config: &AnalysisConfig,
        strict: bool,
        visualizer: Option<&dyn Visualizer>,
    ) -> Result<Self, CompareError> {
        if tickers.is_empty() {
            return Err(CompareError::NoTickers);
        }
        config.validate().map_err(CompareError::InvalidConfig)?;

        let mut seen = HashSet::new();
        let mut assets = Vec::new();
        let mut failures = Vec::new();

        for ticker in tickers {
            let ticker: &str = ticker.as_ref();
            if !seen.insert(ticker.to_uppercase()) {
                warn!(ticker, "duplicate ticker ignored");
                continue;
            }

            match DividendAsset::fetch(ticker, provider, config, visualizer) {
                Ok(asset) => {
                    info!(
                        ticker,
                        years = asset.annual_yields().len(),
                        warnings = asset.warnings().len(),
                        "analysed"
                    );
                    assets.push(asset);
                }
                Err(error) if strict => {
                    return Err(CompareError::Asset {
                        ticker: ticker.to_string(),
                        source: error,
                    });
                }
                Err(error) => {
                    warn!(ticker, error = %error, "skipping ticker");
                    failures.push(TickerFailure {
                        ticker: ticker.to_string(),
                        error,
                    });
                }
            }
        }

        Ok(Self { assets, failures })
    }

    /// Compare assets that were analysed elsewhere.
    pub fn from_assets(assets: Vec<DividendAsset>) -> Self {
        Self {
            assets,
            failures: Vec::new(),
        }
    }

    pub fn assets(&self) -> &[DividendAsset] {
        &self.assets
    }

    pub fn failures(&self) -> &[TickerFailure] {
        &self.failures
    }

    /// Tickers that were analysed successfully, in input order.
    pub fn tickers(&self) -> Vec<&str> {
        self.assets.iter().map(DividendAsset::ticker).collect()
    }

    pub fn aggregate_annual_yields(&self) -> PivotTable {
        PivotTable::from_columns(
            self.assets
                .iter()
                .map(|a| {
                    let col = a
                        .annual_yields()
                        .points()
                        .iter()
                        .map(|p| (p.year, Some(p.percent_yield)))
                        .collect();
                    (a.ticker().to_string(), col)
                })
                .collect(),
        )
    }

    pub fn aggregate_percent_changes(&self) -> PivotTable {
        PivotTable::from_columns(
            self.assets
                .iter()
                .map(|a| {
                    let col = a
                        .volatility()
                        .percent_change
                        .iter()
                        .map(|p| (p.year, p.change))
                        .collect();
                    (a.ticker().to_string(), col)
                })
                .collect(),
        )
    }

    pub fn aggregate_standard_deviations(&self) -> TickerValues {
        self.assets
            .iter()
            .map(|a| (a.ticker().to_string(), a.volatility().standard_deviation))
            .collect()
    }

    pub fn aggregate_max_annual_drawdowns(&self) -> TickerValues {
        self.assets
            .iter()
            .map(|a| (a.ticker().to_string(), a.drawdowns().max_annual_drawdown))
            .collect()
    }

    /// Price-return Sharpe ratio per ticker.
    pub fn aggregate_sharpe_ratios(&self) -> TickerValues {
        self.assets
            .iter()
            .map(|a| (a.ticker().to_string(), a.returns().sharpe_ratio))
            .collect()
    }

    pub fn comparison_table(&self) -> ComparisonTable {
        ComparisonTable {
            annual_yields: self.aggregate_annual_yields(),
            percent_changes: self.aggregate_percent_changes(),
            max_annual_drawdowns: self.aggregate_max_annual_drawdowns(),
            standard_deviations: self.aggregate_standard_deviations(),
            sharpe_ratios: self.aggregate_sharpe_ratios(),
        }
    }
}
