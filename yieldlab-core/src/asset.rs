//! One ticker's dividend profile.
//!
//! Construction is a linear pipeline: quarterly yields, annual yields,
//! drawdowns, volatility (which runs normality validation), then price return
//! statistics. Every stage
//! runs at construction and the first failure aborts it, so a
//! [`DividendAsset`] either exists fully built or not at all.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::analytics::{
    compute_drawdowns, compute_returns, compute_volatility, DataValidationWarning,
    DrawdownResult, NormalityReport, ReturnProfile, VolatilityProfile,
};
use crate::config::AnalysisConfig;
use crate::data::{DataSource, MarketData, MarketDataProvider};
use crate::domain::{AnnualYieldSeries, DividendPaymentSeries, PriceSeries, YieldSeries};
use crate::error::AnalysisError;
use crate::visualize::Visualizer;

/// Everything computed for one ticker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DividendAssetProfile {
    pub ticker: String,
    pub source: DataSource,
    pub yields: YieldSeries,
    pub annual_yields: AnnualYieldSeries,
    pub drawdowns: DrawdownResult,
    pub volatility: VolatilityProfile,
    pub normality: NormalityReport,
    pub returns: ReturnProfile,
    pub warnings: Vec<DataValidationWarning>,
}

/// A fully analysed dividend payer. Immutable once built.
#[derive(Debug, Clone)]
pub struct DividendAsset {
    profile: DividendAssetProfile,
}

impl DividendAsset {
    /// Fetch the ticker's history from `provider`, then analyse it.
    pub fn fetch(
        ticker: &str,
        provider: &dyn MarketDataProvider,
        config: &AnalysisConfig,
        visualizer: Option<&dyn Visualizer>,
    ) -> Result<Self, AnalysisError> {
        config.validate()?;
        debug!(ticker, provider = provider.name(), "fetching market data");
        let data = provider.fetch(ticker)?;
        Self::from_market_data(data, config, visualizer)
    }

    pub fn from_market_data(
        data: MarketData,
        config: &AnalysisConfig,
        visualizer: Option<&dyn Visualizer>,
    ) -> Result<Self, AnalysisError> {
        let mut asset = Self::from_series(
            &data.ticker,
            &data.prices,
            &data.dividends,
            config,
            visualizer,
        )?;
        asset.profile.source = data.source;
        Ok(asset)
    }

    /// Analyse already-loaded series.
    ///
    /// The visualizer is only used when `config.plot` is set.
    pub fn from_series(
        ticker: &str,
        prices: &PriceSeries,
        dividends: &DividendPaymentSeries,
        config: &AnalysisConfig,
        visualizer: Option<&dyn Visualizer>,
    ) -> Result<Self, AnalysisError> {
        config.validate()?;
        let builder = config.yield_builder();

        let yields = builder.build_yield_series(prices, dividends)?;
        debug!(ticker, payments = yields.len(), "built quarterly yields");

        let annual_yields = builder.build_annual_yield_series(&yields);
        debug!(ticker, years = annual_yields.len(), "built annual yields");

        let drawdowns = compute_drawdowns(&yields, &annual_yields)?;
        debug!(
            ticker,
            quarterly = drawdowns.max_quarterly_drawdown,
            annual = drawdowns.max_annual_drawdown,
            "computed drawdowns"
        );

        let visualizer = if config.plot { visualizer } else { None };
        let analysis = compute_volatility(ticker, &annual_yields, config.alpha, visualizer)?;
        debug!(
            ticker,
            std_dev = analysis.profile.standard_deviation,
            gaussian = analysis.normality.is_gaussian(),
            "computed volatility"
        );

        let returns = compute_returns(prices, config.risk_free_rate)?;
        debug!(
            ticker,
            latest_price = returns.latest_price,
            sharpe = returns.sharpe_ratio,
            "computed price returns"
        );

        Ok(Self {
            profile: DividendAssetProfile {
                ticker: ticker.to_string(),
                source: DataSource::Fixture,
                yields,
                annual_yields,
                drawdowns,
                volatility: analysis.profile,
                normality: analysis.normality,
                returns,
                warnings: analysis.warnings,
            },
        })
    }

    pub fn ticker(&self) -> &str {
        &self.profile.ticker
    }

    pub fn yields(&self) -> &YieldSeries {
        &self.profile.yields
    }

    pub fn annual_yields(&self) -> &AnnualYieldSeries {
        &self.profile.annual_yields
    }

    pub fn drawdowns(&self) -> DrawdownResult {
        self.profile.drawdowns
    }

    pub fn volatility(&self) -> &VolatilityProfile {
        &self.profile.volatility
    }

    pub fn normality(&self) -> &NormalityReport {
        &self.profile.normality
    }

    pub fn returns(&self) -> &ReturnProfile {
        &self.profile.returns
    }

    pub fn warnings(&self) -> &[DataValidationWarning] {
        &self.profile.warnings
    }

    pub fn profile(&self) -> &DividendAssetProfile {
        &self.profile
    }

    pub fn into_profile(self) -> DividendAssetProfile {
        self.profile
    }
}
