//! Yield analytics: series building, drawdowns, normality, volatility, price returns.

pub mod drawdown;
pub mod normality;
pub mod returns;
pub mod stats;
pub mod volatility;
pub mod yields;

pub use drawdown::{compute_drawdowns, max_drawdown, DrawdownResult};
pub use normality::{
    kolmogorov_smirnov_test, shapiro_wilk_test, DataValidationWarning, NormalityReport,
    NormalityTest, NormalityValidator, TestResult, DEFAULT_ALPHA,
};
pub use returns::{compute_returns, cumulative_returns, ReturnProfile, DEFAULT_RISK_FREE_RATE};
pub use volatility::{compute_volatility, PercentChange, VolatilityAnalysis, VolatilityProfile};
pub use yields::{YieldSeriesBuilder, QUARTERLY_PERIODS};
