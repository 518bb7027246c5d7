//! Price return summary.
//!
//! Returns are cumulative from the first usable adjusted close, so each point
//! is the total gain since the start of the history, not a daily change.

use serde::{Deserialize, Serialize};

use crate::analytics::stats::{mean, sample_std_dev};
use crate::domain::{PriceField, PriceSeries};
use crate::error::AnalysisError;

/// Annual risk-free rate subtracted from the average return (high-interest savings).
pub const DEFAULT_RISK_FREE_RATE: f64 = 0.023;

/// Return statistics for one ticker's price history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReturnProfile {
    /// Most recent adjusted close, rounded to cents.
    pub latest_price: f64,
    pub average_return: f64,
    /// Sample standard deviation (n − 1) of the cumulative returns.
    pub return_std_dev: f64,
    /// `(average_return - risk_free_rate) / return_std_dev`; 0.0 when undefined.
    pub sharpe_ratio: f64,
}

/// `(p - p0) / p0` for every usable price, where `p0` is the first one.
pub fn cumulative_returns(prices: &[f64]) -> Vec<f64> {
    let Some(&base) = prices.first() else {
        return Vec::new();
    };
    prices.iter().map(|p| (p - base) / base).collect()
}

/// Summarise the adjusted-close history of `prices`.
///
/// Non-finite and non-positive prices are skipped. Fails only when no usable
/// price remains.
pub fn compute_returns(
    prices: &PriceSeries,
    risk_free_rate: f64,
) -> Result<ReturnProfile, AnalysisError> {
    let adj: Vec<f64> = prices
        .points()
        .iter()
        .map(|p| p.price(PriceField::AdjClose))
        .filter(|p| p.is_finite() && *p > 0.0)
        .collect();
    let Some(&last) = adj.last() else {
        return Err(AnalysisError::insufficient(
            "no usable adjusted close for return statistics",
        ));
    };

    let returns = cumulative_returns(&adj);
    let average_return = mean(&returns);
    let return_std_dev = sample_std_dev(&returns);
    let sharpe_ratio = if return_std_dev.is_finite() && return_std_dev > 1e-15 {
        (average_return - risk_free_rate) / return_std_dev
    } else {
        0.0
    };

    Ok(ReturnProfile {
        latest_price: (last * 100.0).round_ties_even() / 100.0,
        average_return,
        return_std_dev,
        sharpe_ratio,
    })
}
