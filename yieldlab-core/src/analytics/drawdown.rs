//! Yield drawdown: the largest single-step decline between consecutive periods.
//!
//! Unlike an equity drawdown this is not peak-to-trough: only adjacent
//! observations are compared. The sign is not clamped, so a series that never
//! declines reports a negative drawdown equal to its smallest step up.

use serde::{Deserialize, Serialize};

use crate::domain::{AnnualYieldSeries, YieldSeries};
use crate::error::AnalysisError;

/// Maximum quarterly and annual yield declines for one asset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DrawdownResult {
    pub max_quarterly_drawdown: f64,
    pub max_annual_drawdown: f64,
}

/// Round to 3 decimal places, ties to even.
fn round3(x: f64) -> f64 {
    (x * 1000.0).round_ties_even() / 1000.0
}

/// `-min(values[i] - values[i-1])`, with each difference rounded to 3 dp.
///
/// Requires at least two values.
pub fn max_drawdown(values: &[f64]) -> Result<f64, AnalysisError> {
    if values.len() < 2 {
        return Err(AnalysisError::insufficient(format!(
            "drawdown needs at least 2 observations, got {}",
            values.len()
        )));
    }

    let min_diff = values
        .windows(2)
        .map(|w| round3(w[1] - w[0]))
        .fold(f64::INFINITY, f64::min);

    Ok(-min_diff)
}

/// Apply [`max_drawdown`] to the per-payment and annual series independently.
pub fn compute_drawdowns(
    quarterly: &YieldSeries,
    annual: &AnnualYieldSeries,
) -> Result<DrawdownResult, AnalysisError> {
    let max_quarterly_drawdown = max_drawdown(&quarterly.values())?;
    let max_annual_drawdown = max_drawdown(&annual.values())?;
    Ok(DrawdownResult {
        max_quarterly_drawdown,
        max_annual_drawdown,
    })
}
