//! Dividend volatility: dispersion and year-over-year change of annual yields.

use serde::{Deserialize, Serialize};

use super::normality::{DataValidationWarning, NormalityReport, NormalityValidator};
use super::stats::{percent_change, sample_std_dev};
use crate::domain::{AnnualYield, AnnualYieldSeries};
use crate::error::AnalysisError;
use crate::visualize::Visualizer;

/// Relative change of annual yield against the previous retained year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PercentChange {
    pub year: i32,
    /// `None` for the first year.
    pub change: Option<f64>,
}

/// Volatility statistics for one asset's annual yields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolatilityProfile {
    pub series: Vec<AnnualYield>,
    /// Sample standard deviation (n − 1).
    pub standard_deviation: f64,
    pub percent_change: Vec<PercentChange>,
}

/// Output of [`compute_volatility`]: the profile plus the normality side effects.
#[derive(Debug, Clone)]
pub struct VolatilityAnalysis {
    pub profile: VolatilityProfile,
    pub normality: NormalityReport,
    pub warnings: Vec<DataValidationWarning>,
}

/// Validate normality of the annual yields, then compute their standard
/// deviation and percent-change series.
///
/// The Gaussian outcome does not alter the statistics; it is only reported.
pub fn compute_volatility(
    name: &str,
    annual: &AnnualYieldSeries,
    alpha: f64,
    visualizer: Option<&dyn Visualizer>,
) -> Result<VolatilityAnalysis, AnalysisError> {
    let values = annual.values();
    let (normality, warnings) =
        NormalityValidator::new(name, &values, alpha, visualizer)?.into_parts();

    let percent_change = annual
        .years()
        .into_iter()
        .zip(percent_change(&values))
        .map(|(year, change)| PercentChange { year, change })
        .collect();

    Ok(VolatilityAnalysis {
        profile: VolatilityProfile {
            series: annual.points().to_vec(),
            standard_deviation: sample_std_dev(&values),
            percent_change,
        },
        normality,
        warnings,
    })
}
