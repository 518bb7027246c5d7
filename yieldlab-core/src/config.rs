//! Analysis settings shared by every asset in a run.

use serde::{Deserialize, Serialize};

use crate::analytics::{
    YieldSeriesBuilder, DEFAULT_ALPHA, DEFAULT_RISK_FREE_RATE, QUARTERLY_PERIODS,
};
use crate::domain::PriceField;
use crate::error::AnalysisError;

/// Parameters for building one dividend profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Significance level for both normality tests.
    pub alpha: f64,

    /// Payments a year must contain to count toward annual yield.
    pub periods_per_year: usize,

    /// Hand the annual series to the visualizer after validation.
    pub plot: bool,

    /// Price column used as the yield denominator.
    pub price_field: PriceField,

    /// Annual rate subtracted from the average price return in the Sharpe ratio.
    pub risk_free_rate: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
            periods_per_year: QUARTERLY_PERIODS,
            plot: false,
            price_field: PriceField::Close,
            risk_free_rate: DEFAULT_RISK_FREE_RATE,
        }
    }
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if !(self.alpha > 0.0 && self.alpha < 1.0) {
            return Err(AnalysisError::InvalidParameter(format!(
                "alpha must be in (0, 1), got {}",
                self.alpha
            )));
        }
        if self.periods_per_year == 0 {
            return Err(AnalysisError::InvalidParameter(
                "periods_per_year must be at least 1".into(),
            ));
        }
        if !self.risk_free_rate.is_finite() {
            return Err(AnalysisError::InvalidParameter(format!(
                "risk_free_rate must be finite, got {}",
                self.risk_free_rate
            )));
        }
        Ok(())
    }

    pub fn yield_builder(&self) -> YieldSeriesBuilder {
        YieldSeriesBuilder::new(self.price_field, self.periods_per_year)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = AnalysisConfig::default();
        assert_eq!(config.alpha, 0.05);
        assert_eq!(config.periods_per_year, 4);
        assert!(!config.plot);
        assert_eq!(config.price_field, PriceField::Close);
        assert_eq!(config.risk_free_rate, 0.023);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: AnalysisConfig =
            serde_json::from_str(r#"{"periods_per_year": 12, "price_field": "adj_close"}"#)
                .unwrap();
        assert_eq!(config.periods_per_year, 12);
        assert_eq!(config.price_field, PriceField::AdjClose);
        assert_eq!(config.alpha, 0.05);
    }

    #[test]
    fn rejects_bad_values() {
        for alpha in [0.0, 1.0, -0.1, f64::NAN] {
            let config = AnalysisConfig {
                alpha,
                ..Default::default()
            };
            assert!(matches!(
                config.validate(),
                Err(AnalysisError::InvalidParameter(_))
            ));
        }
        let config = AnalysisConfig {
            periods_per_year: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
        let config = AnalysisConfig {
            risk_free_rate: f64::INFINITY,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
