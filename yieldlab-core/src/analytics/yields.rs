//! Yield series construction.
//!
//! Joins prices with dividend payments into a per-payment percentage yield,
//! then rolls that up into calendar-year totals. Years without full payment
//! coverage are dropped so a partial year never looks like a yield cut.

use std::collections::{BTreeMap, HashMap};

use chrono::Datelike;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{
    AnnualYield, AnnualYieldSeries, DividendPaymentSeries, PriceField, PriceSeries, YieldPoint,
    YieldSeries,
};
use crate::error::AnalysisError;

/// Number of payments a quarterly payer makes per year.
pub const QUARTERLY_PERIODS: usize = 4;

/// Builds yield series from raw price and dividend data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YieldSeriesBuilder {
    pub price_field: PriceField,
    /// A year is kept only if exactly this many payments were observed.
    pub periods_per_year: usize,
}

impl Default for YieldSeriesBuilder {
    fn default() -> Self {
        Self {
            price_field: PriceField::Close,
            periods_per_year: QUARTERLY_PERIODS,
        }
    }
}

impl YieldSeriesBuilder {
    pub fn new(price_field: PriceField, periods_per_year: usize) -> Self {
        Self {
            price_field,
            periods_per_year,
        }
    }

    /// Inner-join prices and dividends on date and compute `dividend / price * 100`.
    ///
    /// Prices that are non-finite or not strictly positive are skipped before the
    /// join, as are non-finite dividend amounts. A payment on a date with no
    /// usable price is dropped. Fails if no payment date survives.
    pub fn build_yield_series(
        &self,
        prices: &PriceSeries,
        dividends: &DividendPaymentSeries,
    ) -> Result<YieldSeries, AnalysisError> {
        let by_date: BTreeMap<_, f64> = prices
            .points()
            .iter()
            .map(|p| (p.date, p.price(self.price_field)))
            .filter(|(_, price)| price.is_finite() && *price > 0.0)
            .collect();

        let points: Vec<YieldPoint> = dividends
            .payments()
            .iter()
            .filter(|payment| payment.amount.is_finite())
            .filter_map(|payment| {
                by_date.get(&payment.date).map(|&price| YieldPoint {
                    date: payment.date,
                    price,
                    dividend: payment.amount,
                    percent_yield: payment.amount / price * 100.0,
                })
            })
            .collect();

        if points.is_empty() {
            return Err(AnalysisError::insufficient(format!(
                "no overlapping dates between {} prices and {} dividend payments",
                prices.len(),
                dividends.len()
            )));
        }

        let dropped = dividends.len() - points.len();
        if dropped > 0 {
            debug!(dropped, "dividend payments without a matching price were dropped");
        }

        Ok(YieldSeries::new(points))
    }

    /// Sum yields per calendar year, keeping only years with exactly
    /// `periods_per_year` observations. May return an empty series.
    pub fn build_annual_yield_series(&self, yields: &YieldSeries) -> AnnualYieldSeries {
        let mut totals: BTreeMap<i32, f64> = BTreeMap::new();
        let mut counts: HashMap<i32, usize> = HashMap::new();

        for point in yields.points() {
            let year = point.date.year();
            *totals.entry(year).or_insert(0.0) += point.percent_yield;
            *counts.entry(year).or_insert(0) += 1;
        }

        let points: Vec<AnnualYield> = totals
            .into_iter()
            .filter(|(year, _)| {
                let observed = counts.get(year).copied().unwrap_or(0);
                let complete = observed == self.periods_per_year;
                if !complete {
                    debug!(
                        year,
                        observed,
                        expected = self.periods_per_year,
                        "dropping incomplete year"
                    );
                }
                complete
            })
            .map(|(year, percent_yield)| AnnualYield {
                year,
                percent_yield,
            })
            .collect();

        AnnualYieldSeries::new(points)
    }
}
