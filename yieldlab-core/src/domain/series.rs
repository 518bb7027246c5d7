//! Time-indexed series: prices, dividend payments, and the yields derived from them.
//!
//! Every series keeps its points sorted ascending by date (or year). Constructors
//! sort their input, so downstream code can rely on ordering without re-checking.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single price observation.
///
/// `adj_close` is optional because not every provider reports it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adj_close: Option<f64>,
}

impl PricePoint {
    pub fn new(date: NaiveDate, close: f64) -> Self {
        Self {
            date,
            close,
            adj_close: None,
        }
    }

    /// Returns the price for the requested field, falling back to `close`
    /// when the adjusted close is missing.
    pub fn price(&self, field: PriceField) -> f64 {
        match field {
            PriceField::Close => self.close,
            PriceField::AdjClose => self.adj_close.unwrap_or(self.close),
        }
    }
}

/// Which price column feeds the yield computation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceField {
    #[default]
    Close,
    AdjClose,
}

/// Date-sorted closing prices for one ticker.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new(mut points: Vec<PricePoint>) -> Self {
        points.sort_by_key(|p| p.date);
        Self { points }
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }
}

/// One dividend payment on its ex-date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DividendPayment {
    pub date: NaiveDate,
    pub amount: f64,
}

/// Sparse, date-sorted dividend payments for one ticker.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DividendPaymentSeries {
    payments: Vec<DividendPayment>,
}

impl DividendPaymentSeries {
    pub fn new(mut payments: Vec<DividendPayment>) -> Self {
        payments.sort_by_key(|p| p.date);
        Self { payments }
    }

    pub fn payments(&self) -> &[DividendPayment] {
        &self.payments
    }

    pub fn len(&self) -> usize {
        self.payments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payments.is_empty()
    }
}

/// A payment date joined with the price on that date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YieldPoint {
    pub date: NaiveDate,
    pub price: f64,
    pub dividend: f64,
    /// `dividend / price * 100`
    pub percent_yield: f64,
}

/// Per-payment percentage yield, sorted by date.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct YieldSeries {
    points: Vec<YieldPoint>,
}

impl YieldSeries {
    pub fn new(mut points: Vec<YieldPoint>) -> Self {
        points.sort_by_key(|p| p.date);
        Self { points }
    }

    pub fn points(&self) -> &[YieldPoint] {
        &self.points
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.percent_yield).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Summed percentage yield for one calendar year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnnualYield {
    pub year: i32,
    pub percent_yield: f64,
}

/// Year-sorted annual yields. Only years with complete payment coverage survive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnualYieldSeries {
    points: Vec<AnnualYield>,
}

impl AnnualYieldSeries {
    pub fn new(mut points: Vec<AnnualYield>) -> Self {
        points.sort_by_key(|p| p.year);
        Self { points }
    }

    pub fn points(&self) -> &[AnnualYield] {
        &self.points
    }

    pub fn years(&self) -> Vec<i32> {
        self.points.iter().map(|p| p.year).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.percent_yield).collect()
    }

    pub fn get(&self, year: i32) -> Option<f64> {
        self.points
            .binary_search_by_key(&year, |p| p.year)
            .ok()
            .map(|i| self.points[i].percent_yield)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn price_series_sorts_on_construction() {
        let series = PriceSeries::new(vec![
            PricePoint::new(d(2024, 3, 1), 11.0),
            PricePoint::new(d(2024, 1, 1), 10.0),
        ]);
        assert_eq!(series.first_date(), Some(d(2024, 1, 1)));
        assert_eq!(series.last_date(), Some(d(2024, 3, 1)));
    }

    #[test]
    fn adj_close_falls_back_to_close() {
        let mut p = PricePoint::new(d(2024, 1, 2), 50.0);
        assert_eq!(p.price(PriceField::AdjClose), 50.0);
        p.adj_close = Some(48.5);
        assert_eq!(p.price(PriceField::AdjClose), 48.5);
        assert_eq!(p.price(PriceField::Close), 50.0);
    }

    #[test]
    fn annual_series_lookup_by_year() {
        let series = AnnualYieldSeries::new(vec![
            AnnualYield {
                year: 2022,
                percent_yield: 4.0,
            },
            AnnualYield {
                year: 2020,
                percent_yield: 3.0,
            },
        ]);
        assert_eq!(series.years(), vec![2020, 2022]);
        assert_eq!(series.get(2022), Some(4.0));
        assert_eq!(series.get(2021), None);
    }
}
