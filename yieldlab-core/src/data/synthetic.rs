//! Synthetic market data for offline runs and demos.
//!
//! Produces a business-day random walk with one payment per quarter. The seed
//! is derived from the ticker, so the same ticker always gets the same history.
//! Results built on synthetic data are tagged `DataSource::Synthetic`.

use chrono::{Datelike, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::provider::{DataSource, MarketData, MarketDataProvider, ProviderError};
use crate::domain::{DividendPayment, DividendPaymentSeries, PricePoint, PriceSeries};

/// Months in which the synthetic payer distributes.
const PAYMENT_MONTHS: [u32; 4] = [3, 6, 9, 12];

#[derive(Debug, Clone)]
pub struct SyntheticProvider {
    first_year: i32,
    last_year: i32,
    seed: u64,
}

impl SyntheticProvider {
    /// Generate `years` full calendar years ending with `last_year`.
    pub fn new(last_year: i32, years: u32, seed: u64) -> Self {
        let span = years.max(1) as i32;
        Self {
            first_year: last_year - span + 1,
            last_year,
            seed,
        }
    }

    fn rng_for(&self, ticker: &str) -> StdRng {
        let mut hasher = blake3::Hasher::new();
        hasher.update(ticker.to_uppercase().as_bytes());
        hasher.update(&self.seed.to_le_bytes());
        StdRng::from_seed(*hasher.finalize().as_bytes())
    }

    fn generate(&self, ticker: &str) -> Option<(PriceSeries, DividendPaymentSeries)> {
        let mut rng = self.rng_for(ticker);
        let start = NaiveDate::from_ymd_opt(self.first_year, 1, 1)?;
        let end = NaiveDate::from_ymd_opt(self.last_year, 12, 31)?;

        let mut price = rng.gen_range(20.0..80.0_f64);
        let base_yield = rng.gen_range(0.005..0.015_f64);
        let mut prices = Vec::new();
        let mut payments = Vec::new();
        let mut paid_month: Option<(i32, u32)> = None;

        let mut current = start;
        while current <= end {
            if matches!(current.weekday(), Weekday::Sat | Weekday::Sun) {
                current = current.succ_opt()?;
                continue;
            }

            price *= 1.0 + rng.gen_range(-0.015..0.015);
            prices.push(PricePoint::new(current, price));

            let key = (current.year(), current.month());
            if PAYMENT_MONTHS.contains(&current.month())
                && current.day() >= 20
                && paid_month != Some(key)
            {
                let amount = price * base_yield * rng.gen_range(0.85..1.15);
                payments.push(DividendPayment {
                    date: current,
                    amount: (amount * 10_000.0).round() / 10_000.0,
                });
                paid_month = Some(key);
            }

            current = current.succ_opt()?;
        }

        Some((PriceSeries::new(prices), DividendPaymentSeries::new(payments)))
    }
}

impl MarketDataProvider for SyntheticProvider {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn fetch(&self, ticker: &str) -> Result<MarketData, ProviderError> {
        let (prices, dividends) = self.generate(ticker).ok_or_else(|| {
            ProviderError::DataUnavailable(format!(
                "cannot generate synthetic history for {}..={}",
                self.first_year, self.last_year
            ))
        })?;
        Ok(MarketData {
            ticker: ticker.to_uppercase(),
            prices,
            dividends,
            source: DataSource::Synthetic,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn four_payments_per_year() {
        let data = SyntheticProvider::new(2023, 3, 7).fetch("DEMO").unwrap();
        assert_eq!(data.dividends.len(), 12);
        for year in 2021..=2023 {
            let n = data
                .dividends
                .payments()
                .iter()
                .filter(|p| p.date.year() == year)
                .count();
            assert_eq!(n, 4, "year {year}");
        }
    }

    #[test]
    fn payment_dates_have_prices() {
        let data = SyntheticProvider::new(2023, 2, 1).fetch("DEMO").unwrap();
        for p in data.dividends.payments() {
            assert!(data.prices.points().iter().any(|q| q.date == p.date));
        }
    }

    #[test]
    fn deterministic_per_ticker() {
        let provider = SyntheticProvider::new(2022, 2, 42);
        assert_eq!(provider.fetch("A").unwrap(), provider.fetch("a").unwrap());
        assert_ne!(
            provider.fetch("A").unwrap().prices,
            provider.fetch("B").unwrap().prices
        );
    }
}
