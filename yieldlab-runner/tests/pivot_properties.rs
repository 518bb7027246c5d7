//! Property tests for comparison pivots.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use proptest::prelude::*;
use yieldlab_core::data::{DataSource, MarketData, StaticProvider};
use yieldlab_core::domain::{DividendPayment, DividendPaymentSeries, PricePoint, PriceSeries};
use yieldlab_core::AnalysisConfig;
use yieldlab_runner::AssetComparisonAggregator;

fn payer(ticker: &str, first_year: i32, years: usize) -> MarketData {
    let mut prices = Vec::new();
    let mut payments = Vec::new();
    for (i, year) in (first_year..first_year + years as i32).enumerate() {
        for month in [3, 6, 9, 12] {
            let date = NaiveDate::from_ymd_opt(year, month, 1).unwrap();
            prices.push(PricePoint::new(date, 20.0 + (i * i) as f64));
            payments.push(DividendPayment { date, amount: 0.4 });
        }
    }
    MarketData {
        ticker: ticker.into(),
        prices: PriceSeries::new(prices),
        dividends: DividendPaymentSeries::new(payments),
        source: DataSource::Fixture,
    }
}

/// (first year, number of years) per ticker.
fn arb_spans() -> impl Strategy<Value = Vec<(i32, usize)>> {
    prop::collection::vec((1990i32..2020, 3usize..7), 1..5)
}

proptest! {
    #[test]
    fn year_axis_is_sorted_union(spans in arb_spans()) {
        let tickers: Vec<String> = (0..spans.len()).map(|i| format!("T{i}")).collect();
        let provider = StaticProvider::new(
            tickers
                .iter()
                .zip(&spans)
                .map(|(t, &(first, n))| payer(t, first, n))
                .collect(),
        );

        let cmp = AssetComparisonAggregator::new(
            &tickers,
            &provider,
            &AnalysisConfig::default(),
            true,
            None,
        )
        .unwrap();
        let table = cmp.aggregate_annual_yields();

        let expected: BTreeSet<i32> = spans
            .iter()
            .flat_map(|&(first, n)| first..first + n as i32)
            .collect();
        prop_assert_eq!(table.years(), expected.into_iter().collect::<Vec<_>>());
        prop_assert_eq!(table.tickers().to_vec(), tickers.clone());

        for (t, &(first, n)) in tickers.iter().zip(&spans) {
            let filled = table
                .years()
                .into_iter()
                .filter(|&y| table.get(t, y).is_some())
                .count();
            prop_assert_eq!(filled, n);
            prop_assert!(table.get(t, first - 1).is_none());
        }
    }
}
