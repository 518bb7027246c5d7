//! End-to-end profile of a hand-computed fixture.
//!
//! Three complete years (2019-2021) of quarterly payments plus a partial 2022.
//! Expected values were worked out by hand from `dividend / price * 100`.

use chrono::NaiveDate;
use yieldlab_core::data::{DataSource, MarketData, StaticProvider};
use yieldlab_core::domain::{DividendPayment, DividendPaymentSeries, PricePoint, PriceSeries};
use yieldlab_core::{AnalysisConfig, AnalysisError, DividendAsset};

const EPS: f64 = 1e-6;

const PAYMENTS: &[(i32, u32, f64, f64)] = &[
    (2019, 3, 50.0, 0.50),
    (2019, 6, 52.0, 0.52),
    (2019, 9, 48.0, 0.60),
    (2019, 12, 50.0, 0.55),
    (2020, 3, 40.0, 0.55),
    (2020, 6, 35.0, 0.50),
    (2020, 9, 38.0, 0.50),
    (2020, 12, 42.0, 0.52),
    (2021, 3, 45.0, 0.50),
    (2021, 6, 46.0, 0.50),
    (2021, 9, 47.0, 0.51),
    (2021, 12, 48.0, 0.52),
    (2022, 3, 44.0, 0.53),
    (2022, 6, 43.0, 0.53),
];

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn fixture() -> MarketData {
    let mut prices = Vec::new();
    let mut payments = Vec::new();
    for &(year, month, price, amount) in PAYMENTS {
        // Non-payment days around each payment must not leak into the join
        prices.push(PricePoint::new(date(year, month, 14), price + 1.0));
        prices.push(PricePoint::new(date(year, month, 15), price));
        prices.push(PricePoint::new(date(year, month, 16), price - 1.0));
        payments.push(DividendPayment {
            date: date(year, month, 15),
            amount,
        });
    }
    MarketData {
        ticker: "FIXT".into(),
        prices: PriceSeries::new(prices),
        dividends: DividendPaymentSeries::new(payments),
        source: DataSource::Fixture,
    }
}

fn profile() -> DividendAsset {
    DividendAsset::from_market_data(fixture(), &AnalysisConfig::default(), None).unwrap()
}

#[test]
fn quarterly_yields_match_hand_computation() {
    let asset = profile();
    let expected = [
        1.0,
        1.0,
        1.25,
        1.1,
        1.375,
        1.428_571_428_6,
        1.315_789_473_7,
        1.238_095_238_1,
        1.111_111_111_1,
        1.086_956_521_7,
        1.085_106_383_0,
        1.083_333_333_3,
        1.204_545_454_5,
        1.232_558_139_5,
    ];
    let actual = asset.yields().values();
    assert_eq!(actual.len(), expected.len());
    for (a, e) in actual.iter().zip(expected) {
        assert!((a - e).abs() < EPS, "{a} vs {e}");
    }
}

#[test]
fn partial_year_is_excluded_from_annual_yields() {
    let asset = profile();
    let annual = asset.annual_yields();
    assert_eq!(annual.years(), vec![2019, 2020, 2021]);
    assert!((annual.get(2019).unwrap() - 4.35).abs() < EPS);
    assert!((annual.get(2020).unwrap() - 5.357_456_140_4).abs() < EPS);
    assert!((annual.get(2021).unwrap() - 4.366_507_349_2).abs() < EPS);
    assert_eq!(annual.get(2022), None);
}

#[test]
fn drawdowns_match_hand_computation() {
    let dd = profile().drawdowns();
    assert!((dd.max_quarterly_drawdown - 0.15).abs() < EPS);
    assert!((dd.max_annual_drawdown - 0.991).abs() < EPS);
}

#[test]
fn volatility_matches_hand_computation() {
    let asset = profile();
    let vol = asset.volatility();
    assert!((vol.standard_deviation - 0.576_948_853_0).abs() < EPS);

    let changes: Vec<Option<f64>> = vol.percent_change.iter().map(|p| p.change).collect();
    assert_eq!(changes.len(), 3);
    assert_eq!(changes[0], None);
    assert!((changes[1].unwrap() - 0.231_599_112_7).abs() < EPS);
    assert!((changes[2].unwrap() - -0.184_966_290_9).abs() < EPS);
}

#[test]
fn normality_report_is_deterministic() {
    let a = profile();
    let b = profile();
    assert_eq!(a.normality(), b.normality());
    assert_eq!(a.warnings(), b.warnings());
    for row in a.normality().rows() {
        assert_eq!(row.is_gaussian, row.p_value > row.alpha);
    }
}

#[test]
fn fetch_through_provider_gives_same_profile() {
    let provider = StaticProvider::default().with(fixture());
    let fetched =
        DividendAsset::fetch("FIXT", &provider, &AnalysisConfig::default(), None).unwrap();
    assert_eq!(fetched.annual_yields(), profile().annual_yields());
}

#[test]
fn no_overlap_between_prices_and_dividends_fails() {
    let mut data = fixture();
    data.dividends = DividendPaymentSeries::new(vec![DividendPayment {
        date: date(2030, 1, 1),
        amount: 1.0,
    }]);
    let err = DividendAsset::from_market_data(data, &AnalysisConfig::default(), None).unwrap_err();
    assert!(matches!(err, AnalysisError::InsufficientData(_)));
}

#[test]
fn year_with_extra_payments_is_dropped() {
    let mut data = fixture();
    let mut payments = data.dividends.payments().to_vec();
    let mut prices = data.prices.points().to_vec();
    for month in [1, 2] {
        prices.push(PricePoint::new(date(2020, month, 15), 40.0));
        payments.push(DividendPayment {
            date: date(2020, month, 15),
            amount: 0.1,
        });
    }
    data.prices = PriceSeries::new(prices);
    data.dividends = DividendPaymentSeries::new(payments);

    let builder = AnalysisConfig::default().yield_builder();
    let yields = builder
        .build_yield_series(&data.prices, &data.dividends)
        .unwrap();
    assert_eq!(yields.len(), 16);
    assert_eq!(builder.build_annual_yield_series(&yields).years(), vec![2019, 2021]);

    // Two surviving years are too few for the normality tests
    let err = DividendAsset::from_market_data(data, &AnalysisConfig::default(), None).unwrap_err();
    assert!(matches!(err, AnalysisError::InsufficientData(_)));
}
