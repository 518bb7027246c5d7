use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::NaiveDate;
use yieldlab_core::data::{
    DataSource, MarketData, MarketDataProvider, ProviderError, StaticProvider,
};
use yieldlab_core::domain::{DividendPayment, DividendPaymentSeries, PricePoint, PriceSeries};
use yieldlab_core::{AnalysisConfig, AnalysisError};
use yieldlab_runner::{AssetComparisonAggregator, CompareError, ComparisonConfig};

/// Quarterly payer: one flat price per year, fixed 0.5 payments.
fn payer(ticker: &str, years: &[(i32, f64)]) -> MarketData {
    let mut prices = Vec::new();
    let mut payments = Vec::new();
    for &(year, price) in years {
        for month in [2, 5, 8, 11] {
            let date = NaiveDate::from_ymd_opt(year, month, 10).unwrap();
            prices.push(PricePoint::new(date, price));
            payments.push(DividendPayment { date, amount: 0.5 });
        }
    }
    MarketData {
        ticker: ticker.into(),
        prices: PriceSeries::new(prices),
        dividends: DividendPaymentSeries::new(payments),
        source: DataSource::Fixture,
    }
}

fn provider() -> StaticProvider {
    StaticProvider::default()
        .with(payer("OLD", &[(2010, 50.0), (2011, 40.0), (2012, 25.0)]))
        .with(payer("NEW", &[(2020, 20.0), (2021, 25.0), (2022, 40.0)]))
        .with(payer("MID", &[(2011, 25.0), (2012, 50.0), (2013, 40.0)]))
}

/// Counts fetches so duplicate handling can be observed.
struct Counting {
    inner: StaticProvider,
    calls: AtomicUsize,
}

impl MarketDataProvider for Counting {
    fn name(&self) -> &str {
        "counting"
    }

    fn fetch(&self, ticker: &str) -> Result<MarketData, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.fetch(ticker)
    }
}

#[test]
fn disjoint_years_form_sorted_union_with_gaps() {
    let cmp = AssetComparisonAggregator::new(
        &["NEW", "OLD"],
        &provider(),
        &AnalysisConfig::default(),
        false,
        None,
    )
    .unwrap();

    let table = cmp.aggregate_annual_yields();
    assert_eq!(table.tickers().to_vec(), vec!["NEW", "OLD"]);
    assert_eq!(table.years(), vec![2010, 2011, 2012, 2020, 2021, 2022]);
    assert_eq!(table.get("OLD", 2020), None);
    assert_eq!(table.get("NEW", 2010), None);
    assert!((table.get("OLD", 2011).unwrap() - 5.0).abs() < 1e-9);
    assert!((table.get("NEW", 2020).unwrap() - 10.0).abs() < 1e-9);

    for (_, row) in table.rows() {
        assert_eq!(row.iter().filter(|c| c.is_some()).count(), 1);
    }
}

#[test]
fn percent_changes_leave_first_year_empty() {
    let cmp = AssetComparisonAggregator::new(
        &["OLD", "MID"],
        &provider(),
        &AnalysisConfig::default(),
        false,
        None,
    )
    .unwrap();

    let table = cmp.aggregate_percent_changes();
    assert_eq!(table.years(), vec![2010, 2011, 2012, 2013]);
    assert_eq!(table.get("OLD", 2010), None);
    assert_eq!(table.get("MID", 2011), None);
    // 4% -> 5%
    assert!((table.get("OLD", 2011).unwrap() - 0.25).abs() < 1e-9);
    // 8% -> 4%
    assert!((table.get("MID", 2012).unwrap() - -0.5).abs() < 1e-9);
}

#[test]
fn drawdowns_and_std_devs_keyed_by_ticker() {
    let cmp = AssetComparisonAggregator::new(
        &["MID", "OLD"],
        &provider(),
        &AnalysisConfig::default(),
        false,
        None,
    )
    .unwrap();

    let table = cmp.comparison_table();
    let order: Vec<&str> = table.max_annual_drawdowns.iter().map(|(t, _)| t).collect();
    assert_eq!(order, vec!["MID", "OLD"]);
    // MID annual: 8, 4, 5
    assert!((table.max_annual_drawdowns.get("MID").unwrap() - 4.0).abs() < 1e-9);
    // OLD annual: 4, 5, 8
    assert!((table.max_annual_drawdowns.get("OLD").unwrap() - -1.0).abs() < 1e-9);
    let expected_std = (13.0_f64 / 3.0).sqrt();
    assert!((table.standard_deviations.get("OLD").unwrap() - expected_std).abs() < 1e-9);
    assert!((table.standard_deviations.get("MID").unwrap() - expected_std).abs() < 1e-9);
}

#[test]
fn sharpe_ratios_come_from_price_returns() {
    let cmp = AssetComparisonAggregator::new(
        &["OLD", "MID"],
        &provider(),
        &AnalysisConfig::default(),
        false,
        None,
    )
    .unwrap();

    let sharpe = cmp.aggregate_sharpe_ratios();
    let order: Vec<&str> = sharpe.iter().map(|(t, _)| t).collect();
    assert_eq!(order, vec!["OLD", "MID"]);

    // OLD prices 50, 40, 25 (four each): returns 0, -0.2, -0.5
    let mean = -0.7 / 3.0;
    let std = (456.0 / 900.0 / 11.0_f64).sqrt();
    assert!((sharpe.get("OLD").unwrap() - (mean - 0.023) / std).abs() < 1e-9);

    let old = &cmp.assets()[0];
    assert_eq!(old.returns().latest_price, 25.0);
    assert_eq!(cmp.comparison_table().sharpe_ratios, sharpe);
}

#[test]
fn failing_ticker_is_isolated() {
    let cmp = AssetComparisonAggregator::new(
        &["OLD", "MISSING", "NEW"],
        &provider(),
        &AnalysisConfig::default(),
        false,
        None,
    )
    .unwrap();

    assert_eq!(cmp.tickers(), vec!["OLD", "NEW"]);
    assert_eq!(cmp.failures().len(), 1);
    assert_eq!(cmp.failures()[0].ticker, "MISSING");
    assert!(matches!(
        cmp.failures()[0].error,
        AnalysisError::Provider(ProviderError::NotFound { .. })
    ));
}

#[test]
fn strict_mode_aborts_on_first_failure() {
    let err = AssetComparisonAggregator::new(
        &["OLD", "MISSING", "NEW"],
        &provider(),
        &AnalysisConfig::default(),
        true,
        None,
    )
    .unwrap_err();

    assert!(matches!(err, CompareError::Asset { ref ticker, .. } if ticker == "MISSING"));
}

#[test]
fn duplicate_tickers_are_fetched_once() {
    let counting = Counting {
        inner: provider(),
        calls: AtomicUsize::new(0),
    };
    let cmp = AssetComparisonAggregator::new(
        &["OLD", "NEW", "old"],
        &counting,
        &AnalysisConfig::default(),
        false,
        None,
    )
    .unwrap();

    assert_eq!(counting.calls.load(Ordering::SeqCst), 2);
    assert_eq!(cmp.tickers(), vec!["OLD", "NEW"]);
}

#[test]
fn invalid_alpha_is_rejected_before_fetching() {
    let config = AnalysisConfig {
        alpha: 2.0,
        ..Default::default()
    };
    assert!(matches!(
        AssetComparisonAggregator::new(&["OLD"], &provider(), &config, false, None),
        Err(CompareError::InvalidConfig(_))
    ));
}

#[test]
fn csv_directory_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let mut prices = String::from("date,close\n");
    let mut dividends = String::from("date,amount\n");
    for (year, price) in [(2018, 50.0), (2019, 40.0), (2020, 25.0)] {
        for month in [3, 6, 9, 12] {
            prices.push_str(&format!("{year}-{month:02}-15,{price}\n"));
            prices.push_str(&format!("{year}-{month:02}-16,{}\n", price + 1.0));
            dividends.push_str(&format!("{year}-{month:02}-15,0.5\n"));
        }
    }
    std::fs::write(dir.path().join("CSVT_prices.csv"), prices).unwrap();
    std::fs::write(dir.path().join("CSVT_dividends.csv"), dividends).unwrap();

    let config_path = dir.path().join("compare.toml");
    std::fs::write(
        &config_path,
        format!(
            "tickers = [\"CSVT\"]\n[provider]\nkind = \"csv\"\ncsv_dir = {:?}\n",
            dir.path().display().to_string()
        ),
    )
    .unwrap();

    let config = ComparisonConfig::from_file(&config_path).unwrap();
    config.validate().unwrap();
    let provider = config.provider.build().unwrap();
    let cmp = AssetComparisonAggregator::new(
        &config.tickers,
        provider.as_ref(),
        &config.analysis,
        config.strict,
        None,
    )
    .unwrap();

    let asset = &cmp.assets()[0];
    assert_eq!(asset.profile().source, DataSource::CsvImport);
    assert_eq!(asset.annual_yields().years(), vec![2018, 2019, 2020]);
    assert!((asset.annual_yields().get(2020).unwrap() - 8.0).abs() < 1e-9);
}
