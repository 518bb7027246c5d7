//! Yahoo Finance market data provider.
//!
//! Fetches daily prices and dividend events from Yahoo's v8 chart API in one
//! request (`events=div`). Handles rate limiting, retries with exponential
//! backoff, response parsing, and the circuit breaker.
//!
//! Yahoo Finance has no official API and is subject to unannounced format changes.
//! The CSV provider is the fallback when Yahoo is unavailable.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, NaiveTime};
use reqwest::Url;
use serde::Deserialize;
use tracing::{debug, warn};

use super::circuit_breaker::CircuitBreaker;
use super::provider::{DataSource, MarketData, MarketDataProvider, ProviderError};
use crate::domain::{DividendPayment, DividendPaymentSeries, PricePoint, PriceSeries};

const CHART_BASE_URL: &str = "https://query2.finance.yahoo.com/v8/finance/chart/";

/// Yahoo Finance v8 chart API response.
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
    events: Option<Events>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
    adjclose: Option<Vec<AdjCloseData>>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    close: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct AdjCloseData {
    adjclose: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct Events {
    dividends: Option<HashMap<String, DividendEvent>>,
}

#[derive(Debug, Deserialize)]
struct DividendEvent {
    amount: f64,
    date: i64,
}

/// Earliest date requested when no explicit start is configured.
pub fn epoch_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default()
}

/// Yahoo Finance market data provider.
pub struct YahooProvider {
    client: reqwest::blocking::Client,
    circuit_breaker: Arc<CircuitBreaker>,
    max_retries: u32,
    base_delay: Duration,
    history_start: NaiveDate,
}

impl YahooProvider {
    /// Build a provider whose requests time out after `timeout`.
    pub fn new(
        circuit_breaker: Arc<CircuitBreaker>,
        timeout: Duration,
        max_retries: u32,
    ) -> Result<Self, ProviderError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .map_err(|e| ProviderError::DataUnavailable(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            circuit_breaker,
            max_retries,
            base_delay: Duration::from_millis(500),
            history_start: epoch_start(),
        })
    }

    /// Only request history from `start` onward.
    pub fn with_history_start(mut self, start: NaiveDate) -> Self {
        self.history_start = start;
        self
    }

    /// Build the chart API URL for a ticker, from `start` through today.
    ///
    /// The ticker is a single percent-encoded path segment.
    fn chart_url(ticker: &str, start: NaiveDate) -> Result<Url, ProviderError> {
        let start_ts = start.and_time(NaiveTime::MIN).and_utc().timestamp();
        let end_ts = chrono::Utc::now().timestamp();

        let mut url = Url::parse(CHART_BASE_URL)
            .map_err(|e| ProviderError::DataUnavailable(format!("invalid chart URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|()| ProviderError::DataUnavailable("chart URL has no path".into()))?
            .pop_if_empty()
            .push(ticker);
        url.query_pairs_mut()
            .append_pair("period1", &start_ts.to_string())
            .append_pair("period2", &end_ts.to_string())
            .append_pair("interval", "1d")
            .append_pair("events", "div")
            .append_pair("includeAdjustedClose", "true");
        Ok(url)
    }

    fn to_date(ts: i64) -> Result<NaiveDate, ProviderError> {
        chrono::DateTime::from_timestamp(ts, 0)
            .map(|dt| dt.naive_utc().date())
            .ok_or_else(|| ProviderError::ResponseFormatChanged(format!("invalid timestamp: {ts}")))
    }

    /// Parse the chart API response into price and dividend series.
    fn parse_response(
        ticker: &str,
        resp: ChartResponse,
    ) -> Result<(PriceSeries, DividendPaymentSeries), ProviderError> {
        let result = resp.chart.result.ok_or_else(|| match resp.chart.error {
            Some(err) if err.code == "Not Found" => ProviderError::NotFound {
                ticker: ticker.to_string(),
            },
            Some(err) => {
                ProviderError::ResponseFormatChanged(format!("{}: {}", err.code, err.description))
            }
            None => ProviderError::ResponseFormatChanged("empty result with no error".into()),
        })?;

        let data = result
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::ResponseFormatChanged("result array is empty".into()))?;

        let timestamps = data
            .timestamp
            .ok_or_else(|| ProviderError::ResponseFormatChanged("no timestamps".into()))?;

        let quote = data
            .indicators
            .quote
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::ResponseFormatChanged("no quote data".into()))?;

        let adj_closes = data
            .indicators
            .adjclose
            .and_then(|v| v.into_iter().next())
            .map(|a| a.adjclose);

        let mut prices = Vec::with_capacity(timestamps.len());
        for (i, &ts) in timestamps.iter().enumerate() {
            // Holidays and halted sessions come back as null closes
            let Some(close) = quote.close.get(i).copied().flatten() else {
                continue;
            };
            let adj_close = adj_closes
                .as_ref()
                .and_then(|v| v.get(i).copied().flatten());
            prices.push(PricePoint {
                date: Self::to_date(ts)?,
                close,
                adj_close,
            });
        }

        if prices.is_empty() {
            return Err(ProviderError::NotFound {
                ticker: ticker.to_string(),
            });
        }

        let mut payments = Vec::new();
        if let Some(dividends) = data.events.and_then(|e| e.dividends) {
            for event in dividends.into_values() {
                payments.push(DividendPayment {
                    date: Self::to_date(event.date)?,
                    amount: event.amount,
                });
            }
        }

        Ok((PriceSeries::new(prices), DividendPaymentSeries::new(payments)))
    }

    /// Execute the request with retry and circuit breaker logic.
    fn fetch_with_retry(
        &self,
        ticker: &str,
    ) -> Result<(PriceSeries, DividendPaymentSeries), ProviderError> {
        if !self.circuit_breaker.is_allowed() {
            return Err(ProviderError::CircuitBreakerTripped);
        }

        let url = Self::chart_url(ticker, self.history_start)?;
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = self.base_delay * 2u32.pow(attempt - 1);
                debug!(ticker, attempt, ?delay, "retrying Yahoo request");
                std::thread::sleep(delay);
            }

            if !self.circuit_breaker.is_allowed() {
                return Err(ProviderError::CircuitBreakerTripped);
            }

            let resp = match self.client.get(url.clone()).send() {
                Ok(resp) => resp,
                Err(e) if e.is_connect() || e.is_timeout() => {
                    warn!(ticker, error = %e, "Yahoo request failed");
                    last_error = Some(ProviderError::DataUnavailable(e.to_string()));
                    continue;
                }
                Err(e) => return Err(ProviderError::DataUnavailable(e.to_string())),
            };

            let status = resp.status();

            if status == reqwest::StatusCode::FORBIDDEN {
                self.circuit_breaker.trip();
                return Err(ProviderError::CircuitBreakerTripped);
            }

            if status == reqwest::StatusCode::NOT_FOUND {
                return Err(ProviderError::NotFound {
                    ticker: ticker.to_string(),
                });
            }

            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                self.circuit_breaker.record_failure();
                let retry_after = resp
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(60);
                last_error = Some(ProviderError::RateLimited {
                    retry_after_secs: retry_after,
                });
                continue;
            }

            if !status.is_success() {
                self.circuit_breaker.record_failure();
                last_error = Some(ProviderError::DataUnavailable(format!(
                    "HTTP {status} for {ticker}"
                )));
                continue;
            }

            let chart: ChartResponse = resp.json().map_err(|e| {
                ProviderError::ResponseFormatChanged(format!(
                    "failed to parse response for {ticker}: {e}"
                ))
            })?;

            let parsed = Self::parse_response(ticker, chart)?;
            self.circuit_breaker.record_success();
            return Ok(parsed);
        }

        Err(last_error.unwrap_or_else(|| ProviderError::DataUnavailable("max retries exceeded".into())))
    }
}

impl MarketDataProvider for YahooProvider {
    fn name(&self) -> &str {
        "yahoo_finance"
    }

    fn fetch(&self, ticker: &str) -> Result<MarketData, ProviderError> {
        let (prices, dividends) = self.fetch_with_retry(ticker)?;
        debug!(
            ticker,
            prices = prices.len(),
            dividends = dividends.len(),
            "fetched Yahoo history"
        );
        Ok(MarketData {
            ticker: ticker.to_string(),
            prices,
            dividends,
            source: DataSource::YahooFinance,
        })
    }

    fn is_available(&self) -> bool {
        self.circuit_breaker.is_allowed()
    }
}
