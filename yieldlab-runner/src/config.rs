//! Comparison run configuration, loaded from TOML.
//!
//! ```toml
//! tickers = ["SPYD", "SCHD", "VYM"]
//! strict = false
//!
//! [analysis]
//! alpha = 0.05
//! periods_per_year = 4
//!
//! [provider]
//! kind = "csv"
//! csv_dir = "data"
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use yieldlab_core::data::{
    CircuitBreaker, CsvProvider, MarketDataProvider, SyntheticProvider, YahooProvider,
};
use yieldlab_core::AnalysisConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Which market data provider to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Yahoo,
    Csv,
    Synthetic,
}

/// Provider selection and its settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub kind: ProviderKind,

    /// Directory holding `<TICKER>_prices.csv` and `<TICKER>_dividends.csv`.
    pub csv_dir: Option<PathBuf>,

    /// HTTP request timeout.
    pub timeout_secs: u64,

    /// Retries after a transient HTTP failure.
    pub max_retries: u32,

    /// Only request history from this date on (Yahoo).
    pub start: Option<NaiveDate>,

    /// Synthetic provider seed.
    pub seed: u64,

    /// Full calendar years of synthetic history.
    pub years: u32,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            kind: ProviderKind::Yahoo,
            csv_dir: None,
            timeout_secs: 30,
            max_retries: 3,
            start: None,
            seed: 42,
            years: 8,
        }
    }
}

impl ProviderConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.kind {
            ProviderKind::Csv if self.csv_dir.is_none() => Err(ConfigError::Invalid(
                "provider.kind = \"csv\" requires provider.csv_dir".into(),
            )),
            ProviderKind::Yahoo if self.timeout_secs == 0 => Err(ConfigError::Invalid(
                "provider.timeout_secs must be positive".into(),
            )),
            ProviderKind::Synthetic if self.years == 0 => Err(ConfigError::Invalid(
                "provider.years must be at least 1".into(),
            )),
            _ => Ok(()),
        }
    }

    /// Construct the configured provider.
    pub fn build(&self) -> Result<Box<dyn MarketDataProvider>, ConfigError> {
        self.validate()?;
        Ok(match self.kind {
            ProviderKind::Yahoo => {
                let breaker = Arc::new(CircuitBreaker::default_provider());
                let mut provider = YahooProvider::new(
                    breaker,
                    Duration::from_secs(self.timeout_secs),
                    self.max_retries,
                )
                .map_err(|e| ConfigError::Invalid(e.to_string()))?;
                if let Some(start) = self.start {
                    provider = provider.with_history_start(start);
                }
                Box::new(provider)
            }
            ProviderKind::Csv => {
                let dir = self.csv_dir.clone().unwrap_or_default();
                Box::new(CsvProvider::new(dir))
            }
            ProviderKind::Synthetic => {
                // Last complete calendar year
                let last_year = chrono::Local::now().year() - 1;
                Box::new(SyntheticProvider::new(last_year, self.years, self.seed))
            }
        })
    }
}

/// A multi-ticker comparison run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComparisonConfig {
    pub tickers: Vec<String>,

    /// Abort on the first ticker that fails.
    pub strict: bool,

    pub analysis: AnalysisConfig,

    pub provider: ProviderConfig,
}

impl ComparisonConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse without validating. Call [`validate`](Self::validate) once any
    /// command-line overrides have been applied.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tickers.is_empty() {
            return Err(ConfigError::Invalid("at least one ticker is required".into()));
        }
        if let Some(blank) = self.tickers.iter().find(|t| t.trim().is_empty()) {
            return Err(ConfigError::Invalid(format!("blank ticker: {blank:?}")));
        }
        self.analysis
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        self.provider.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use yieldlab_core::domain::PriceField;

    #[test]
    fn parses_full_file() {
        let config = ComparisonConfig::from_toml(
            r#"
            tickers = ["SPYD", "SCHD"]
            strict = true

            [analysis]
            alpha = 0.01
            periods_per_year = 12
            price_field = "adj_close"

            [provider]
            kind = "csv"
            csv_dir = "data"
            "#,
        )
        .unwrap();

        assert_eq!(config.tickers, vec!["SPYD", "SCHD"]);
        assert!(config.strict);
        assert_eq!(config.analysis.alpha, 0.01);
        assert_eq!(config.analysis.periods_per_year, 12);
        assert_eq!(config.analysis.price_field, PriceField::AdjClose);
        assert!(!config.analysis.plot);
        assert_eq!(config.provider.kind, ProviderKind::Csv);
        assert_eq!(config.provider.csv_dir, Some(PathBuf::from("data")));
        assert_eq!(config.provider.timeout_secs, 30);
        config.validate().unwrap();
    }

    #[test]
    fn empty_file_uses_defaults() {
        let config = ComparisonConfig::from_toml("").unwrap();
        assert_eq!(config, ComparisonConfig::default());
        assert_eq!(config.analysis, AnalysisConfig::default());
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn csv_without_dir_is_invalid() {
        let config = ComparisonConfig::from_toml(
            r#"
            tickers = ["A"]
            [provider]
            kind = "csv"
            "#,
        )
        .unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(msg)) if msg.contains("csv_dir")));
    }

    #[test]
    fn bad_alpha_is_invalid() {
        let config =
            ComparisonConfig::from_toml("tickers = [\"A\"]\n[analysis]\nalpha = 1.5\n").unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn unknown_provider_is_parse_error() {
        assert!(matches!(
            ComparisonConfig::from_toml("[provider]\nkind = \"bloomberg\"\n"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn toml_round_trip() {
        let config = ComparisonConfig {
            tickers: vec!["VYM".into()],
            ..Default::default()
        };
        let text = config.to_toml().unwrap();
        assert_eq!(ComparisonConfig::from_toml(&text).unwrap(), config);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            ComparisonConfig::from_file(&dir.path().join("nope.toml")),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn builds_synthetic_and_csv_providers() {
        let synthetic = ProviderConfig {
            kind: ProviderKind::Synthetic,
            ..Default::default()
        };
        assert_eq!(synthetic.build().unwrap().name(), "synthetic");

        let csv = ProviderConfig {
            kind: ProviderKind::Csv,
            csv_dir: Some(PathBuf::from(".")),
            ..Default::default()
        };
        assert_eq!(csv.build().unwrap().name(), "csv");
    }
}
