//! YieldLab Runner — multi-ticker comparison, run configuration, report export.
//!
//! This crate builds on `yieldlab-core` to provide:
//! - Cross-ticker aggregation with per-ticker failure isolation
//! - TOML run configuration and provider construction
//! - JSON, CSV and Markdown export

pub mod comparison;
pub mod config;
pub mod export;

pub use comparison::{
    AssetComparisonAggregator, CompareError, ComparisonTable, PivotTable, TickerFailure,
    TickerValues,
};
pub use config::{ComparisonConfig, ConfigError, ProviderConfig, ProviderKind};
