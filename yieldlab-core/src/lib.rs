//! YieldLab Core — dividend-yield series, drawdowns, volatility, normality checks.
//!
//! This crate contains the analysis pipeline for a single ticker:
//! - Domain series (prices, dividend payments, per-payment and annual yields)
//! - Yield construction with a completeness filter on calendar years
//! - Single-step drawdowns on quarterly and annual yields
//! - Shapiro-Wilk and Kolmogorov-Smirnov normality validation
//! - Market data providers (Yahoo Finance, CSV files, synthetic)

pub mod analytics;
pub mod asset;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod visualize;

pub use asset::{DividendAsset, DividendAssetProfile};
pub use config::AnalysisConfig;
pub use error::AnalysisError;
pub use visualize::Visualizer;
