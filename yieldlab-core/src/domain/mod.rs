//! Domain types for YieldLab

pub mod series;

pub use series::{
    AnnualYield, AnnualYieldSeries, DividendPayment, DividendPaymentSeries, PriceField,
    PricePoint, PriceSeries, YieldPoint, YieldSeries,
};
