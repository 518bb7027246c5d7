//! Visualizer seam for normality plots.
//!
//! Rendering lives outside the core. The validator hands a visualizer the
//! series and its report once both tests have run; nothing is returned.

use crate::analytics::normality::NormalityReport;

/// Renders a histogram and a quantile-quantile view of a series.
pub trait Visualizer {
    fn render(&self, name: &str, values: &[f64], report: &NormalityReport);
}
