//! Terminal rendering of normality plots.

use std::io::Write;

use statrs::distribution::{ContinuousCDF, Normal};
use yieldlab_core::analytics::stats::{mean, population_std_dev};
use yieldlab_core::analytics::NormalityReport;
use yieldlab_core::Visualizer;

const BAR_WIDTH: usize = 40;

/// Prints a text histogram and a Q-Q table to stderr, keeping stdout for
/// the report itself.
pub struct TextVisualizer;

impl TextVisualizer {
    fn histogram(values: &[f64]) -> Vec<String> {
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let bins = ((values.len() as f64).sqrt().ceil() as usize).max(1);
        let width = (max - min) / bins as f64;

        let mut counts = vec![0usize; bins];
        for &v in values {
            let idx = if width > 0.0 {
                (((v - min) / width) as usize).min(bins - 1)
            } else {
                0
            };
            counts[idx] += 1;
        }

        let peak = counts.iter().copied().max().unwrap_or(1).max(1);
        counts
            .iter()
            .enumerate()
            .map(|(i, &c)| {
                let lo = min + width * i as f64;
                let bar = "#".repeat(c * BAR_WIDTH / peak);
                format!("{:>9.4} | {:<width$} {}", lo, bar, c, width = BAR_WIDTH)
            })
            .collect()
    }

    /// Sample quantiles against the normal the KS test fits: sample mean and
    /// population std.
    fn qq(values: &[f64]) -> Vec<(f64, f64)> {
        let n = values.len() as f64;
        let Ok(normal) = Normal::new(mean(values), population_std_dev(values)) else {
            return Vec::new();
        };

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));
        sorted
            .into_iter()
            .enumerate()
            .map(|(i, v)| (normal.inverse_cdf((i as f64 + 0.5) / n), v))
            .collect()
    }
}

impl Visualizer for TextVisualizer {
    fn render(&self, name: &str, values: &[f64], report: &NormalityReport) {
        if values.is_empty() {
            return;
        }
        let mut err = std::io::stderr().lock();

        let _ = writeln!(err, "\n{name}: histogram");
        for line in Self::histogram(values) {
            let _ = writeln!(err, "{line}");
        }

        let qq = Self::qq(values);
        if !qq.is_empty() {
            let _ = writeln!(err, "\n{name}: Q-Q against fitted normal");
            let _ = writeln!(err, "{:>12} {:>12}", "theoretical", "sample");
            for (t, s) in qq {
                let _ = writeln!(err, "{t:>12.4} {s:>12.4}");
            }
        }

        let _ = writeln!(err, "\n{report}");
    }
}
