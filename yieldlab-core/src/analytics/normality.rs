//! Normality validation with Shapiro-Wilk and Kolmogorov-Smirnov goodness-of-fit tests.
//!
//! Both tests run eagerly when a [`NormalityValidator`] is constructed. A failed
//! Gaussian check is advisory: it produces a [`DataValidationWarning`] and a
//! `warn!` log line, never an error.
//!
//! Shapiro-Wilk follows Royston's AS R94 algorithm (coefficients, W statistic
//! and p-value approximation for 3 ≤ n ≤ 5000). The KS test compares the sample
//! against a normal distribution parameterised by the sample's own mean and
//! population standard deviation, with the p-value taken from the exact
//! finite-sample Kolmogorov distribution.

use std::f64::consts::{FRAC_1_SQRT_2, PI};
use std::fmt;

use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};
use tracing::warn;

use super::stats::{kolmogorov_sf, mean, population_std_dev};
use crate::error::AnalysisError;
use crate::visualize::Visualizer;

/// Conventional significance level.
pub const DEFAULT_ALPHA: f64 = 0.05;

/// Which goodness-of-fit test produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NormalityTest {
    ShapiroWilk,
    KolmogorovSmirnov,
}

impl fmt::Display for NormalityTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ShapiroWilk => write!(f, "Shapiro-Wilk Test"),
            Self::KolmogorovSmirnov => write!(f, "Kolmogorov-Smirnov Test"),
        }
    }
}

/// Outcome of one normality test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    pub test: NormalityTest,
    pub statistic: f64,
    pub p_value: f64,
    pub alpha: f64,
    /// `p_value > alpha`: the null hypothesis of normality is not rejected.
    pub is_gaussian: bool,
}

impl TestResult {
    fn new(test: NormalityTest, statistic: f64, p_value: f64, alpha: f64) -> Self {
        Self {
            test,
            statistic,
            p_value,
            alpha,
            is_gaussian: p_value > alpha,
        }
    }
}

/// Results of both normality tests on one series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalityReport {
    pub shapiro_wilk: TestResult,
    pub kolmogorov_smirnov: TestResult,
}

impl NormalityReport {
    /// Summary rows in a fixed order: Shapiro-Wilk, then Kolmogorov-Smirnov.
    pub fn rows(&self) -> [TestResult; 2] {
        [self.shapiro_wilk, self.kolmogorov_smirnov]
    }

    /// True only if both tests fail to reject normality.
    pub fn is_gaussian(&self) -> bool {
        self.shapiro_wilk.is_gaussian && self.kolmogorov_smirnov.is_gaussian
    }
}

impl fmt::Display for NormalityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:<25} {:>10} {:>10} {:>7} {:>9}",
            "Test", "Statistic", "p-value", "alpha", "Gaussian"
        )?;
        for row in self.rows() {
            writeln!(
                f,
                "{:<25} {:>10.4} {:>10.4} {:>7.3} {:>9}",
                row.test.to_string(),
                row.statistic,
                row.p_value,
                row.alpha,
                row.is_gaussian
            )?;
        }
        Ok(())
    }
}

/// Advisory raised when a series fails a Gaussian check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataValidationWarning {
    pub series: String,
    pub test: NormalityTest,
    pub p_value: f64,
    pub alpha: f64,
}

impl fmt::Display for DataValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} data does not pass the {} of Gaussian distribution (p = {:.4} <= alpha = {}); \
             data may not be normally distributed",
            self.series, self.test, self.p_value, self.alpha
        )
    }
}

/// Runs both normality tests on a series and keeps the results.
#[derive(Debug, Clone)]
pub struct NormalityValidator {
    name: String,
    values: Vec<f64>,
    alpha: f64,
    report: NormalityReport,
    warnings: Vec<DataValidationWarning>,
}

impl NormalityValidator {
    /// Run both tests on `values`.
    ///
    /// When a visualizer is supplied it is called exactly once, after both
    /// tests have completed. It is never called if a test fails to run.
    pub fn new(
        name: &str,
        values: &[f64],
        alpha: f64,
        visualizer: Option<&dyn Visualizer>,
    ) -> Result<Self, AnalysisError> {
        validate_alpha(alpha)?;

        let report = NormalityReport {
            shapiro_wilk: shapiro_wilk_test(values, alpha)?,
            kolmogorov_smirnov: kolmogorov_smirnov_test(values, alpha)?,
        };

        let warnings: Vec<DataValidationWarning> = report
            .rows()
            .iter()
            .filter(|r| !r.is_gaussian)
            .map(|r| DataValidationWarning {
                series: name.to_string(),
                test: r.test,
                p_value: r.p_value,
                alpha,
            })
            .collect();
        for w in &warnings {
            warn!(series = %w.series, test = %w.test, "{w}");
        }

        if let Some(v) = visualizer {
            v.render(name, values, &report);
        }

        Ok(Self {
            name: name.to_string(),
            values: values.to_vec(),
            alpha,
            report,
            warnings,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Two-row summary of both tests.
    pub fn summary(&self) -> &NormalityReport {
        &self.report
    }

    pub fn warnings(&self) -> &[DataValidationWarning] {
        &self.warnings
    }

    pub fn into_parts(self) -> (NormalityReport, Vec<DataValidationWarning>) {
        (self.report, self.warnings)
    }
}

pub(crate) fn validate_alpha(alpha: f64) -> Result<(), AnalysisError> {
    if alpha > 0.0 && alpha < 1.0 {
        Ok(())
    } else {
        Err(AnalysisError::InvalidParameter(format!(
            "alpha must be in (0, 1), got {alpha}"
        )))
    }
}

fn standard_normal() -> Result<Normal, AnalysisError> {
    Normal::new(0.0, 1.0).map_err(|e| AnalysisError::Statistics(e.to_string()))
}

// ─── Shapiro-Wilk ───────────────────────────────────────────────────

const SMALL: f64 = 1e-19;

const C1: [f64; 6] = [0.0, 0.221157, -0.147981, -2.07119, 4.434685, -2.706056];
const C2: [f64; 6] = [0.0, 0.042981, -0.293762, -1.752461, 5.682633, -3.582633];
const C3: [f64; 4] = [0.544, -0.39978, 0.025054, -6.714e-4];
const C4: [f64; 4] = [1.3822, -0.77857, 0.062767, -0.0020322];
const C5: [f64; 4] = [-1.5861, -0.31082, -0.083751, 0.0038915];
const C6: [f64; 3] = [-0.4803, -0.082676, 0.0030302];
const G: [f64; 2] = [-2.273, 0.459];

/// Evaluate `cc[0] + cc[1]·x + … + cc[k]·x^k`.
fn poly(cc: &[f64], x: f64) -> f64 {
    let mut result = cc[0];
    if cc.len() > 1 {
        let mut p = x * cc[cc.len() - 1];
        for j in (1..cc.len() - 1).rev() {
            p = (p + cc[j]) * x;
        }
        result += p;
    }
    result
}

/// Upper-half Shapiro-Wilk coefficients, largest first.
fn shapiro_wilk_coefficients(n: usize, normal: &Normal) -> Vec<f64> {
    let half = n / 2;
    let mut a = vec![0.0; half];
    if n == 3 {
        a[0] = FRAC_1_SQRT_2;
        return a;
    }

    let an = n as f64;
    let m: Vec<f64> = (1..=half)
        .map(|i| normal.inverse_cdf((i as f64 - 0.375) / (an + 0.25)))
        .collect();
    let summ2 = 2.0 * m.iter().map(|v| v * v).sum::<f64>();
    let ssumm2 = summ2.sqrt();
    let rsn = 1.0 / an.sqrt();
    let a1 = poly(&C1, rsn) - m[0] / ssumm2;

    let (first_free, fac) = if n > 5 {
        let a2 = -m[1] / ssumm2 + poly(&C2, rsn);
        let fac = ((summ2 - 2.0 * m[0].powi(2) - 2.0 * m[1].powi(2))
            / (1.0 - 2.0 * a1.powi(2) - 2.0 * a2.powi(2)))
        .sqrt();
        a[1] = a2;
        (2, fac)
    } else {
        let fac = ((summ2 - 2.0 * m[0].powi(2)) / (1.0 - 2.0 * a1.powi(2))).sqrt();
        (1, fac)
    };
    a[0] = a1;
    for i in first_free..half {
        a[i] = -m[i] / fac;
    }
    a
}

/// Shapiro-Wilk test for normality. Requires at least 3 observations.
pub fn shapiro_wilk_test(values: &[f64], alpha: f64) -> Result<TestResult, AnalysisError> {
    let n = values.len();
    if n < 3 {
        return Err(AnalysisError::insufficient(format!(
            "Shapiro-Wilk needs at least 3 observations, got {n}"
        )));
    }
    if n > 5000 {
        warn!(n, "Shapiro-Wilk p-value may be inaccurate for n > 5000");
    }

    let mut x = values.to_vec();
    x.sort_by(|a, b| a.total_cmp(b));

    let range = x[n - 1] - x[0];
    if range < SMALL {
        warn!("input data has range zero; Shapiro-Wilk result may not be accurate");
        return Ok(TestResult::new(NormalityTest::ShapiroWilk, 1.0, 1.0, alpha));
    }

    let normal = standard_normal()?;
    let half = shapiro_wilk_coefficients(n, &normal);

    // Full antisymmetric coefficient vector aligned with the sorted sample.
    let mut coef = vec![0.0; n];
    for (i, &a) in half.iter().enumerate() {
        coef[i] = -a;
        coef[n - 1 - i] = a;
    }

    // W is the squared correlation between coefficients and the scaled sample.
    let scaled: Vec<f64> = x.iter().map(|v| v / range).collect();
    let sa = mean(&coef);
    let sx = mean(&scaled);
    let (mut ssa, mut ssx, mut sax) = (0.0, 0.0, 0.0);
    for (a, xv) in coef.iter().zip(&scaled) {
        let asa = a - sa;
        let xsx = xv - sx;
        ssa += asa * asa;
        ssx += xsx * xsx;
        sax += asa * xsx;
    }
    let ssassx = (ssa * ssx).sqrt();
    // 1 - W, computed directly to avoid rounding error when W is near 1.
    let w1 = (ssassx - sax) * (ssassx + sax) / (ssa * ssx);
    let w = 1.0 - w1;

    let p_value = shapiro_wilk_p_value(n, w, w1)?;
    Ok(TestResult::new(NormalityTest::ShapiroWilk, w, p_value, alpha))
}

fn shapiro_wilk_p_value(n: usize, w: f64, w1: f64) -> Result<f64, AnalysisError> {
    if n == 3 {
        let pi6 = 6.0 / PI;
        let stqr = PI / 3.0;
        return Ok((pi6 * (w.sqrt().asin() - stqr)).max(0.0));
    }

    let an = n as f64;
    let mut y = w1.ln();
    let (m, s) = if n <= 11 {
        let gamma = poly(&G, an);
        if y >= gamma {
            return Ok(1e-99);
        }
        y = -(gamma - y).ln();
        (poly(&C3, an), poly(&C4, an).exp())
    } else {
        let xx = an.ln();
        (poly(&C5, xx), poly(&C6, xx).exp())
    };

    let dist = Normal::new(m, s).map_err(|e| AnalysisError::Statistics(e.to_string()))?;
    Ok(dist.sf(y))
}

// ─── Kolmogorov-Smirnov ─────────────────────────────────────────────

/// Two-sided one-sample KS test against `Normal(mean, population std)` of the
/// sample itself.
///
/// A zero-variance sample has no fitted distribution; the result carries NaN
/// statistic and p-value and is therefore never Gaussian.
pub fn kolmogorov_smirnov_test(values: &[f64], alpha: f64) -> Result<TestResult, AnalysisError> {
    let n = values.len();
    if n == 0 {
        return Err(AnalysisError::insufficient(
            "Kolmogorov-Smirnov needs at least 1 observation",
        ));
    }

    let mu = mean(values);
    let sigma = population_std_dev(values);
    if !(sigma.is_finite() && sigma > 0.0) {
        warn!("sample standard deviation is zero; Kolmogorov-Smirnov is undefined");
        return Ok(TestResult::new(
            NormalityTest::KolmogorovSmirnov,
            f64::NAN,
            f64::NAN,
            alpha,
        ));
    }
    let fitted = Normal::new(mu, sigma).map_err(|e| AnalysisError::Statistics(e.to_string()))?;

    let mut x = values.to_vec();
    x.sort_by(|a, b| a.total_cmp(b));

    let nf = n as f64;
    let mut d_plus = f64::NEG_INFINITY;
    let mut d_minus = f64::NEG_INFINITY;
    for (i, &v) in x.iter().enumerate() {
        let cdf = fitted.cdf(v);
        d_plus = d_plus.max((i + 1) as f64 / nf - cdf);
        d_minus = d_minus.max(cdf - i as f64 / nf);
    }
    let d = d_plus.max(d_minus);

    Ok(TestResult::new(
        NormalityTest::KolmogorovSmirnov,
        d,
        kolmogorov_sf(n, d),
        alpha,
    ))
}
