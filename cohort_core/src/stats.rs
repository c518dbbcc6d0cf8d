//! Summary statistics over per-patient outcome collections.

use serde::Serialize;

/// Descriptive statistics for one numeric sample.
///
/// The survival-time and AIDS-onset collections are right-censored (only
/// observed events contribute), so `n` can be smaller than the cohort and
/// an empty sample is legal: it is reported with `n = 0` and zeroed moments.
#[derive(Clone, Debug, Serialize)]
pub struct SummaryStat {
    pub n: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub median: f64,
    pub ci95_lower: f64,
    pub ci95_upper: f64,
}

impl SummaryStat {
    /// Compute statistics over a sample.
    ///
    /// Standard deviation uses the sample (n-1) denominator; the 95%
    /// interval is the normal approximation `mean ± 1.96 · std_err`.
    pub fn from_sample(values: &[f64]) -> Self {
        let n = values.len();
        if n == 0 {
            return Self {
                n: 0,
                mean: 0.0,
                std_dev: 0.0,
                min: 0.0,
                max: 0.0,
                median: 0.0,
                ci95_lower: 0.0,
                ci95_upper: 0.0,
            };
        }

        let mean = values.iter().sum::<f64>() / n as f64;
        let std_dev = if n > 1 {
            let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
            (ss / (n - 1) as f64).sqrt()
        } else {
            0.0
        };

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));
        let min = sorted[0];
        let max = sorted[n - 1];
        let median = if n % 2 == 1 {
            sorted[n / 2]
        } else {
            (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
        };

        let std_err = std_dev / (n as f64).sqrt();
        Self {
            n,
            mean,
            std_dev,
            min,
            max,
            median,
            ci95_lower: mean - 1.96 * std_err,
            ci95_upper: mean + 1.96 * std_err,
        }
    }
}
