//! Statistics Calculator Module
//! Descriptive statistics, IQR fences, correlation, histograms and Welch's t-test.

use serde::Serialize;
use statrs::distribution::{ContinuousCDF, StudentsT};

/// Significance threshold for t-test
pub const SIGNIFICANCE_THRESHOLD: f64 = 0.05;

/// Fence multiplier applied to the interquartile range.
pub const IQR_FENCE_FACTOR: f64 = 1.5;

/// Descriptive statistics for one column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DescriptiveStats {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

impl Default for DescriptiveStats {
    fn default() -> Self {
        Self {
            count: 0,
            mean: f64::NAN,
            std: f64::NAN,
            min: f64::NAN,
            q25: f64::NAN,
            median: f64::NAN,
            q75: f64::NAN,
            max: f64::NAN,
        }
    }
}

/// Result of Welch's t-test between two samples.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TTest {
    pub p_value: f64,
    pub is_significant: bool,
}

/// One equal-width histogram bin, `[lower, upper)` except the last which is closed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Handles statistical calculations.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Compute descriptive statistics for an array of values.
    pub fn compute_descriptive_stats(values: &[f64]) -> DescriptiveStats {
        let n = values.len();
        if n == 0 {
            return DescriptiveStats::default();
        }

        let sorted = Self::sorted(values);
        let mean = values.iter().sum::<f64>() / n as f64;

        let std = if n > 1 {
            (values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64).sqrt()
        } else {
            f64::NAN
        };

        DescriptiveStats {
            count: n,
            mean,
            std,
            min: sorted[0],
            q25: Self::percentile(&sorted, 25.0),
            median: Self::percentile(&sorted, 50.0),
            q75: Self::percentile(&sorted, 75.0),
            max: sorted[n - 1],
        }
    }

    pub fn sorted(values: &[f64]) -> Vec<f64> {
        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        sorted
    }

    /// Calculate percentile using linear interpolation (NumPy compatible).
    pub fn percentile(sorted_values: &[f64], p: f64) -> f64 {
        let n = sorted_values.len();
        if n == 0 {
            return f64::NAN;
        }
        if n == 1 {
            return sorted_values[0];
        }

        let rank = (p / 100.0) * (n - 1) as f64;
        let lower = rank.floor() as usize;
        let upper = (rank.ceil() as usize).min(n - 1);
        let frac = rank - lower as f64;

        if lower == upper {
            sorted_values[lower]
        } else {
            sorted_values[lower] * (1.0 - frac) + sorted_values[upper] * frac
        }
    }

    /// Outlier fences `[Q1 - k*IQR, Q3 + k*IQR]`.
    ///
    /// `None` when there are no values or the IQR is zero: such a column has
    /// no meaningful spread to fence against.
    pub fn iqr_fences(values: &[f64], factor: f64) -> Option<(f64, f64)> {
        if values.is_empty() {
            return None;
        }
        let sorted = Self::sorted(values);
        let q1 = Self::percentile(&sorted, 25.0);
        let q3 = Self::percentile(&sorted, 75.0);
        let iqr = q3 - q1;
        if iqr <= 0.0 || !iqr.is_finite() {
            return None;
        }
        Some((q1 - factor * iqr, q3 + factor * iqr))
    }

    /// Pearson correlation over the rows where both values are present.
    pub fn pearson(xs: &[Option<f64>], ys: &[Option<f64>]) -> f64 {
        let pairs: Vec<(f64, f64)> = xs
            .iter()
            .zip(ys.iter())
            .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
            .collect();

        let n = pairs.len();
        if n < 2 {
            return f64::NAN;
        }

        let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n as f64;
        let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n as f64;

        let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
        for (x, y) in &pairs {
            let dx = x - mean_x;
            let dy = y - mean_y;
            cov += dx * dy;
            var_x += dx * dx;
            var_y += dy * dy;
        }

        if var_x == 0.0 || var_y == 0.0 {
            return f64::NAN;
        }
        (cov / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0)
    }

    /// Equal-width histogram over `[min, max]`. A constant column yields one bin.
    pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
        if values.is_empty() || bins == 0 {
            return Vec::new();
        }

        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        if max <= min {
            return vec![HistogramBin {
                lower: min,
                upper: max,
                count: values.len(),
            }];
        }

        let width = (max - min) / bins as f64;
        let mut counts = vec![0usize; bins];
        for &v in values {
            let idx = (((v - min) / width).floor() as usize).min(bins - 1);
            counts[idx] += 1;
        }

        counts
            .into_iter()
            .enumerate()
            .map(|(i, count)| HistogramBin {
                lower: min + i as f64 * width,
                upper: if i + 1 == bins {
                    max
                } else {
                    min + (i + 1) as f64 * width
                },
                count,
            })
            .collect()
    }

    /// Perform Welch's t-test (independent samples, unequal variance).
    pub fn perform_ttest(sample: &[f64], reference: &[f64]) -> Option<TTest> {
        let n1 = sample.len() as f64;
        let n2 = reference.len() as f64;

        if n1 < 2.0 || n2 < 2.0 {
            return None;
        }

        let mean1 = sample.iter().sum::<f64>() / n1;
        let mean2 = reference.iter().sum::<f64>() / n2;

        let var1 = sample.iter().map(|x| (x - mean1).powi(2)).sum::<f64>() / (n1 - 1.0);
        let var2 = reference.iter().map(|x| (x - mean2).powi(2)).sum::<f64>() / (n2 - 1.0);

        let se = (var1 / n1 + var2 / n2).sqrt();
        if se == 0.0 {
            return Some(TTest {
                p_value: 1.0,
                is_significant: false,
            });
        }

        let t = (mean1 - mean2) / se;

        // Welch-Satterthwaite degrees of freedom
        let df_num = (var1 / n1 + var2 / n2).powi(2);
        let df_denom = (var1 / n1).powi(2) / (n1 - 1.0) + (var2 / n2).powi(2) / (n2 - 1.0);
        let df = df_num / df_denom;

        let dist = StudentsT::new(0.0, 1.0, df).ok()?;
        let p_value = 2.0 * (1.0 - dist.cdf(t.abs()));
        Some(TTest {
            p_value,
            is_significant: p_value <= SIGNIFICANCE_THRESHOLD,
        })
    }

    /// Round to a fixed number of decimals.
    pub fn round_to(value: f64, decimals: i32) -> f64 {
        let factor = 10f64.powi(decimals);
        (value * factor).round() / factor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_descriptive_stats_match_pandas_describe() {
        let stats = StatsCalculator::compute_descriptive_stats(&[1.0, 2.0, 3.0, 4.0]);

        assert_eq!(stats.count, 4);
        assert_relative_eq!(stats.mean, 2.5);
        assert_relative_eq!(stats.std, 1.2909944487358056, epsilon = 1e-12);
        assert_relative_eq!(stats.q25, 1.75);
        assert_relative_eq!(stats.median, 2.5);
        assert_relative_eq!(stats.q75, 3.25);
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 4.0);
    }

    #[test]
    fn test_empty_stats_are_nan() {
        let stats = StatsCalculator::compute_descriptive_stats(&[]);
        assert_eq!(stats.count, 0);
        assert!(stats.mean.is_nan());
    }

    #[test]
    fn test_fences_for_constant_column() {
        assert_eq!(StatsCalculator::iqr_fences(&[7.0; 5], IQR_FENCE_FACTOR), None);
    }

    #[test]
    fn test_fences_for_spread_column() {
        let (lower, upper) =
            StatsCalculator::iqr_fences(&[10.0, 12.0, 999.0, 11.0], IQR_FENCE_FACTOR).unwrap();
        assert_relative_eq!(lower, 10.75 - 1.5 * 248.0);
        assert_relative_eq!(upper, 258.75 + 1.5 * 248.0);
    }

    #[test]
    fn test_pearson_skips_incomplete_pairs() {
        let xs = [Some(1.0), Some(2.0), None, Some(4.0)];
        let ys = [Some(2.0), Some(4.0), Some(100.0), Some(8.0)];
        assert_relative_eq!(StatsCalculator::pearson(&xs, &ys), 1.0, epsilon = 1e-12);

        let inverse = [Some(-1.0), Some(-2.0), Some(0.0), Some(-4.0)];
        assert_relative_eq!(StatsCalculator::pearson(&xs, &inverse), -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_histogram_counts_every_value() {
        let values: Vec<f64> = (0..100).map(|v| v as f64).collect();
        let bins = StatsCalculator::histogram(&values, 10);

        assert_eq!(bins.len(), 10);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 100);
        assert_eq!(bins[9].upper, 99.0);
        assert!(bins.iter().all(|b| b.count == 10));
    }

    #[test]
    fn test_ttest_detects_shift() {
        let a = [10.0, 11.0, 10.5, 10.2, 10.8, 10.1];
        let b = [20.0, 21.0, 20.5, 20.2, 20.8, 20.1];
        let result = StatsCalculator::perform_ttest(&a, &b).unwrap();
        assert!(result.is_significant);

        assert!(StatsCalculator::perform_ttest(&a[..1], &b).is_none());
    }

    #[test]
    fn test_round_to_two_decimals() {
        assert_eq!(StatsCalculator::round_to(100.0 / 3.0, 2), 33.33);
    }
}
