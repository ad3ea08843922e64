//! Statistics Calculator Module
//! Correlation, trend-line, and change figures backing the chart annotations.

use statrs::distribution::{ContinuousCDF, StudentsT};

/// Significance threshold for the correlation t-test
pub const SIGNIFICANCE_THRESHOLD: f64 = 0.05;

/// Pearson correlation between two series.
#[derive(Debug, Clone, Copy)]
pub struct Correlation {
    pub r: f64,
    pub p_value: f64,
    pub n: usize,
    pub is_significant: bool,
}

/// Least-squares line through a scatter.
#[derive(Debug, Clone, Copy)]
pub struct TrendLine {
    pub slope: f64,
    pub intercept: f64,
}

impl TrendLine {
    pub fn at(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Handles the statistical annotations shown next to the charts.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Pearson correlation with a two-tailed t-test on n-2 degrees of freedom.
    /// Returns `None` below three points or when either series is constant.
    pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<Correlation> {
        let n = xs.len().min(ys.len());
        if n < 3 {
            return None;
        }
        let xs = &xs[..n];
        let ys = &ys[..n];

        let mean_x = xs.iter().sum::<f64>() / n as f64;
        let mean_y = ys.iter().sum::<f64>() / n as f64;

        let mut cov = 0.0;
        let mut var_x = 0.0;
        let mut var_y = 0.0;
        for (x, y) in xs.iter().zip(ys) {
            cov += (x - mean_x) * (y - mean_y);
            var_x += (x - mean_x).powi(2);
            var_y += (y - mean_y).powi(2);
        }
        if var_x == 0.0 || var_y == 0.0 {
            return None;
        }

        let r = cov / (var_x.sqrt() * var_y.sqrt());
        let df = (n - 2) as f64;

        // |r| of 1 gives an infinite t statistic; treat as fully significant.
        let p_value = if (1.0 - r * r) <= f64::EPSILON {
            0.0
        } else {
            let t = r * (df / (1.0 - r * r)).sqrt();
            match StudentsT::new(0.0, 1.0, df) {
                Ok(dist) => 2.0 * (1.0 - dist.cdf(t.abs())),
                Err(_) => return None,
            }
        };

        Some(Correlation {
            r,
            p_value,
            n,
            is_significant: p_value <= SIGNIFICANCE_THRESHOLD,
        })
    }

    /// Ordinary least-squares fit. Returns `None` below two points or when all
    /// x values coincide.
    pub fn linear_fit(xs: &[f64], ys: &[f64]) -> Option<TrendLine> {
        let n = xs.len().min(ys.len());
        if n < 2 {
            return None;
        }
        let xs = &xs[..n];
        let ys = &ys[..n];

        let mean_x = xs.iter().sum::<f64>() / n as f64;
        let mean_y = ys.iter().sum::<f64>() / n as f64;

        let mut num = 0.0;
        let mut denom = 0.0;
        for (x, y) in xs.iter().zip(ys) {
            num += (x - mean_x) * (y - mean_y);
            denom += (x - mean_x).powi(2);
        }
        if denom == 0.0 {
            return None;
        }

        let slope = num / denom;
        Some(TrendLine {
            slope,
            intercept: mean_y - slope * mean_x,
        })
    }

    /// Percent change from the first to the last value of a series.
    pub fn percent_change(values: &[f64]) -> Option<f64> {
        let first = *values.first()?;
        let last = *values.last()?;
        if first == 0.0 {
            return None;
        }
        Some((last - first) / first * 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfectly_correlated_series_is_significant() {
        let xs = [1.0, 2.0, 3.0, 4.0];
        let ys = [2.0, 4.0, 6.0, 8.0];
        let corr = StatsCalculator::pearson(&xs, &ys).unwrap();

        assert!((corr.r - 1.0).abs() < 1e-12);
        assert_eq!(corr.p_value, 0.0);
        assert!(corr.is_significant);
    }

    #[test]
    fn anticorrelated_series_has_negative_r() {
        let xs = [1.0, 2.0, 3.0, 4.0, 5.0];
        let ys = [10.0, 8.2, 6.1, 3.9, 2.0];
        let corr = StatsCalculator::pearson(&xs, &ys).unwrap();

        assert!(corr.r < -0.99);
        assert!(corr.is_significant);
    }

    #[test]
    fn degenerate_correlation_inputs_yield_none() {
        assert!(StatsCalculator::pearson(&[1.0, 2.0], &[3.0, 4.0]).is_none());
        assert!(StatsCalculator::pearson(&[5.0, 5.0, 5.0], &[1.0, 2.0, 3.0]).is_none());
    }

    #[test]
    fn linear_fit_recovers_slope_and_intercept() {
        let xs = [0.0, 1.0, 2.0, 3.0];
        let ys = [1.0, 3.0, 5.0, 7.0];
        let line = StatsCalculator::linear_fit(&xs, &ys).unwrap();

        assert!((line.slope - 2.0).abs() < 1e-12);
        assert!((line.intercept - 1.0).abs() < 1e-12);
        assert!((line.at(10.0) - 21.0).abs() < 1e-12);
    }

    #[test]
    fn percent_change_from_first_to_last() {
        let rise = StatsCalculator::percent_change(&[90.8, 104.9, 119.0, 137.8]).unwrap();
        assert!((rise - 51.762_114_537_444_93).abs() < 1e-9);

        assert!(StatsCalculator::percent_change(&[]).is_none());
        assert!(StatsCalculator::percent_change(&[0.0, 1.0]).is_none());
    }
}
