//! Summary statistics with quantile confidence bands.

use serde::Serialize;

use crate::utils::{mean, quantile_sorted, std_dev};

/// Location, spread and 95 % band of a sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    pub mean: f64,
    pub sd: f64,
    /// Standard error of the mean (sample deviation / √n).
    pub se: f64,
    /// 2.5 % quantile.
    pub lower: f64,
    /// 97.5 % quantile.
    pub upper: f64,
    pub n: usize,
}

impl Summary {
    pub const LOWER_QUANTILE: f64 = 0.025;
    pub const UPPER_QUANTILE: f64 = 0.975;

    /// Summarise `values`; `sd_ddof` selects the denominator of `sd`
    /// (`n - sd_ddof`). `se` always uses the sample deviation.
    ///
    /// Returns `None` for an empty sample.
    pub fn compute(values: &[f64], sd_ddof: usize) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let n = values.len();
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        Some(Self {
            mean: mean(values),
            sd: std_dev(values, sd_ddof),
            se: std_dev(values, 1) / (n as f64).sqrt(),
            lower: quantile_sorted(&sorted, Self::LOWER_QUANTILE),
            upper: quantile_sorted(&sorted, Self::UPPER_QUANTILE),
            n,
        })
    }

    /// Shift the location statistics (mean and band) by `offset`.
    pub fn shifted(self, offset: f64) -> Self {
        Self {
            mean: self.mean + offset,
            lower: self.lower + offset,
            upper: self.upper + offset,
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn summary_of_small_sample() {
        let s = Summary::compute(&[1.0, 2.0, 3.0, 4.0], 1).unwrap();
        assert_eq!(s.n, 4);
        assert_abs_diff_eq!(s.mean, 2.5);
        assert_abs_diff_eq!(s.sd, 1.2909944487358056, epsilon = 1e-12);
        assert_abs_diff_eq!(s.se, 1.2909944487358056 / 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(s.lower, 1.075, epsilon = 1e-12);
        assert_abs_diff_eq!(s.upper, 3.925, epsilon = 1e-12);
    }

    #[test]
    fn population_sd_and_shift() {
        let s = Summary::compute(&[1.0, 3.0], 0).unwrap().shifted(10.0);
        assert_abs_diff_eq!(s.sd, 1.0);
        assert_abs_diff_eq!(s.mean, 12.0);
        assert_abs_diff_eq!(s.lower, 11.05, epsilon = 1e-12);
        assert_abs_diff_eq!(s.upper, 12.95, epsilon = 1e-12);
        // se is not a location statistic
        assert_abs_diff_eq!(s.se, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn empty_sample_has_no_summary() {
        assert!(Summary::compute(&[], 1).is_none());
    }
}
