//! Common utilities used across the crate.
//!
//! Statistical helpers shared by the trainer, the metrics and the SHAP
//! aggregation tables.

// =============================================================================
// Statistical Utilities
// =============================================================================

/// Arithmetic mean. Returns `f64::NAN` for an empty slice.
#[inline]
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Standard deviation with `ddof` delta degrees of freedom.
///
/// `ddof = 0` gives the population deviation, `ddof = 1` the sample deviation.
/// Returns `f64::NAN` when `values.len() <= ddof`.
pub fn std_dev(values: &[f64], ddof: usize) -> f64 {
    let n = values.len();
    if n <= ddof {
        return f64::NAN;
    }
    let m = mean(values);
    let ss: f64 = values.iter().map(|&v| (v - m) * (v - m)).sum();
    (ss / (n - ddof) as f64).sqrt()
}

/// Compute the `q`-quantile of a slice using linear interpolation.
///
/// The quantile position is `q * (n - 1)` in the sorted order; values between
/// two order statistics are interpolated linearly. This is the "linear" method
/// of most numeric libraries.
///
/// # Arguments
/// * `values` - The values to compute the quantile over (any order)
/// * `q` - The quantile level in [0, 1]
/// * `scratch` - Mutable scratch space for the sorted copy (reused between calls)
///
/// # Returns
/// The quantile value. Returns `f64::NAN` if values is empty.
pub fn quantile(values: &[f64], q: f64, scratch: &mut Vec<f64>) -> f64 {
    let n = values.len();
    if n == 0 {
        return f64::NAN;
    }

    scratch.clear();
    scratch.extend_from_slice(values);
    scratch.sort_by(|a, b| a.total_cmp(b));

    quantile_sorted(scratch, q)
}

/// Quantile of an already sorted slice. See [`quantile`].
pub fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return f64::NAN;
    }
    if n == 1 {
        return sorted[0];
    }

    let pos = q.clamp(0.0, 1.0) * (n - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn mean_of_empty_is_nan() {
        assert!(mean(&[]).is_nan());
        assert_abs_diff_eq!(mean(&[1.0, 2.0, 6.0]), 3.0);
    }

    #[test]
    fn std_dev_population_and_sample() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_abs_diff_eq!(std_dev(&values, 0), 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(std_dev(&values, 1), 2.138089935299395, epsilon = 1e-12);
        assert!(std_dev(&[1.0], 1).is_nan());
    }

    #[test]
    fn quantile_interpolates_linearly() {
        let mut scratch = Vec::new();
        // Values in random order, but should still find correct median
        let values = [3.0, 1.0, 4.0, 2.0];
        assert_abs_diff_eq!(quantile(&values, 0.5, &mut scratch), 2.5);
        assert_abs_diff_eq!(quantile(&values, 0.0, &mut scratch), 1.0);
        assert_abs_diff_eq!(quantile(&values, 1.0, &mut scratch), 4.0);
        // position 0.025 * 3 = 0.075
        assert_abs_diff_eq!(quantile(&values, 0.025, &mut scratch), 1.075, epsilon = 1e-12);
        assert_abs_diff_eq!(quantile(&values, 0.975, &mut scratch), 3.925, epsilon = 1e-12);
    }

    #[test]
    fn quantile_edge_cases() {
        let mut scratch = Vec::new();
        assert!(quantile(&[], 0.5, &mut scratch).is_nan());
        assert_eq!(quantile(&[7.0], 0.9, &mut scratch), 7.0);
    }
}
