//! Evaluation metrics for model quality.
//!
//! Metrics are separate from loss functions: the forest is trained on
//! squared loss and reported in RMSE.

/// A metric evaluated on predictions and targets.
pub trait MetricFn {
    /// Compute the metric. Both slices have length `n_rows`.
    fn compute(&self, predictions: &[f64], targets: &[f64]) -> f64;

    /// Whether higher values indicate a better fit.
    fn higher_is_better(&self) -> bool;

    /// Name of the metric (for logging).
    fn name(&self) -> &'static str;
}

// =============================================================================
// RMSE (Root Mean Squared Error)
// =============================================================================

/// Root Mean Squared Error: sqrt(mean((pred - label)²))
///
/// Lower is better.
#[derive(Debug, Clone, Copy, Default)]
pub struct Rmse;

impl MetricFn for Rmse {
    fn compute(&self, predictions: &[f64], targets: &[f64]) -> f64 {
        let n_rows = predictions.len().min(targets.len());
        if n_rows == 0 {
            return 0.0;
        }
        let sum_sq: f64 = predictions
            .iter()
            .zip(targets)
            .map(|(&p, &t)| (p - t) * (p - t))
            .sum();
        (sum_sq / n_rows as f64).sqrt()
    }

    fn higher_is_better(&self) -> bool {
        false
    }

    fn name(&self) -> &'static str {
        "rmse"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rstest::rstest;

    #[rstest]
    #[case(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0], 0.0)]
    #[case(&[1.0, 2.0], &[2.0, 4.0], (2.5f64).sqrt())]
    #[case(&[], &[], 0.0)]
    fn rmse_values(#[case] preds: &[f64], #[case] targets: &[f64], #[case] expected: f64) {
        assert_abs_diff_eq!(Rmse.compute(preds, targets), expected, epsilon = 1e-12);
    }
}
