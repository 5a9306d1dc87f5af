//! Objective (loss) functions for gradient boosting.
//!
//! Objectives compute first and second order gradients of the loss with
//! respect to the current predictions, and the optimal constant prediction
//! used as the forest's base score.

// =============================================================================
// GradsTuple
// =============================================================================

/// Gradient and hessian of the loss for one sample.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GradsTuple {
    pub grad: f64,
    pub hess: f64,
}

impl GradsTuple {
    #[inline]
    pub fn new(grad: f64, hess: f64) -> Self {
        Self { grad, hess }
    }
}

// =============================================================================
// Objective Trait
// =============================================================================

/// An objective (loss) function for training gradient boosted models.
///
/// Single-output regression only: `predictions`, `targets` and `grad_hess`
/// are parallel slices of length `n_rows`.
pub trait ObjectiveFn {
    /// Compute gradients and hessians for the given predictions.
    fn compute_gradients_into(&self, predictions: &[f64], targets: &[f64], grad_hess: &mut [GradsTuple]);

    /// Optimal constant prediction before any trees are added.
    fn compute_base_score(&self, targets: &[f64]) -> f64;

    /// Name of the objective (for logging).
    fn name(&self) -> &'static str;
}

// =============================================================================
// Squared Loss
// =============================================================================

/// Squared error loss (L2 loss) for regression.
///
/// - Loss: `0.5 * (pred - target)²`
/// - Gradient: `pred - target`
/// - Hessian: `1.0`
#[derive(Debug, Clone, Copy, Default)]
pub struct SquaredLoss;

impl ObjectiveFn for SquaredLoss {
    fn compute_gradients_into(&self, predictions: &[f64], targets: &[f64], grad_hess: &mut [GradsTuple]) {
        debug_assert_eq!(predictions.len(), targets.len());
        debug_assert_eq!(predictions.len(), grad_hess.len());
        for ((gh, &pred), &target) in grad_hess.iter_mut().zip(predictions).zip(targets) {
            *gh = GradsTuple::new(pred - target, 1.0);
        }
    }

    fn compute_base_score(&self, targets: &[f64]) -> f64 {
        if targets.is_empty() {
            return 0.0;
        }
        targets.iter().sum::<f64>() / targets.len() as f64
    }

    fn name(&self) -> &'static str {
        "squared"
    }
}
