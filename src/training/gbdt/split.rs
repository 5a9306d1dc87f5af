//! Exact greedy split finding.

use ndarray::ArrayView2;

use crate::training::GradsTuple;

// ============================================================================
// GainParams
// ============================================================================

/// Parameters for split gain computation and leaf weight calculation.
///
/// These parameters are static for the lifetime of training and control
/// regularization and splitting constraints.
#[derive(Clone, Debug, PartialEq)]
pub struct GainParams {
    /// L2 regularization on leaf weights (lambda).
    pub lambda: f64,
    /// A split is kept only when its gain exceeds this value.
    pub min_gain: f64,
    /// Minimum sum of hessians in each child.
    pub min_child_weight: f64,
}

impl Default for GainParams {
    fn default() -> Self {
        Self {
            lambda: 1.0,
            min_gain: 0.0,
            min_child_weight: 1.0,
        }
    }
}

impl GainParams {
    /// Structure score of a node: `G² / (H + λ)`.
    #[inline]
    pub fn score(&self, grad: f64, hess: f64) -> f64 {
        grad * grad / (hess + self.lambda)
    }

    /// Split gain:
    ///
    /// ```text
    /// gain = G_L²/(H_L + λ) + G_R²/(H_R + λ) - G_P²/(H_P + λ)
    /// ```
    #[inline]
    pub fn compute_gain(&self, grad_left: f64, hess_left: f64, grad_right: f64, hess_right: f64) -> f64 {
        self.score(grad_left, hess_left) + self.score(grad_right, hess_right)
            - self.score(grad_left + grad_right, hess_left + hess_right)
    }

    /// Check if both children satisfy the minimum hessian constraint.
    #[inline]
    pub fn is_valid_split(&self, hess_left: f64, hess_right: f64) -> bool {
        hess_left >= self.min_child_weight && hess_right >= self.min_child_weight
    }

    /// Newton step leaf weight, scaled by the learning rate: `-η·G/(H + λ)`.
    #[inline]
    pub fn leaf_weight(&self, grad: f64, hess: f64, learning_rate: f64) -> f64 {
        let denom = hess + self.lambda;
        if denom <= 0.0 { 0.0 } else { -learning_rate * grad / denom }
    }
}

// ============================================================================
// SplitInfo
// ============================================================================

/// Best split found for a node.
#[derive(Clone, Debug, PartialEq)]
pub struct SplitInfo {
    pub feature: usize,
    /// Samples with `value < threshold` go left.
    pub threshold: f32,
    /// Direction of missing values.
    pub default_left: bool,
    pub gain: f64,
}

/// Midpoint between two consecutive distinct values that still separates them.
fn midpoint(lo: f32, hi: f32) -> f32 {
    let mid = lo + (hi - lo) * 0.5;
    if mid > lo { mid } else { hi }
}

/// Find the best split of `rows` over `columns`.
///
/// Every boundary between consecutive distinct values of a column is a
/// candidate. Missing values are tried on both sides; when a column has none
/// they default left. Ties keep the first candidate in column order.
pub fn find_best_split(
    features: ArrayView2<'_, f32>,
    rows: &[usize],
    grad_hess: &[GradsTuple],
    columns: &[usize],
    params: &GainParams,
) -> Option<SplitInfo> {
    let mut best: Option<SplitInfo> = None;
    let mut entries: Vec<(f32, GradsTuple)> = Vec::with_capacity(rows.len());

    for &feature in columns {
        entries.clear();
        let (mut miss_grad, mut miss_hess) = (0.0, 0.0);
        for &row in rows {
            let value = features[[row, feature]];
            let gh = grad_hess[row];
            if value.is_nan() {
                miss_grad += gh.grad;
                miss_hess += gh.hess;
            } else {
                entries.push((value, gh));
            }
        }
        if entries.len() < 2 {
            continue;
        }
        entries.sort_by(|a, b| a.0.total_cmp(&b.0));

        let (total_grad, total_hess) = entries
            .iter()
            .fold((0.0, 0.0), |(g, h), (_, gh)| (g + gh.grad, h + gh.hess));
        let has_missing = miss_hess > 0.0 || miss_grad != 0.0;

        let (mut left_grad, mut left_hess) = (0.0, 0.0);
        for i in 0..entries.len() - 1 {
            left_grad += entries[i].1.grad;
            left_hess += entries[i].1.hess;
            let (lo, hi) = (entries[i].0, entries[i + 1].0);
            if lo == hi {
                continue;
            }
            let right_grad = total_grad - left_grad;
            let right_hess = total_hess - left_hess;

            // Missing left first so that, without missing values, the
            // default direction is left.
            let directions: &[bool] = if has_missing { &[true, false] } else { &[true] };
            for &default_left in directions {
                let (gl, hl, gr, hr) = if default_left {
                    (left_grad + miss_grad, left_hess + miss_hess, right_grad, right_hess)
                } else {
                    (left_grad, left_hess, right_grad + miss_grad, right_hess + miss_hess)
                };
                if !params.is_valid_split(hl, hr) {
                    continue;
                }
                let gain = params.compute_gain(gl, hl, gr, hr);
                if gain <= params.min_gain {
                    continue;
                }
                if best.as_ref().is_none_or(|b| gain > b.gain) {
                    best = Some(SplitInfo {
                        feature,
                        threshold: midpoint(lo, hi),
                        default_left,
                        gain,
                    });
                }
            }
        }
    }
    best
}
