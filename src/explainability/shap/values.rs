//! SHAP value containers.
//!
//! Stores SHAP values for a batch of samples with indexing and
//! verification utilities.

use std::ops::Range;
use std::path::Path;

use ndarray::{s, Array2, Array3, ArrayView1, ArrayView2, ArrayView3, Axis};

use crate::persist::PersistError;

// =============================================================================
// ShapValues
// =============================================================================

/// Per-sample, per-feature SHAP contributions.
///
/// Layout is `[samples × features]`; the base value (expected model output)
/// is shared by all samples.
#[derive(Clone, Debug, PartialEq)]
pub struct ShapValues {
    values: Array2<f64>,
    base_value: f64,
}

impl ShapValues {
    pub fn new(values: Array2<f64>, base_value: f64) -> Self {
        Self { values, base_value }
    }

    /// Container initialized to zeros.
    pub fn zeros(n_samples: usize, n_features: usize, base_value: f64) -> Self {
        Self::new(Array2::zeros((n_samples, n_features)), base_value)
    }

    #[inline]
    pub fn n_samples(&self) -> usize {
        self.values.nrows()
    }

    #[inline]
    pub fn n_features(&self) -> usize {
        self.values.ncols()
    }

    #[inline]
    pub fn base_value(&self) -> f64 {
        self.base_value
    }

    #[inline]
    pub fn get(&self, sample: usize, feature: usize) -> f64 {
        self.values[[sample, feature]]
    }

    /// Feature contributions of one sample.
    pub fn sample(&self, sample: usize) -> ArrayView1<'_, f64> {
        self.values.row(sample)
    }

    /// Base value plus all contributions of one sample.
    pub fn row_sum(&self, sample: usize) -> f64 {
        self.base_value + self.values.row(sample).sum()
    }

    pub fn view(&self) -> ArrayView2<'_, f64> {
        self.values.view()
    }

    /// Verify that SHAP values satisfy the sum property.
    ///
    /// For each sample: `sum(shap_values) + base_value ≈ prediction`.
    pub fn verify(&self, predictions: &[f64], tolerance: f64) -> bool {
        predictions.len() == self.n_samples()
            && predictions
                .iter()
                .enumerate()
                .all(|(i, &p)| (self.row_sum(i) - p).abs() <= tolerance)
    }
}

// =============================================================================
// ShapInteractionValues
// =============================================================================

/// Pairwise SHAP interaction values.
///
/// Layout is `[samples × features × features]`. Each sample's matrix is
/// symmetric; the diagonal holds main effects and each row sums to that
/// feature's SHAP value.
#[derive(Clone, Debug, PartialEq)]
pub struct ShapInteractionValues {
    values: Array3<f64>,
    base_value: f64,
}

impl ShapInteractionValues {
    pub fn new(values: Array3<f64>, base_value: f64) -> Self {
        debug_assert_eq!(values.dim().1, values.dim().2);
        Self { values, base_value }
    }

    pub fn zeros(n_samples: usize, n_features: usize, base_value: f64) -> Self {
        Self::new(Array3::zeros((n_samples, n_features, n_features)), base_value)
    }

    #[inline]
    pub fn n_samples(&self) -> usize {
        self.values.dim().0
    }

    #[inline]
    pub fn n_features(&self) -> usize {
        self.values.dim().1
    }

    #[inline]
    pub fn base_value(&self) -> f64 {
        self.base_value
    }

    #[inline]
    pub fn get(&self, sample: usize, i: usize, j: usize) -> f64 {
        self.values[[sample, i, j]]
    }

    /// Interaction matrix of one sample.
    pub fn sample(&self, sample: usize) -> ArrayView2<'_, f64> {
        self.values.index_axis(Axis(0), sample)
    }

    pub fn view(&self) -> ArrayView3<'_, f64> {
        self.values.view()
    }

    pub(crate) fn values_mut(&mut self) -> &mut Array3<f64> {
        &mut self.values
    }

    /// Raw values in row-major order, borrowed when the tensor is contiguous.
    pub fn as_slice(&self) -> Option<&[f64]> {
        self.values.as_slice()
    }

    /// Raw values in row-major order (sample, i, j).
    pub fn to_flat_vec(&self) -> Vec<f64> {
        self.values.iter().copied().collect()
    }

    /// Sum of the `rows × cols` block of one sample's matrix.
    pub fn block_sum(&self, sample: usize, rows: Range<usize>, cols: Range<usize>) -> f64 {
        self.values.slice(s![sample, rows, cols]).sum()
    }

    /// Base value plus the sum of the whole matrix of one sample.
    pub fn row_sum(&self, sample: usize) -> f64 {
        self.base_value + self.sample(sample).sum()
    }

    /// Collapse interactions to per-feature SHAP values (row sums).
    pub fn shap_values(&self) -> ShapValues {
        ShapValues::new(self.values.sum_axis(Axis(2)), self.base_value)
    }

    /// Whether every sample's matrix is symmetric within `tolerance`.
    pub fn is_symmetric(&self, tolerance: f64) -> bool {
        let n = self.n_features();
        (0..self.n_samples()).all(|r| {
            (0..n).all(|i| (i + 1..n).all(|j| (self.get(r, i, j) - self.get(r, j, i)).abs() <= tolerance))
        })
    }

    /// Verify that interaction values sum to the predictions.
    pub fn verify(&self, predictions: &[f64], tolerance: f64) -> bool {
        predictions.len() == self.n_samples()
            && predictions
                .iter()
                .enumerate()
                .all(|(i, &p)| (self.row_sum(i) - p).abs() <= tolerance)
    }

    /// Memory used by a tensor of this shape, in bytes.
    pub fn tensor_bytes(n_samples: usize, n_features: usize) -> usize {
        n_samples * n_features * n_features * std::mem::size_of::<f64>()
    }

    /// Write the tensor as a versioned postcard payload.
    pub fn save(&self, path: &Path) -> Result<(), PersistError> {
        crate::persist::save_shap(self, path)
    }

    /// Read a tensor written by [`save`](Self::save).
    pub fn load(path: &Path) -> Result<Self, PersistError> {
        crate::persist::load_shap(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn interactions() -> ShapInteractionValues {
        let values = array![
            [[1.0, 0.5, 0.0], [0.5, 2.0, -1.0], [0.0, -1.0, 3.0]],
            [[0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 0.0]],
        ];
        ShapInteractionValues::new(values, 10.0)
    }

    #[test]
    fn dimensions_and_access() {
        let shap = interactions();
        assert_eq!(shap.n_samples(), 2);
        assert_eq!(shap.n_features(), 3);
        assert_eq!(shap.get(0, 1, 2), -1.0);
        assert_eq!(shap.sample(1)[[1, 1]], 1.0);
        assert_eq!(shap.to_flat_vec().len(), 18);
    }

    #[test]
    fn block_and_row_sums() {
        let shap = interactions();
        assert_eq!(shap.block_sum(0, 0..1, 0..1), 1.0);
        assert_eq!(shap.block_sum(0, 0..2, 1..3), 0.5 + 0.0 + 2.0 - 1.0);
        assert_eq!(shap.row_sum(0), 10.0 + 5.0);
        assert!(shap.verify(&[15.0, 11.0], 1e-12));
        assert!(!shap.verify(&[15.0], 1e-12));
    }

    #[test]
    fn collapses_to_shap_values() {
        let shap = interactions().shap_values();
        assert_eq!(shap.sample(0).to_vec(), vec![1.5, 1.5, 2.0]);
        assert_eq!(shap.base_value(), 10.0);
        assert!(shap.verify(&[15.0, 11.0], 1e-12));
    }

    #[test]
    fn symmetry_check() {
        assert!(interactions().is_symmetric(0.0));
        let mut skewed = interactions();
        skewed.values_mut()[[0, 0, 1]] = 0.75;
        assert!(!skewed.is_symmetric(1e-3));
    }

    #[test]
    fn tensor_bytes_is_cubic() {
        assert_eq!(ShapInteractionValues::tensor_bytes(10, 4), 10 * 16 * 8);
    }
}
