//! Dense feature matrix.

use ndarray::{Array2, ArrayView1, ArrayView2};

/// Errors raised when assembling a [`FeatureMatrix`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MatrixError {
    /// Number of column names does not match the number of columns.
    #[error("matrix has {n_columns} columns but {n_names} column names")]
    ColumnNameMismatch { n_columns: usize, n_names: usize },
    /// Flat data length does not match `n_rows * n_features`.
    #[error("expected {expected} values, got {found}")]
    LengthMismatch { expected: usize, found: usize },
}

// =============================================================================
// SampleAccessor
// =============================================================================

/// Read access to the feature values of one sample.
///
/// Implemented for slices and ndarray row views so tree traversal works on
/// either.
pub trait SampleAccessor {
    /// Feature value at `index`. Out-of-range indices read as missing (NaN).
    fn feature(&self, index: usize) -> f32;
}

impl SampleAccessor for [f32] {
    #[inline]
    fn feature(&self, index: usize) -> f32 {
        self.get(index).copied().unwrap_or(f32::NAN)
    }
}

impl SampleAccessor for ArrayView1<'_, f32> {
    #[inline]
    fn feature(&self, index: usize) -> f32 {
        self.get(index).copied().unwrap_or(f32::NAN)
    }
}

// =============================================================================
// FeatureMatrix
// =============================================================================

/// Dense, sample-major feature matrix with named columns.
///
/// Shape is `[n_rows, n_features]`. Produced by the one-hot encoder, so every
/// entry is `0.0` or `1.0`, but the trainer and explainer accept any finite
/// values (NaN is treated as missing).
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    values: Array2<f32>,
    column_names: Vec<String>,
}

impl FeatureMatrix {
    /// Create a matrix from an array and its column names.
    pub fn new(values: Array2<f32>, column_names: Vec<String>) -> Result<Self, MatrixError> {
        if values.ncols() != column_names.len() {
            return Err(MatrixError::ColumnNameMismatch {
                n_columns: values.ncols(),
                n_names: column_names.len(),
            });
        }
        Ok(Self { values, column_names })
    }

    /// Create a matrix from row-major flat data.
    pub fn from_rows_flat(
        data: Vec<f32>,
        n_rows: usize,
        column_names: Vec<String>,
    ) -> Result<Self, MatrixError> {
        let n_features = column_names.len();
        let expected = n_rows * n_features;
        if data.len() != expected {
            return Err(MatrixError::LengthMismatch { expected, found: data.len() });
        }
        let values = Array2::from_shape_vec((n_rows, n_features), data)
            .map_err(|_| MatrixError::LengthMismatch { expected, found: expected })?;
        Self::new(values, column_names)
    }

    /// Number of rows (samples).
    #[inline]
    pub fn n_rows(&self) -> usize {
        self.values.nrows()
    }

    /// Number of feature columns.
    #[inline]
    pub fn n_features(&self) -> usize {
        self.values.ncols()
    }

    /// Column names in column order.
    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    /// View of the underlying `[n_rows, n_features]` array.
    #[inline]
    pub fn view(&self) -> ArrayView2<'_, f32> {
        self.values.view()
    }

    /// View of one row.
    #[inline]
    pub fn row(&self, row: usize) -> ArrayView1<'_, f32> {
        self.values.row(row)
    }

    /// Value at `(row, column)`.
    #[inline]
    pub fn get(&self, row: usize, column: usize) -> f32 {
        self.values[[row, column]]
    }

    /// Whether the indicator at `(row, column)` is set.
    #[inline]
    pub fn is_active(&self, row: usize, column: usize) -> bool {
        self.values[[row, column]] == 1.0
    }

    /// Rows where `column` is set.
    pub fn active_rows(&self, column: usize) -> Vec<usize> {
        (0..self.n_rows()).filter(|&r| self.is_active(r, column)).collect()
    }
}
