//! One-hot encoder.

use std::collections::BTreeSet;

use ndarray::Array2;

use super::layout::{FeatureGroup, FeatureGroupSpec, FeatureLayout, GroupKind};
use crate::data::{FeatureMatrix, MatrixError};

/// Errors from fitting or applying the encoder.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FeatureError {
    /// The encoder was fitted on zero rows.
    #[error("cannot fit encoder on an empty set of rows")]
    EmptyTrainingSet,
    /// A row provides a different number of groups than the encoder declares.
    #[error("row {row} has {found} feature groups, expected {expected}")]
    GroupCountMismatch { row: usize, expected: usize, found: usize },
    /// A one-hot group does not have exactly one level in a row.
    #[error("row {row}: one-hot group '{group}' has {n_levels} levels, expected exactly one")]
    InvalidOneHot { row: usize, group: String, n_levels: usize },
    /// Two groups produce the same column name.
    #[error("column '{column}' is produced by more than one feature group")]
    DuplicateColumn { column: String },
    /// Internal shape error while building the matrix.
    #[error(transparent)]
    Matrix(#[from] MatrixError),
}

// =============================================================================
// CategoricalRow
// =============================================================================

/// Levels of every feature group for one row, in group order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoricalRow {
    groups: Vec<Vec<String>>,
}

impl CategoricalRow {
    /// Empty row; add groups with [`level`](Self::level) and [`levels`](Self::levels).
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a group with a single level.
    pub fn level(mut self, level: impl Into<String>) -> Self {
        self.groups.push(vec![level.into()]);
        self
    }

    /// Append a group with any number of levels.
    pub fn levels<I, S>(mut self, levels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.groups.push(levels.into_iter().map(Into::into).collect());
        self
    }

    /// Number of groups.
    pub fn n_groups(&self) -> usize {
        self.groups.len()
    }

    /// Levels of group `index`.
    pub fn group(&self, index: usize) -> &[String] {
        &self.groups[index]
    }
}

// =============================================================================
// OneHotEncoder
// =============================================================================

/// Encoded rows plus the input indices they came from.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedRows {
    pub matrix: FeatureMatrix,
    /// Input row index of each matrix row.
    pub kept: Vec<usize>,
    /// Number of input rows dropped for unseen levels.
    pub dropped: usize,
}

/// Learns sorted levels per group and encodes rows into indicator columns.
#[derive(Debug, Clone, PartialEq)]
pub struct OneHotEncoder {
    specs: Vec<FeatureGroupSpec>,
    levels: Vec<Vec<String>>,
    layout: FeatureLayout,
}

impl OneHotEncoder {
    /// Fit the encoder on training rows.
    ///
    /// Levels of each group are collected across all rows and sorted, so the
    /// column order depends only on the set of levels seen.
    pub fn fit(specs: Vec<FeatureGroupSpec>, rows: &[CategoricalRow]) -> Result<Self, FeatureError> {
        if rows.is_empty() {
            return Err(FeatureError::EmptyTrainingSet);
        }

        let mut seen: Vec<BTreeSet<&str>> = vec![BTreeSet::new(); specs.len()];
        for (i, row) in rows.iter().enumerate() {
            validate_row(&specs, i, row)?;
            for (g, set) in seen.iter_mut().enumerate() {
                set.extend(row.group(g).iter().map(String::as_str));
            }
        }

        let levels: Vec<Vec<String>> = seen
            .into_iter()
            .map(|set| set.into_iter().map(String::from).collect())
            .collect();

        Self::from_levels(specs, levels)
    }

    /// Build an encoder from known levels (sorted internally).
    ///
    /// Column names must be unique across groups.
    pub fn from_levels(specs: Vec<FeatureGroupSpec>, mut levels: Vec<Vec<String>>) -> Result<Self, FeatureError> {
        let mut groups = Vec::with_capacity(specs.len());
        let mut column_names = Vec::new();
        for (spec, group_levels) in specs.iter().zip(levels.iter_mut()) {
            group_levels.sort();
            group_levels.dedup();
            let start = column_names.len();
            column_names.extend(group_levels.iter().map(|l| spec.column_name(l)));
            groups.push(FeatureGroup {
                name: spec.name.clone(),
                kind: spec.kind,
                columns: start..column_names.len(),
            });
        }

        let mut names = BTreeSet::new();
        if let Some(column) = column_names.iter().find(|c| !names.insert(c.as_str())) {
            return Err(FeatureError::DuplicateColumn { column: column.clone() });
        }

        let layout = FeatureLayout::new(groups, column_names);
        Ok(Self { specs, levels, layout })
    }

    /// Group declarations.
    pub fn specs(&self) -> &[FeatureGroupSpec] {
        &self.specs
    }

    /// Sorted levels of each group.
    pub fn levels(&self) -> &[Vec<String>] {
        &self.levels
    }

    /// Column layout of encoded matrices.
    pub fn layout(&self) -> &FeatureLayout {
        &self.layout
    }

    /// Encode rows.
    ///
    /// Rows containing a level that was not seen during [`fit`](Self::fit) are
    /// dropped; `kept` records which input rows were encoded.
    pub fn transform(&self, rows: &[CategoricalRow]) -> Result<EncodedRows, FeatureError> {
        let n_features = self.layout.n_features();
        let mut active: Vec<Vec<usize>> = Vec::with_capacity(rows.len());
        let mut kept = Vec::with_capacity(rows.len());

        'rows: for (i, row) in rows.iter().enumerate() {
            validate_row(&self.specs, i, row)?;
            let mut columns = Vec::new();
            for (g, group) in self.layout.groups().iter().enumerate() {
                for level in row.group(g) {
                    match self.levels[g].binary_search(level) {
                        Ok(pos) => columns.push(group.columns.start + pos),
                        Err(_) => continue 'rows,
                    }
                }
            }
            active.push(columns);
            kept.push(i);
        }

        let mut values = Array2::<f32>::zeros((kept.len(), n_features));
        for (r, columns) in active.iter().enumerate() {
            for &c in columns {
                values[[r, c]] = 1.0;
            }
        }

        let dropped = rows.len() - kept.len();
        if dropped > 0 {
            tracing::debug!(dropped, "rows with unseen levels excluded from encoding");
        }

        let matrix = FeatureMatrix::new(values, self.layout.column_names().to_vec())?;
        Ok(EncodedRows { matrix, kept, dropped })
    }
}

fn validate_row(specs: &[FeatureGroupSpec], index: usize, row: &CategoricalRow) -> Result<(), FeatureError> {
    if row.n_groups() != specs.len() {
        return Err(FeatureError::GroupCountMismatch {
            row: index,
            expected: specs.len(),
            found: row.n_groups(),
        });
    }
    for (g, spec) in specs.iter().enumerate() {
        let n_levels = row.group(g).len();
        if spec.kind == GroupKind::OneHot && n_levels != 1 {
            return Err(FeatureError::InvalidOneHot { row: index, group: spec.name.clone(), n_levels });
        }
    }
    Ok(())
}
