//! Canonical forest representation (collection of trees).

use ndarray::ArrayView2;

use crate::data::SampleAccessor;

use super::{Tree, TreeValidationError};

/// Structural validation errors for [`Forest`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ForestValidationError {
    #[error("base score {0} is not finite")]
    NonFiniteBaseScore(f64),
    #[error("tree {tree_idx}: {error}")]
    InvalidTree { tree_idx: usize, error: TreeValidationError },
}

/// Additive ensemble of regression trees.
///
/// The prediction for a row is `base_score + Σ tree leaf value`.
#[derive(Debug, Clone, PartialEq)]
pub struct Forest {
    trees: Vec<Tree>,
    base_score: f64,
}

impl Forest {
    /// Create an empty forest with the given base score.
    pub fn new(base_score: f64) -> Self {
        Self { trees: Vec::new(), base_score }
    }

    /// Add a tree to the forest.
    pub fn push_tree(&mut self, tree: Tree) {
        self.trees.push(tree);
    }

    #[inline]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    #[inline]
    pub fn base_score(&self) -> f64 {
        self.base_score
    }

    #[inline]
    pub fn tree(&self, idx: usize) -> &Tree {
        &self.trees[idx]
    }

    pub fn trees(&self) -> impl Iterator<Item = &Tree> {
        self.trees.iter()
    }

    /// Maximum depth over all trees.
    pub fn max_depth(&self) -> usize {
        self.trees.iter().map(Tree::max_depth).max().unwrap_or(0)
    }

    /// Largest split feature index + 1 (0 if no splits).
    pub fn n_features_used(&self) -> usize {
        self.trees
            .iter()
            .flat_map(|t| (0..t.n_nodes() as u32).filter(|&n| !t.is_leaf(n)).map(|n| t.split_index(n) as usize + 1))
            .max()
            .unwrap_or(0)
    }

    /// Validate structural invariants for this forest.
    pub fn validate(&self) -> Result<(), ForestValidationError> {
        if !self.base_score.is_finite() {
            return Err(ForestValidationError::NonFiniteBaseScore(self.base_score));
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate()
                .map_err(|e| ForestValidationError::InvalidTree { tree_idx: i, error: e })?;
        }
        Ok(())
    }

    /// Predict a single row.
    pub fn predict_row<S: SampleAccessor + ?Sized>(&self, sample: &S) -> f64 {
        self.base_score + self.trees.iter().map(|t| t.predict_row(sample)).sum::<f64>()
    }

    /// Predict every row of a `[n_rows, n_features]` view.
    pub fn predict(&self, features: ArrayView2<'_, f32>) -> Vec<f64> {
        features.rows().into_iter().map(|row| self.predict_row(&row)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn stump(feature: u32, left: f64, right: f64) -> Tree {
        Tree::new(
            vec![feature, 0, 0],
            vec![0.5, 0.0, 0.0],
            vec![1, 0, 0],
            vec![2, 0, 0],
            vec![true; 3],
            vec![false, true, true],
            vec![0.0, left, right],
        )
    }

    #[test]
    fn predictions_sum_base_and_leaves() {
        let mut forest = Forest::new(0.5);
        forest.push_tree(stump(0, -1.0, 1.0));
        forest.push_tree(stump(1, 10.0, 20.0));

        let x = array![[0.0f32, 0.0], [1.0, 0.0], [1.0, 1.0]];
        assert_eq!(forest.predict(x.view()), vec![9.5, 11.5, 21.5]);
        assert_eq!(forest.n_features_used(), 2);
        assert_eq!(forest.max_depth(), 1);
    }

    #[test]
    fn validate_reports_tree_index() {
        let mut forest = Forest::new(0.0);
        forest.push_tree(stump(0, 1.0, 2.0));
        forest.push_tree(Tree::leaf(1.0).with_covers(vec![1.0, 2.0]));
        assert!(matches!(
            forest.validate(),
            Err(ForestValidationError::InvalidTree { tree_idx: 1, .. })
        ));
        assert!(matches!(
            Forest::new(f64::NAN).validate(),
            Err(ForestValidationError::NonFiniteBaseScore(_))
        ));
    }
}
