//! TreeSHAP explainer for tree ensembles.
//!
//! Implements path-dependent TreeSHAP from Lundberg et al. (2020):
//! "From local explanations to global understanding with explainable AI for trees",
//! including the conditioned variant used for interaction values.

use std::collections::BTreeSet;

use ndarray::{Array2, ArrayView1, ArrayView2};

use crate::data::SampleAccessor;
use crate::explainability::ExplainError;
use crate::repr::gbdt::{Forest, NodeId, Tree};

use super::path::{extend_path, path_buffer_len, unwind_path, unwound_path_sum, PathElement, ROOT_FEATURE};
use super::values::{ShapInteractionValues, ShapValues};

/// Feature a TreeSHAP pass is conditioned on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Condition {
    /// Plain SHAP values.
    None,
    /// The feature is always present (follows the sample).
    On(usize),
    /// The feature is always absent (follows covers).
    Off(usize),
}

impl Condition {
    fn feature(self) -> Option<usize> {
        match self {
            Condition::None => None,
            Condition::On(f) | Condition::Off(f) => Some(f),
        }
    }
}

/// TreeSHAP explainer for tree-based models.
///
/// Computes exact SHAP values for tree ensembles in polynomial time.
pub struct TreeExplainer<'a> {
    forest: &'a Forest,
    /// Expected model output over the training distribution.
    base_value: f64,
    /// Distinct split features of each tree.
    tree_features: Vec<BTreeSet<usize>>,
    /// Union of `tree_features`.
    used_features: BTreeSet<usize>,
    path_len: usize,
}

impl<'a> TreeExplainer<'a> {
    /// Create a new TreeExplainer for the given forest.
    ///
    /// # Errors
    /// Returns `ExplainError::MissingNodeStats` if a tree has no covers.
    pub fn new(forest: &'a Forest) -> Result<Self, ExplainError> {
        let mut base_value = forest.base_score();
        let mut tree_features = Vec::with_capacity(forest.n_trees());
        for (tree_idx, tree) in forest.trees().enumerate() {
            let means = tree
                .node_mean_values()
                .ok_or(ExplainError::MissingNodeStats { tree: tree_idx })?;
            base_value += means[0];
            tree_features.push(split_features(tree));
        }
        let used_features = tree_features.iter().flatten().copied().collect();

        Ok(Self {
            forest,
            base_value,
            tree_features,
            used_features,
            path_len: path_buffer_len(forest.max_depth()),
        })
    }

    /// Expected prediction: base score plus each tree's cover-weighted mean leaf.
    pub fn base_value(&self) -> f64 {
        self.base_value
    }

    /// Number of attribution columns for a matrix with `n_cols` columns.
    fn output_width(&self, n_cols: usize) -> usize {
        let max_used = self.used_features.last().map_or(0, |&f| f + 1);
        n_cols.max(max_used)
    }

    /// Compute SHAP values for every row of `features`.
    pub fn shap_values(&self, features: ArrayView2<'_, f32>) -> ShapValues {
        let n_features = self.output_width(features.ncols());
        let mut values = Array2::zeros((features.nrows(), n_features));
        let mut path = vec![PathElement::default(); self.path_len];
        let mut phi = vec![0.0; n_features];

        for (row_idx, row) in features.rows().into_iter().enumerate() {
            phi.fill(0.0);
            for tree in self.forest.trees() {
                tree_shap(tree, &row, &mut phi, &mut path, Condition::None);
            }
            values.row_mut(row_idx).assign(&ArrayView1::from(&phi[..]));
        }
        ShapValues::new(values, self.base_value)
    }

    /// Compute SHAP interaction values for every row of `features`.
    ///
    /// Off-diagonal entries are half the difference between the feature's
    /// attributions with `i` forced present and forced absent; the diagonal
    /// holds the remaining main effect so rows sum to SHAP values.
    pub fn shap_interaction_values(&self, features: ArrayView2<'_, f32>) -> ShapInteractionValues {
        let n_rows = features.nrows();
        let n_features = self.output_width(features.ncols());
        tracing::debug!(
            n_rows,
            n_features,
            bytes = ShapInteractionValues::tensor_bytes(n_rows, n_features),
            "allocating SHAP interaction tensor"
        );
        let mut out = ShapInteractionValues::zeros(n_rows, n_features, self.base_value);
        let mut path = vec![PathElement::default(); self.path_len];
        let mut diag = vec![0.0; n_features];
        let mut on = vec![0.0; n_features];
        let mut off = vec![0.0; n_features];

        for (row_idx, row) in features.rows().into_iter().enumerate() {
            diag.fill(0.0);
            for tree in self.forest.trees() {
                tree_shap(tree, &row, &mut diag, &mut path, Condition::None);
            }

            let values = out.values_mut();
            for &i in &self.used_features {
                on.fill(0.0);
                off.fill(0.0);
                for (tree, split_features) in self.forest.trees().zip(&self.tree_features) {
                    if split_features.contains(&i) {
                        tree_shap(tree, &row, &mut on, &mut path, Condition::On(i));
                        tree_shap(tree, &row, &mut off, &mut path, Condition::Off(i));
                    }
                }

                let mut main_effect = diag[i];
                for j in 0..n_features {
                    if j != i {
                        let half = (on[j] - off[j]) / 2.0;
                        values[[row_idx, i, j]] = half;
                        main_effect -= half;
                    }
                }
                values[[row_idx, i, i]] = main_effect;
            }
        }
        out
    }
}

fn split_features(tree: &Tree) -> BTreeSet<usize> {
    (0..tree.n_nodes() as NodeId)
        .filter(|&n| !tree.is_leaf(n))
        .map(|n| tree.split_index(n) as usize)
        .collect()
}

/// Add one tree's attributions for `sample` into `phi`.
fn tree_shap<S: SampleAccessor + ?Sized>(
    tree: &Tree,
    sample: &S,
    phi: &mut [f64],
    path: &mut [PathElement],
    condition: Condition,
) {
    // Covers are checked when the explainer is built
    let Some(covers) = tree.covers() else {
        return;
    };
    let mut walker = PathWalker { tree, covers, sample, phi, path, condition };
    walker.recurse(0, 0, 0, 1.0, 1.0, ROOT_FEATURE, 1.0);
}

/// State shared by the recursive walk over one tree.
struct PathWalker<'w, S: SampleAccessor + ?Sized> {
    tree: &'w Tree,
    covers: &'w [f64],
    sample: &'w S,
    phi: &'w mut [f64],
    /// Flat buffer; each recursion level owns a segment.
    path: &'w mut [PathElement],
    condition: Condition,
}

impl<S: SampleAccessor + ?Sized> PathWalker<'_, S> {
    #[allow(clippy::too_many_arguments)]
    fn recurse(
        &mut self,
        node: NodeId,
        depth: usize,
        parent_offset: usize,
        parent_zero_fraction: f64,
        parent_one_fraction: f64,
        parent_feature: usize,
        condition_fraction: f64,
    ) {
        // No weight reaches this node
        if condition_fraction == 0.0 {
            return;
        }

        // Copy the parent's path into this level's segment
        let offset = parent_offset + depth + 1;
        self.path.copy_within(parent_offset..parent_offset + depth + 1, offset);
        let path = &mut self.path[offset..];

        if self.condition.feature() != Some(parent_feature) {
            extend_path(path, depth, parent_zero_fraction, parent_one_fraction, parent_feature);
        }

        let tree = self.tree;
        if tree.is_leaf(node) {
            let leaf = tree.leaf_value(node);
            for i in 1..=depth {
                let weight = unwound_path_sum(path, depth, i);
                let el = path[i];
                self.phi[el.feature] += weight * (el.one_fraction - el.zero_fraction) * leaf * condition_fraction;
            }
            return;
        }

        let split = tree.split_index(node) as usize;
        let hot = tree.child_for(node, self.sample.feature(split));
        let cold = if hot == tree.left_child(node) { tree.right_child(node) } else { tree.left_child(node) };
        let cover = self.covers[node as usize];
        let fraction = |child: NodeId| if cover > 0.0 { self.covers[child as usize] / cover } else { 0.0 };
        let hot_zero_fraction = fraction(hot);
        let cold_zero_fraction = fraction(cold);

        // Undo an earlier split on the same feature so it is counted once
        let mut incoming_zero_fraction = 1.0;
        let mut incoming_one_fraction = 1.0;
        let mut unwound = 0;
        if let Some(index) = (0..=depth).find(|&k| path[k].feature == split) {
            incoming_zero_fraction = path[index].zero_fraction;
            incoming_one_fraction = path[index].one_fraction;
            unwind_path(path, depth, index);
            unwound = 1;
        }

        let mut hot_condition_fraction = condition_fraction;
        let mut cold_condition_fraction = condition_fraction;
        let mut conditioned = 0;
        match self.condition {
            Condition::On(f) if f == split => {
                cold_condition_fraction = 0.0;
                conditioned = 1;
            }
            Condition::Off(f) if f == split => {
                hot_condition_fraction *= hot_zero_fraction;
                cold_condition_fraction *= cold_zero_fraction;
                conditioned = 1;
            }
            _ => {}
        }

        let next_depth = depth + 1 - unwound - conditioned;
        self.recurse(
            hot,
            next_depth,
            offset,
            hot_zero_fraction * incoming_zero_fraction,
            incoming_one_fraction,
            split,
            hot_condition_fraction,
        );
        self.recurse(
            cold,
            next_depth,
            offset,
            cold_zero_fraction * incoming_zero_fraction,
            0.0,
            split,
            cold_condition_fraction,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repr::gbdt::MutableTree;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    /// x0 < 0.5 ? (x1 < 0.5 ? a : b) : (x1 < 0.5 ? c : d), equal covers.
    fn and_tree(a: f64, b: f64, c: f64, d: f64) -> Tree {
        let mut t = MutableTree::new();
        let root = t.init_root();
        let (l, r) = t.apply_numeric_split(root, 0, 0.5, true);
        let (ll, lr) = t.apply_numeric_split(l, 1, 0.5, true);
        let (rl, rr) = t.apply_numeric_split(r, 1, 0.5, true);
        for (node, value) in [(ll, a), (lr, b), (rl, c), (rr, d)] {
            t.make_leaf(node, value);
            t.set_cover(node, 1.0);
        }
        for node in [l, r] {
            t.set_cover(node, 2.0);
        }
        t.set_cover(root, 4.0);
        t.freeze()
    }

    #[test]
    fn missing_covers_are_rejected() {
        let mut forest = Forest::new(0.0);
        forest.push_tree(Tree::leaf(1.0));
        assert_eq!(
            TreeExplainer::new(&forest).err(),
            Some(ExplainError::MissingNodeStats { tree: 0 })
        );
    }

    #[test]
    fn base_value_is_cover_weighted_mean() {
        let mut forest = Forest::new(0.5);
        forest.push_tree(and_tree(0.0, 0.0, 0.0, 4.0));
        let explainer = TreeExplainer::new(&forest).unwrap();
        assert_abs_diff_eq!(explainer.base_value(), 1.5, epsilon = 1e-12);
    }

    #[test]
    fn and_function_splits_credit_equally() {
        // f = 4·x0·x1 with uniform background: each feature gets 1.5 at (1, 1)
        let mut forest = Forest::new(0.0);
        forest.push_tree(and_tree(0.0, 0.0, 0.0, 4.0));
        let explainer = TreeExplainer::new(&forest).unwrap();

        let x = array![[1.0f32, 1.0], [0.0, 0.0]];
        let shap = explainer.shap_values(x.view());
        assert_abs_diff_eq!(shap.get(0, 0), 1.5, epsilon = 1e-12);
        assert_abs_diff_eq!(shap.get(0, 1), 1.5, epsilon = 1e-12);
        assert_abs_diff_eq!(shap.get(1, 0), -0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(shap.get(1, 1), -0.5, epsilon = 1e-12);
        assert!(shap.verify(&forest.predict(x.view()), 1e-12));
    }

    #[test]
    fn and_function_interactions() {
        let mut forest = Forest::new(0.0);
        forest.push_tree(and_tree(0.0, 0.0, 0.0, 4.0));
        let explainer = TreeExplainer::new(&forest).unwrap();

        let x = array![[1.0f32, 1.0]];
        let inter = explainer.shap_interaction_values(x.view());
        // (v01 - v0 - v1 + v∅) / 2 = (4 - 2 - 2 + 1) / 2
        assert_abs_diff_eq!(inter.get(0, 0, 1), 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(inter.get(0, 1, 0), 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(inter.get(0, 0, 0), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(inter.get(0, 1, 1), 1.0, epsilon = 1e-12);
        assert!(inter.verify(&[4.0], 1e-12));
    }

    #[test]
    fn additive_function_has_no_interaction() {
        // f = x0 + 2·x1
        let mut forest = Forest::new(0.0);
        forest.push_tree(and_tree(0.0, 2.0, 1.0, 3.0));
        let explainer = TreeExplainer::new(&forest).unwrap();

        let x = array![[1.0f32, 0.0], [0.0, 1.0]];
        let inter = explainer.shap_interaction_values(x.view());
        for row in 0..2 {
            assert_abs_diff_eq!(inter.get(row, 0, 1), 0.0, epsilon = 1e-12);
            assert_abs_diff_eq!(inter.get(row, 1, 0), 0.0, epsilon = 1e-12);
        }
        assert_abs_diff_eq!(inter.get(0, 0, 0), 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(inter.get(0, 1, 1), -1.0, epsilon = 1e-12);
    }

    #[test]
    fn repeated_feature_on_path_is_counted_once() {
        // x0 < 0.5 ? 0 : (x0 < 1.5 ? 1 : 3)
        let mut t = MutableTree::new();
        let root = t.init_root();
        let (l, r) = t.apply_numeric_split(root, 0, 0.5, true);
        let (rl, rr) = t.apply_numeric_split(r, 0, 1.5, true);
        t.make_leaf(l, 0.0);
        t.make_leaf(rl, 1.0);
        t.make_leaf(rr, 3.0);
        for (node, cover) in [(root, 4.0), (l, 2.0), (r, 2.0), (rl, 1.0), (rr, 1.0)] {
            t.set_cover(node, cover);
        }
        let mut forest = Forest::new(0.0);
        forest.push_tree(t.freeze());
        let explainer = TreeExplainer::new(&forest).unwrap();

        let x = array![[2.0f32]];
        let shap = explainer.shap_values(x.view());
        // Single feature takes all credit: f(x) - E[f] = 3 - 1
        assert_abs_diff_eq!(shap.get(0, 0), 2.0, epsilon = 1e-12);
        let inter = explainer.shap_interaction_values(x.view());
        assert_abs_diff_eq!(inter.get(0, 0, 0), 2.0, epsilon = 1e-12);
    }
}
