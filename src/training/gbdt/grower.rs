//! Depth-wise tree grower.
//!
//! Nodes are expanded breadth first. A node becomes a leaf when it reaches
//! the maximum depth or no split passes the gain constraints.

use std::collections::VecDeque;

use ndarray::ArrayView2;

use crate::repr::gbdt::{MutableTree, NodeId};
use crate::training::GradsTuple;

use super::split::{find_best_split, GainParams};

/// Parameters for tree growth.
#[derive(Clone, Debug)]
pub struct GrowerParams {
    pub gain: GainParams,
    pub learning_rate: f64,
    pub max_depth: u32,
}

impl Default for GrowerParams {
    fn default() -> Self {
        Self {
            gain: GainParams::default(),
            learning_rate: 0.3,
            max_depth: 6,
        }
    }
}

/// Grows one regression tree from gradients.
pub struct TreeGrower {
    params: GrowerParams,
    /// Leaf value reached by each training row in the last grown tree.
    last_leaf_values: Vec<f64>,
}

struct PendingNode {
    node: NodeId,
    rows: Vec<usize>,
    depth: u32,
}

impl TreeGrower {
    pub fn new(params: GrowerParams, n_rows: usize) -> Self {
        Self {
            params,
            last_leaf_values: vec![0.0; n_rows],
        }
    }

    pub fn params(&self) -> &GrowerParams {
        &self.params
    }

    /// Grow a tree on all rows of `features`, considering only `columns`.
    pub fn grow(
        &mut self,
        features: ArrayView2<'_, f32>,
        grad_hess: &[GradsTuple],
        columns: &[usize],
    ) -> MutableTree {
        let n_rows = features.nrows();
        self.last_leaf_values.clear();
        self.last_leaf_values.resize(n_rows, 0.0);

        let mut tree = MutableTree::with_capacity(2usize.pow(self.params.max_depth.min(16) + 1));
        let root = tree.init_root();
        let mut queue = VecDeque::from([PendingNode {
            node: root,
            rows: (0..n_rows).collect(),
            depth: 0,
        }]);

        while let Some(PendingNode { node, rows, depth }) = queue.pop_front() {
            let (grad, hess) = rows
                .iter()
                .fold((0.0, 0.0), |(g, h), &r| (g + grad_hess[r].grad, h + grad_hess[r].hess));
            tree.set_cover(node, hess);

            let split = if depth < self.params.max_depth {
                find_best_split(features, &rows, grad_hess, columns, &self.params.gain)
            } else {
                None
            };

            match split {
                Some(split) => {
                    let (left, right) = tree.apply_numeric_split(
                        node,
                        split.feature as u32,
                        split.threshold,
                        split.default_left,
                    );
                    tree.set_gain(node, split.gain);

                    let (left_rows, right_rows): (Vec<usize>, Vec<usize>) =
                        rows.into_iter().partition(|&r| {
                            let value = features[[r, split.feature]];
                            if value.is_nan() { split.default_left } else { value < split.threshold }
                        });
                    queue.push_back(PendingNode { node: left, rows: left_rows, depth: depth + 1 });
                    queue.push_back(PendingNode { node: right, rows: right_rows, depth: depth + 1 });
                }
                None => {
                    let value = self.params.gain.leaf_weight(grad, hess, self.params.learning_rate);
                    tree.make_leaf(node, value);
                    for r in rows {
                        self.last_leaf_values[r] = value;
                    }
                }
            }
        }

        tree
    }

    /// Add the last grown tree's output to the training predictions.
    pub fn update_predictions_from_last_tree(&self, predictions: &mut [f64]) {
        for (pred, &leaf) in predictions.iter_mut().zip(&self.last_leaf_values) {
            *pred += leaf;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn grows_to_pure_leaves() {
        let x = array![[0.0f32, 0.0], [1.0, 0.0], [0.0, 1.0], [1.0, 1.0]];
        let gh: Vec<_> = [1.0, 2.0, 5.0, 6.0].iter().map(|&y| GradsTuple::new(-y, 1.0)).collect();
        let params = GrowerParams {
            gain: GainParams { lambda: 0.0, min_gain: 0.0, min_child_weight: 1.0 },
            learning_rate: 1.0,
            max_depth: 2,
        };
        let mut grower = TreeGrower::new(params, 4);
        let tree = grower.grow(x.view(), &gh, &[0, 1]).freeze();

        assert!(tree.validate().is_ok());
        assert_eq!(tree.max_depth(), 2);
        assert_eq!(tree.covers().map(|c| c[0]), Some(4.0));
        for (row, expected) in [1.0, 2.0, 5.0, 6.0].into_iter().enumerate() {
            let sample = x.row(row);
            assert_abs_diff_eq!(tree.predict_row(&sample), expected, epsilon = 1e-12);
        }

        let mut preds = vec![0.0; 4];
        grower.update_predictions_from_last_tree(&mut preds);
        assert_eq!(preds, vec![1.0, 2.0, 5.0, 6.0]);
    }

    #[test]
    fn max_depth_limits_growth() {
        let x = array![[0.0f32, 0.0], [1.0, 0.0], [0.0, 1.0], [1.0, 1.0]];
        let gh: Vec<_> = [1.0, 2.0, 5.0, 6.0].iter().map(|&y| GradsTuple::new(-y, 1.0)).collect();
        let params = GrowerParams { max_depth: 1, ..Default::default() };
        let tree = TreeGrower::new(params, 4).grow(x.view(), &gh, &[0, 1]).freeze();
        assert_eq!(tree.max_depth(), 1);
        assert_eq!(tree.split_index(0), 1);
    }
}
