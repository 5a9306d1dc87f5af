//! Canonical tree representation (SoA).
//!
//! Splits are numeric: a sample goes left when `value < threshold`, and
//! missing values (NaN) follow the node's default direction.

use crate::data::SampleAccessor;

use super::NodeId;

// ============================================================================
// TreeValidationError
// ============================================================================

/// Structural validation errors for [`Tree`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeValidationError {
    /// Tree has no nodes.
    #[error("tree has no nodes")]
    EmptyTree,
    /// Node arrays have different lengths.
    #[error("node array '{field}' has length {len}, expected {n_nodes}")]
    ArrayLenMismatch { field: &'static str, len: usize, n_nodes: usize },
    /// A child pointer references an out-of-bounds node.
    #[error("node {node} has {side} child {child} out of bounds ({n_nodes} nodes)")]
    ChildOutOfBounds {
        node: NodeId,
        side: &'static str,
        child: NodeId,
        n_nodes: usize,
    },
    /// A node references itself as a child.
    #[error("node {node} references itself")]
    SelfLoop { node: NodeId },
    /// A node was reached by more than one path or due to a cycle.
    #[error("node {node} is reachable by more than one path")]
    DuplicateVisit { node: NodeId },
    /// A node exists in storage but is unreachable from the root.
    #[error("node {node} is unreachable from the root")]
    UnreachableNode { node: NodeId },
}

// ============================================================================
// Tree
// ============================================================================

/// Structure-of-Arrays regression tree.
///
/// Stores tree nodes in flat arrays for cache-friendly traversal.
/// Child indices are local to this tree (0 = root).
#[derive(Debug, Clone, PartialEq)]
pub struct Tree {
    split_indices: Box<[u32]>,
    split_thresholds: Box<[f32]>,
    left_children: Box<[u32]>,
    right_children: Box<[u32]>,
    default_left: Box<[bool]>,
    is_leaf: Box<[bool]>,
    leaf_values: Box<[f64]>,
    /// Optional gain at each split node (for explainability).
    gains: Option<Box<[f64]>>,
    /// Optional cover (hessian sum) at each node (required by TreeSHAP).
    covers: Option<Box<[f64]>>,
}

impl Tree {
    /// Create a new tree from parallel arrays.
    ///
    /// All arrays must have the same length (number of nodes); use
    /// [`validate`](Self::validate) to check untrusted input.
    pub fn new(
        split_indices: Vec<u32>,
        split_thresholds: Vec<f32>,
        left_children: Vec<u32>,
        right_children: Vec<u32>,
        default_left: Vec<bool>,
        is_leaf: Vec<bool>,
        leaf_values: Vec<f64>,
    ) -> Self {
        Self {
            split_indices: split_indices.into_boxed_slice(),
            split_thresholds: split_thresholds.into_boxed_slice(),
            left_children: left_children.into_boxed_slice(),
            right_children: right_children.into_boxed_slice(),
            default_left: default_left.into_boxed_slice(),
            is_leaf: is_leaf.into_boxed_slice(),
            leaf_values: leaf_values.into_boxed_slice(),
            gains: None,
            covers: None,
        }
    }

    /// Single-leaf tree.
    pub fn leaf(value: f64) -> Self {
        Self::new(vec![0], vec![0.0], vec![0], vec![0], vec![true], vec![true], vec![value])
    }

    /// Set the gains for this tree (builder pattern).
    pub fn with_gains(mut self, gains: Vec<f64>) -> Self {
        self.gains = Some(gains.into_boxed_slice());
        self
    }

    /// Set the covers for this tree (builder pattern).
    pub fn with_covers(mut self, covers: Vec<f64>) -> Self {
        self.covers = Some(covers.into_boxed_slice());
        self
    }

    // =========================================================================
    // Node access
    // =========================================================================

    /// Number of nodes in the tree.
    #[inline]
    pub fn n_nodes(&self) -> usize {
        self.is_leaf.len()
    }

    /// Number of leaves.
    pub fn n_leaves(&self) -> usize {
        self.is_leaf.iter().filter(|&&l| l).count()
    }

    #[inline]
    pub fn is_leaf(&self, node: NodeId) -> bool {
        self.is_leaf[node as usize]
    }

    #[inline]
    pub fn split_index(&self, node: NodeId) -> u32 {
        self.split_indices[node as usize]
    }

    #[inline]
    pub fn split_threshold(&self, node: NodeId) -> f32 {
        self.split_thresholds[node as usize]
    }

    #[inline]
    pub fn left_child(&self, node: NodeId) -> NodeId {
        self.left_children[node as usize]
    }

    #[inline]
    pub fn right_child(&self, node: NodeId) -> NodeId {
        self.right_children[node as usize]
    }

    #[inline]
    pub fn default_left(&self, node: NodeId) -> bool {
        self.default_left[node as usize]
    }

    #[inline]
    pub fn leaf_value(&self, node: NodeId) -> f64 {
        self.leaf_values[node as usize]
    }

    /// Child a sample with `value` for the node's split feature goes to.
    #[inline]
    pub fn child_for(&self, node: NodeId, value: f32) -> NodeId {
        let go_left = if value.is_nan() {
            self.default_left(node)
        } else {
            value < self.split_threshold(node)
        };
        if go_left { self.left_child(node) } else { self.right_child(node) }
    }

    /// Raw arrays, in constructor order (used by persistence).
    pub(crate) fn arrays(&self) -> (&[u32], &[f32], &[u32], &[u32], &[bool], &[bool], &[f64]) {
        (
            &self.split_indices,
            &self.split_thresholds,
            &self.left_children,
            &self.right_children,
            &self.default_left,
            &self.is_leaf,
            &self.leaf_values,
        )
    }

    // =========================================================================
    // Explainability: Gains and Covers
    // =========================================================================

    /// Check if this tree has cover statistics.
    #[inline]
    pub fn has_covers(&self) -> bool {
        self.covers.is_some()
    }

    /// Gain of each node (0 for leaves).
    pub fn gains(&self) -> Option<&[f64]> {
        self.gains.as_deref()
    }

    /// Cover of each node: the sum of hessians of the training rows reaching it.
    pub fn covers(&self) -> Option<&[f64]> {
        self.covers.as_deref()
    }

    /// Cover-weighted mean leaf value of every node's subtree.
    ///
    /// Entry 0 is the expected value of the tree over the training
    /// distribution. Returns `None` when covers are missing.
    pub fn node_mean_values(&self) -> Option<Vec<f64>> {
        let covers = self.covers()?;
        let mut means = vec![0.0; self.n_nodes()];
        self.fill_mean_values(0, covers, &mut means);
        Some(means)
    }

    fn fill_mean_values(&self, node: NodeId, covers: &[f64], means: &mut [f64]) -> f64 {
        let value = if self.is_leaf(node) {
            self.leaf_value(node)
        } else {
            let (left, right) = (self.left_child(node), self.right_child(node));
            let left_mean = self.fill_mean_values(left, covers, means);
            let right_mean = self.fill_mean_values(right, covers, means);
            let cover = covers[node as usize];
            if cover > 0.0 {
                (left_mean * covers[left as usize] + right_mean * covers[right as usize]) / cover
            } else {
                0.5 * (left_mean + right_mean)
            }
        };
        means[node as usize] = value;
        value
    }

    /// Depth of the deepest leaf (a single leaf has depth 0).
    pub fn max_depth(&self) -> usize {
        self.depth_from(0)
    }

    fn depth_from(&self, node: NodeId) -> usize {
        if self.is_leaf(node) {
            0
        } else {
            1 + self
                .depth_from(self.left_child(node))
                .max(self.depth_from(self.right_child(node)))
        }
    }

    // =========================================================================
    // Traversal
    // =========================================================================

    /// Traverse the tree to the leaf reached by a sample.
    #[inline]
    pub fn traverse_to_leaf<S: SampleAccessor + ?Sized>(&self, sample: &S) -> NodeId {
        let mut node = 0;
        while !self.is_leaf(node) {
            let value = sample.feature(self.split_index(node) as usize);
            node = self.child_for(node, value);
        }
        node
    }

    /// Leaf value reached by a sample.
    #[inline]
    pub fn predict_row<S: SampleAccessor + ?Sized>(&self, sample: &S) -> f64 {
        self.leaf_value(self.traverse_to_leaf(sample))
    }

    // =========================================================================
    // Validation
    // =========================================================================

    /// Validate basic structural invariants for this tree.
    ///
    /// Every node must be reachable from the root exactly once.
    pub fn validate(&self) -> Result<(), TreeValidationError> {
        let n_nodes = self.n_nodes();
        if n_nodes == 0 {
            return Err(TreeValidationError::EmptyTree);
        }

        let lengths = [
            ("split_indices", self.split_indices.len()),
            ("split_thresholds", self.split_thresholds.len()),
            ("left_children", self.left_children.len()),
            ("right_children", self.right_children.len()),
            ("default_left", self.default_left.len()),
            ("leaf_values", self.leaf_values.len()),
            ("gains", self.gains.as_ref().map_or(n_nodes, |g| g.len())),
            ("covers", self.covers.as_ref().map_or(n_nodes, |c| c.len())),
        ];
        if let Some(&(field, len)) = lengths.iter().find(|(_, len)| *len != n_nodes) {
            return Err(TreeValidationError::ArrayLenMismatch { field, len, n_nodes });
        }

        let mut visited = vec![false; n_nodes];
        let mut stack: Vec<NodeId> = vec![0];
        while let Some(node) = stack.pop() {
            if visited[node as usize] {
                return Err(TreeValidationError::DuplicateVisit { node });
            }
            visited[node as usize] = true;

            if self.is_leaf(node) {
                continue;
            }
            for (side, child) in [("left", self.left_child(node)), ("right", self.right_child(node))] {
                if child == node {
                    return Err(TreeValidationError::SelfLoop { node });
                }
                if child as usize >= n_nodes {
                    return Err(TreeValidationError::ChildOutOfBounds { node, side, child, n_nodes });
                }
                stack.push(child);
            }
        }

        match visited.iter().position(|&v| !v) {
            Some(node) => Err(TreeValidationError::UnreachableNode { node: node as NodeId }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    /// x0 < 0.5 ? (x1 < 0.5 ? 1 : 2) : 3
    fn two_level_tree() -> Tree {
        Tree::new(
            vec![0, 1, 0, 0, 0],
            vec![0.5, 0.5, 0.0, 0.0, 0.0],
            vec![1, 3, 0, 0, 0],
            vec![2, 4, 0, 0, 0],
            vec![true, false, true, true, true],
            vec![false, false, true, true, true],
            vec![0.0, 0.0, 3.0, 1.0, 2.0],
        )
        .with_covers(vec![10.0, 6.0, 4.0, 2.0, 4.0])
    }

    #[test]
    fn traversal_follows_thresholds() {
        let tree = two_level_tree();
        assert_eq!(tree.predict_row(&[0.0f32, 0.0][..]), 1.0);
        assert_eq!(tree.predict_row(&[0.0f32, 1.0][..]), 2.0);
        assert_eq!(tree.predict_row(&[1.0f32, 0.0][..]), 3.0);
    }

    #[test]
    fn missing_values_use_default_direction() {
        let tree = two_level_tree();
        // Root defaults left, node 1 defaults right
        assert_eq!(tree.predict_row(&[f32::NAN, f32::NAN][..]), 2.0);
    }

    #[test]
    fn node_means_are_cover_weighted() {
        let tree = two_level_tree();
        let means = tree.node_mean_values().unwrap();
        assert_abs_diff_eq!(means[1], (1.0 * 2.0 + 2.0 * 4.0) / 6.0, epsilon = 1e-12);
        assert_abs_diff_eq!(means[0], (means[1] * 6.0 + 3.0 * 4.0) / 10.0, epsilon = 1e-12);
        assert!(Tree::leaf(1.0).node_mean_values().is_none());
    }

    #[test]
    fn depth_and_leaves() {
        let tree = two_level_tree();
        assert_eq!(tree.max_depth(), 2);
        assert_eq!(tree.n_leaves(), 3);
        assert_eq!(Tree::leaf(0.0).max_depth(), 0);
    }

    #[test]
    fn validate_detects_structural_errors() {
        assert!(two_level_tree().validate().is_ok());

        let unreachable = Tree::new(
            vec![0, 0, 0],
            vec![0.0; 3],
            vec![0; 3],
            vec![0; 3],
            vec![true; 3],
            vec![true; 3],
            vec![1.0, 2.0, 3.0],
        );
        assert_eq!(unreachable.validate(), Err(TreeValidationError::UnreachableNode { node: 1 }));

        let self_loop = Tree::new(
            vec![0, 0],
            vec![0.5, 0.0],
            vec![0, 0],
            vec![1, 0],
            vec![true, true],
            vec![false, true],
            vec![0.0, 1.0],
        );
        assert_eq!(self_loop.validate(), Err(TreeValidationError::SelfLoop { node: 0 }));

        let short_covers = Tree::leaf(1.0).with_covers(vec![]);
        assert!(matches!(
            short_covers.validate(),
            Err(TreeValidationError::ArrayLenMismatch { field: "covers", .. })
        ));
    }
}
