//! Mutable tree used while growing.
//!
//! Nodes are allocated in the order the grower creates them; children are
//! always allocated after their parent. Call [`MutableTree::freeze`] to
//! obtain the immutable [`Tree`].

use super::{NodeId, Tree};

/// Node-by-node tree builder.
#[derive(Debug, Clone, Default)]
pub struct MutableTree {
    split_indices: Vec<u32>,
    split_thresholds: Vec<f32>,
    left_children: Vec<u32>,
    right_children: Vec<u32>,
    default_left: Vec<bool>,
    is_leaf: Vec<bool>,
    leaf_values: Vec<f64>,
    gains: Vec<f64>,
    covers: Vec<f64>,
}

impl MutableTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(n_nodes: usize) -> Self {
        Self {
            split_indices: Vec::with_capacity(n_nodes),
            split_thresholds: Vec::with_capacity(n_nodes),
            left_children: Vec::with_capacity(n_nodes),
            right_children: Vec::with_capacity(n_nodes),
            default_left: Vec::with_capacity(n_nodes),
            is_leaf: Vec::with_capacity(n_nodes),
            leaf_values: Vec::with_capacity(n_nodes),
            gains: Vec::with_capacity(n_nodes),
            covers: Vec::with_capacity(n_nodes),
        }
    }

    /// Number of allocated nodes.
    pub fn n_nodes(&self) -> usize {
        self.is_leaf.len()
    }

    /// Allocate the root node. Must be called first.
    pub fn init_root(&mut self) -> NodeId {
        debug_assert_eq!(self.n_nodes(), 0, "root already allocated");
        self.allocate()
    }

    fn allocate(&mut self) -> NodeId {
        let id = self.n_nodes() as NodeId;
        self.split_indices.push(0);
        self.split_thresholds.push(0.0);
        self.left_children.push(0);
        self.right_children.push(0);
        self.default_left.push(true);
        self.is_leaf.push(true);
        self.leaf_values.push(0.0);
        self.gains.push(0.0);
        self.covers.push(0.0);
        id
    }

    /// Turn `node` into a numeric split and allocate its two children.
    ///
    /// Samples with `value < threshold` go left; missing values follow
    /// `default_left`.
    pub fn apply_numeric_split(
        &mut self,
        node: NodeId,
        feature: u32,
        threshold: f32,
        default_left: bool,
    ) -> (NodeId, NodeId) {
        let left = self.allocate();
        let right = self.allocate();
        let i = node as usize;
        self.split_indices[i] = feature;
        self.split_thresholds[i] = threshold;
        self.left_children[i] = left;
        self.right_children[i] = right;
        self.default_left[i] = default_left;
        self.is_leaf[i] = false;
        (left, right)
    }

    /// Mark `node` as a leaf with the given value.
    pub fn make_leaf(&mut self, node: NodeId, value: f64) {
        let i = node as usize;
        self.is_leaf[i] = true;
        self.leaf_values[i] = value;
    }

    pub fn set_gain(&mut self, node: NodeId, gain: f64) {
        self.gains[node as usize] = gain;
    }

    pub fn set_cover(&mut self, node: NodeId, cover: f64) {
        self.covers[node as usize] = cover;
    }

    /// Leaf value of `node` (0 for splits).
    pub fn leaf_value(&self, node: NodeId) -> f64 {
        self.leaf_values[node as usize]
    }

    /// Freeze into an immutable tree carrying gains and covers.
    pub fn freeze(self) -> Tree {
        Tree::new(
            self.split_indices,
            self.split_thresholds,
            self.left_children,
            self.right_children,
            self.default_left,
            self.is_leaf,
            self.leaf_values,
        )
        .with_gains(self.gains)
        .with_covers(self.covers)
    }
}
