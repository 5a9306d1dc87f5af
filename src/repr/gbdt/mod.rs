//! Tree ensemble representation.
//!
//! - [`Tree`]: immutable structure-of-arrays regression tree
//! - [`MutableTree`]: node-by-node builder used while growing
//! - [`Forest`]: additive ensemble with a base score

mod forest;
mod mutable_tree;
mod tree;

pub use forest::{Forest, ForestValidationError};
pub use mutable_tree::MutableTree;
pub use tree::{Tree, TreeValidationError};

/// Node index local to one tree (0 = root).
pub type NodeId = u32;
