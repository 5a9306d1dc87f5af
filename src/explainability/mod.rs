//! Explainability module.
//!
//! Exact path-dependent TreeSHAP over the boosted forest:
//!
//! - [`TreeExplainer::shap_values`]: per-feature attributions
//! - [`TreeExplainer::shap_interaction_values`]: pairwise attributions
//!
//! Both satisfy local accuracy: for every row, the attributions plus the
//! base value equal the model prediction.

mod shap;

pub use shap::{ShapInteractionValues, ShapValues, TreeExplainer};

/// Errors from building an explainer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExplainError {
    /// A tree lacks the per-node cover statistics TreeSHAP needs.
    #[error("tree {tree} has no cover statistics; TreeSHAP requires node covers")]
    MissingNodeStats { tree: usize },
}
