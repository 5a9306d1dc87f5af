//! SHAP (SHapley Additive exPlanations) value computation.

mod path;
mod tree_explainer;
mod values;

pub use tree_explainer::TreeExplainer;
pub use values::{ShapInteractionValues, ShapValues};
