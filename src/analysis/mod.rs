//! Aggregation of SHAP interaction values into feature-group tables.
//!
//! - [`importance_table`]: mean absolute interaction mass per group pair.
//! - [`effect_table`]: mean contribution (shifted by the base prediction) of a
//!   level, or of two co-occurring levels, on the trips where they are present.
//!
//! Column ranges come from the encoder's [`FeatureLayout`](crate::features::FeatureLayout),
//! so tables stay aligned with whatever levels the data contains.

mod effect;
mod importance;
mod summary;

pub use effect::{effect_labels, effect_table, EffectLabel, EffectRow};
pub use importance::{group_pair_sums, group_pairs, importance_table, ImportanceRow};
pub use summary::Summary;
