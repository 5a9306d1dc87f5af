//! Categorical feature construction.
//!
//! Trip predictors are categorical. Each predictor is a *feature group* that
//! expands into one indicator column per level:
//!
//! - [`GroupKind::OneHot`]: exactly one level per row (flag state, time at sea)
//! - [`GroupKind::MultiHot`]: any number of levels per row (flags of the
//!   vessels a carrier met during a trip)
//!
//! The [`OneHotEncoder`] learns levels from the training rows, sorts them, and
//! lays the groups out contiguously in declaration order. The resulting
//! [`FeatureLayout`] is the single source of column ranges for everything that
//! indexes into the feature matrix or the SHAP tensor.

mod encoder;
mod layout;

pub use encoder::{CategoricalRow, EncodedRows, FeatureError, OneHotEncoder};
pub use layout::{FeatureGroup, FeatureGroupSpec, FeatureLayout, GroupKind};
