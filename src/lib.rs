//! iuu-risk: IUU fishing risk scoring for fishing and transshipment trips.
//!
//! Port-call IUU assessments label a subset of trips. A gradient-boosted
//! regression forest, trained on one-hot trip features, imputes the score for
//! the remaining trips, and exact TreeSHAP interaction values attribute the
//! score to feature groups (flag, gear, time at sea, encounters, loitering).
//!
//! # Key Types
//!
//! - [`OneHotEncoder`] / [`FeatureLayout`] - Categorical feature construction
//! - [`AssessmentCounts`] - Port assessment counts and the derived risk label
//! - [`GBDTModel`] / [`GBDTConfig`] - Boosted regression trees
//! - [`TreeExplainer`] / [`ShapInteractionValues`] - SHAP attribution
//! - [`RiskThresholds`] / [`RiskClass`] - Discrete risk classes
//! - [`pipeline`] - The fishing and transshipment batch analyses
//!
//! # Training
//!
//! Use `GBDTConfig::builder()` to configure, then `GBDTModel::train()`.
//! See the [`model`] module for details.

// Re-export approx traits for users who want to compare predictions
pub use approx;

pub mod analysis;
pub mod classify;
pub mod data;
pub mod explainability;
pub mod features;
pub mod label;
pub mod model;
pub mod partition;
pub mod persist;
pub mod pipeline;
pub mod repr;
pub mod spatial;
pub mod testing;
pub mod training;
pub mod utils;

// =============================================================================
// Convenience Re-exports
// =============================================================================

// High-level model types
pub use model::{GBDTConfig, GBDTModel, ModelMeta};

// Training types (objectives, metrics)
pub use training::{MetricFn, ObjectiveFn, Rmse, SquaredLoss, Verbosity};

// Data and feature construction
pub use data::FeatureMatrix;
pub use features::{CategoricalRow, FeatureGroup, FeatureGroupSpec, FeatureLayout, GroupKind, OneHotEncoder};

// Labels, classes and partitioning
pub use classify::{RiskClass, RiskThresholds};
pub use label::AssessmentCounts;
pub use partition::{partition, Partition};

// Explainability
pub use explainability::{ShapInteractionValues, ShapValues, TreeExplainer};

// Batch analyses
pub use pipeline::{Analysis, PipelineConfig, PipelineReport};
