//! Schema types for model serialization.
//!
//! These types provide a stable serialization format independent of runtime
//! types, so the two can evolve separately and decoded documents can be
//! validated before they become models.

use serde::{Deserialize, Serialize};

/// Value of [`ModelEnvelope::format`].
pub const MODEL_FORMAT: &str = "iuu-risk-gbdt";

/// Current model schema version.
pub const MODEL_SCHEMA_VERSION: u32 = 1;

/// Top-level JSON document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelEnvelope {
    pub format: String,
    pub schema_version: u32,
    pub model: GBDTModelSchema,
}

/// Model metadata schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetaSchema {
    pub num_features: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feature_names: Option<Vec<String>>,
    /// Objective name (for reproducibility, not used for inference).
    pub objective_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub train_metric: Option<f64>,
}

/// Tree schema (SoA layout).
///
/// A node is a leaf when its left child is 0; the root is never a child.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeSchema {
    pub num_nodes: u32,
    pub split_indices: Vec<u32>,
    pub thresholds: Vec<f64>,
    pub children_left: Vec<u32>,
    pub children_right: Vec<u32>,
    pub default_left: Vec<bool>,
    pub leaf_values: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gains: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub covers: Option<Vec<f64>>,
}

/// Forest schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestSchema {
    pub base_score: f64,
    pub trees: Vec<TreeSchema>,
}

/// Verbosity schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerbositySchema {
    Silent,
    Warning,
    Info,
    Debug,
}

/// Training configuration schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GBDTConfigSchema {
    pub n_trees: u32,
    pub learning_rate: f64,
    pub max_depth: u32,
    pub min_child_weight: f64,
    pub lambda: f64,
    pub min_gain: f64,
    pub colsample_bytree: f64,
    pub seed: u64,
    pub verbosity: VerbositySchema,
    pub log_every: usize,
}

/// Per-round training metric.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalHistorySchema {
    pub metric: String,
    pub values: Vec<f64>,
}

/// Complete GBDT model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GBDTModelSchema {
    pub meta: ModelMetaSchema,
    pub config: GBDTConfigSchema,
    pub forest: ForestSchema,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history: Option<EvalHistorySchema>,
}
