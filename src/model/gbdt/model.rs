//! GBDT model implementation.
//!
//! High-level wrapper around [`Forest`] with training, prediction and
//! explainability. Access components via [`forest()`](GBDTModel::forest),
//! [`meta()`](GBDTModel::meta) and [`config()`](GBDTModel::config).

use std::path::Path;

use crate::data::FeatureMatrix;
use crate::explainability::{ExplainError, ShapInteractionValues, ShapValues, TreeExplainer};
use crate::model::meta::ModelMeta;
use crate::persist::PersistError;
use crate::repr::gbdt::Forest;
use crate::training::gbdt::{GBDTTrainer, TrainError};
use crate::training::{EvalHistory, ObjectiveFn, Rmse, SquaredLoss};

use super::GBDTConfig;

/// Boosted regression forest with its metadata and training configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct GBDTModel {
    forest: Forest,
    meta: ModelMeta,
    config: GBDTConfig,
    /// Per-round training metric; empty for models loaded from disk
    /// without history.
    history: EvalHistory,
}

impl GBDTModel {
    /// Create a model from all its parts.
    pub fn from_parts(forest: Forest, meta: ModelMeta, config: GBDTConfig, history: EvalHistory) -> Self {
        Self { forest, meta, config, history }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn forest(&self) -> &Forest {
        &self.forest
    }

    pub fn meta(&self) -> &ModelMeta {
        &self.meta
    }

    pub fn config(&self) -> &GBDTConfig {
        &self.config
    }

    /// Training metric per boosting round (`train-rmse`).
    pub fn eval_history(&self) -> &EvalHistory {
        &self.history
    }

    /// Forest base score (mean training target).
    pub fn base_score(&self) -> f64 {
        self.forest.base_score()
    }

    // =========================================================================
    // Training
    // =========================================================================

    /// Train a model on an encoded feature matrix.
    ///
    /// The forest minimises squared error; RMSE on the training rows is
    /// recorded after every round.
    pub fn train(features: &FeatureMatrix, targets: &[f64], config: GBDTConfig) -> Result<Self, TrainError> {
        let trainer = GBDTTrainer::new(SquaredLoss, Rmse, config.to_trainer_params());
        let (forest, history) = trainer.train(features.view(), targets)?;

        let meta = ModelMeta {
            feature_names: Some(features.column_names().to_vec()),
            n_features: features.n_features(),
            objective: trainer.objective().name().to_string(),
            train_metric: history.last(),
        };
        Ok(Self { forest, meta, config, history })
    }

    // =========================================================================
    // Prediction
    // =========================================================================

    /// Predict every row: base score plus the sum of reached leaves.
    ///
    /// Columns are matched by position; the matrix must come from the same
    /// encoder the model was trained on.
    pub fn predict(&self, features: &FeatureMatrix) -> Vec<f64> {
        debug_assert_eq!(features.n_features(), self.meta.n_features);
        self.forest.predict(features.view())
    }

    // =========================================================================
    // Explainability
    // =========================================================================

    /// Exact TreeSHAP explainer over this model's forest.
    pub fn explainer(&self) -> Result<TreeExplainer<'_>, ExplainError> {
        TreeExplainer::new(&self.forest)
    }

    /// Per-feature SHAP values for every row.
    pub fn shap_values(&self, features: &FeatureMatrix) -> Result<ShapValues, ExplainError> {
        Ok(self.explainer()?.shap_values(features.view()))
    }

    /// Pairwise SHAP interaction values for every row.
    pub fn shap_interaction_values(&self, features: &FeatureMatrix) -> Result<ShapInteractionValues, ExplainError> {
        Ok(self.explainer()?.shap_interaction_values(features.view()))
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Write the model as versioned JSON.
    pub fn save_json(&self, path: &Path) -> Result<(), PersistError> {
        crate::persist::save_json(self, path)
    }

    /// Read a model written by [`save_json`](Self::save_json).
    pub fn load_json(path: &Path) -> Result<Self, PersistError> {
        crate::persist::load_json(path)
    }
}
