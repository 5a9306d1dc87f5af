//! GBDT Trainer for gradient boosting.
//!
//! Orchestrates objective computation, tree growing, and prediction updates.
//! Use [`GBDTTrainer::train`] to train a forest from a dense feature view.

use ndarray::ArrayView2;

use crate::repr::gbdt::Forest;
use crate::training::eval::{EvalHistory, MetricValue};
use crate::training::logger::TrainingLogger;
use crate::training::metrics::MetricFn;
use crate::training::objectives::{GradsTuple, ObjectiveFn};
use crate::training::Verbosity;

use super::grower::{GrowerParams, TreeGrower};
use super::sampling::ColSampler;
use super::split::GainParams;

// =============================================================================
// TrainError
// =============================================================================

/// Errors raised before or during training.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TrainError {
    #[error("cannot train on an empty dataset")]
    EmptyDataset,
    #[error("dataset has no feature columns")]
    NoFeatures,
    #[error("got {n_targets} targets for {n_rows} rows")]
    TargetLengthMismatch { n_rows: usize, n_targets: usize },
    #[error("target at row {row} is not finite ({value})")]
    NonFiniteTarget { row: usize, value: f64 },
}

// =============================================================================
// GBDTParams
// =============================================================================

/// Parameters for GBDT training.
#[derive(Clone, Debug, PartialEq)]
pub struct GBDTParams {
    // --- Boosting parameters ---
    /// Number of boosting rounds (trees to train).
    pub n_trees: u32,
    /// Learning rate (shrinkage).
    pub learning_rate: f64,

    // --- Tree structure ---
    pub max_depth: u32,

    // --- Regularization ---
    pub min_child_weight: f64,
    pub lambda: f64,
    pub min_gain: f64,

    // --- Sampling ---
    /// Fraction of columns sampled per tree.
    pub colsample_bytree: f64,

    // --- Reproducibility ---
    pub seed: u64,

    // --- Logging ---
    pub verbosity: Verbosity,
    /// Metric logging interval (rounds) at `Info` verbosity.
    pub log_every: usize,
}

impl Default for GBDTParams {
    fn default() -> Self {
        Self {
            n_trees: 100,
            learning_rate: 0.3,
            max_depth: 6,
            min_child_weight: 1.0,
            lambda: 1.0,
            min_gain: 0.0,
            colsample_bytree: 1.0,
            seed: 42,
            verbosity: Verbosity::default(),
            log_every: 10,
        }
    }
}

impl GBDTParams {
    /// Convert to GrowerParams for tree grower.
    fn to_grower_params(&self) -> GrowerParams {
        GrowerParams {
            gain: GainParams {
                lambda: self.lambda,
                min_gain: self.min_gain,
                min_child_weight: self.min_child_weight,
            },
            learning_rate: self.learning_rate,
            max_depth: self.max_depth,
        }
    }
}

// =============================================================================
// GBDTTrainer
// =============================================================================

/// GBDT Trainer.
pub struct GBDTTrainer<O: ObjectiveFn, M: MetricFn> {
    objective: O,
    metric: M,
    params: GBDTParams,
}

impl<O: ObjectiveFn, M: MetricFn> GBDTTrainer<O, M> {
    pub fn new(objective: O, metric: M, params: GBDTParams) -> Self {
        Self { objective, metric, params }
    }

    pub fn params(&self) -> &GBDTParams {
        &self.params
    }

    pub fn objective(&self) -> &O {
        &self.objective
    }

    pub fn metric(&self) -> &M {
        &self.metric
    }

    /// Train a forest for a fixed number of rounds.
    ///
    /// The metric is evaluated on the training rows after every round and
    /// returned as the `train-<metric>` history.
    pub fn train(
        &self,
        features: ArrayView2<'_, f32>,
        targets: &[f64],
    ) -> Result<(Forest, EvalHistory), TrainError> {
        let (n_rows, n_features) = features.dim();
        if n_rows == 0 {
            return Err(TrainError::EmptyDataset);
        }
        if n_features == 0 {
            return Err(TrainError::NoFeatures);
        }
        if targets.len() != n_rows {
            return Err(TrainError::TargetLengthMismatch { n_rows, n_targets: targets.len() });
        }
        if let Some((row, &value)) = targets.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(TrainError::NonFiniteTarget { row, value });
        }

        let mut grower = TreeGrower::new(self.params.to_grower_params(), n_rows);
        let mut col_sampler = ColSampler::new(n_features, self.params.colsample_bytree, self.params.seed);
        let mut grad_hess = vec![GradsTuple::default(); n_rows];

        let base_score = self.objective.compute_base_score(targets);
        let mut predictions = vec![base_score; n_rows];
        let mut forest = Forest::new(base_score);
        let mut history = EvalHistory::new(format!("train-{}", self.metric.name()));

        let mut logger = TrainingLogger::new(self.params.verbosity, self.params.log_every);
        logger.start_training(self.params.n_trees as usize, n_rows, n_features);

        for round in 0..self.params.n_trees as usize {
            self.objective.compute_gradients_into(&predictions, targets, &mut grad_hess);

            let columns = col_sampler.sample_for_tree();
            let tree = grower.grow(features, &grad_hess, columns).freeze();
            grower.update_predictions_from_last_tree(&mut predictions);
            forest.push_tree(tree);

            let value = self.metric.compute(&predictions, targets);
            history.push(value);
            logger.log_round(
                round,
                &MetricValue::new(history.metric.clone(), value, self.metric.higher_is_better()),
            );
        }

        let final_metric = history
            .last()
            .map(|v| MetricValue::new(history.metric.clone(), v, self.metric.higher_is_better()));
        logger.finish_training(forest.n_trees(), final_metric.as_ref());

        Ok((forest, history))
    }
}

// =============================================================================
// Tests
// =============================================================================
