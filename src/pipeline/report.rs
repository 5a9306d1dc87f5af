use std::path::PathBuf;

use serde::Serialize;

use super::stages::{Explained, Fitted};
use super::Analysis;

/// Row counts, fit quality and written files of one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineReport {
    pub analysis: Analysis,
    /// Rows read from the main input table.
    pub n_records: usize,
    /// Complete trips (all predictors present).
    pub n_trips: usize,
    pub n_observed: usize,
    pub n_unobserved: usize,
    pub n_predicted: usize,
    /// Unobserved trips dropped for levels unseen in training.
    pub n_unseen: usize,
    pub n_features: usize,
    /// In-sample RMSE after the last round.
    pub train_rmse: Option<f64>,
    /// SHAP base value (expected model output).
    pub base_value: f64,
    pub outputs: Vec<PathBuf>,
}

impl PipelineReport {
    pub(crate) fn new(
        analysis: Analysis,
        n_records: usize,
        n_trips: usize,
        fitted: &Fitted,
        explained: &Explained,
        outputs: Vec<PathBuf>,
    ) -> Self {
        Self {
            analysis,
            n_records,
            n_trips,
            n_observed: fitted.observed.len(),
            n_unobserved: fitted.n_unobserved,
            n_predicted: fitted.predicted.len(),
            n_unseen: fitted.n_unseen(),
            n_features: fitted.observed_matrix.n_features(),
            train_rmse: fitted.model.meta().train_metric,
            base_value: explained.shap.base_value(),
            outputs,
        }
    }

    /// Emit the report as one structured log event.
    pub fn log(&self) {
        tracing::info!(
            analysis = %self.analysis,
            records = self.n_records,
            trips = self.n_trips,
            observed = self.n_observed,
            predicted = self.n_predicted,
            unseen = self.n_unseen,
            features = self.n_features,
            train_rmse = self.train_rmse,
            outputs = self.outputs.len(),
            "run finished"
        );
    }
}
