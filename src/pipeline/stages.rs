//! Stages and output rows shared by both analyses.

use std::path::{Path, PathBuf};

use serde::Serialize;

use super::{PipelineConfig, PipelineError};
use crate::analysis::{effect_table, importance_table, EffectRow, ImportanceRow};
use crate::classify::RiskClass;
use crate::data::{io, FeatureMatrix};
use crate::explainability::ShapInteractionValues;
use crate::features::{CategoricalRow, FeatureGroupSpec, OneHotEncoder};
use crate::label::AssessmentCounts;
use crate::model::GBDTModel;
use crate::partition::partition;
use crate::utils::mean;

/// Output file suffixes; the full name is `{analysis}_{suffix}`.
pub mod file_names {
    /// Encoded observed feature matrix.
    pub const INPUT: &str = "iuu_input.csv";
    pub const MODEL: &str = "iuu.model.json";
    /// Observed trips with their in-sample prediction.
    pub const FIT: &str = "iuu_fit.csv";
    /// Observed trips with label and class.
    pub const OBSERVED: &str = "iuu_obs.csv";
    /// Merged observed and predicted scores.
    pub const SCORES: &str = "iuu.csv";
    pub const SHAP: &str = "iuu_shap.bin";
    pub const IMPORTANCE: &str = "iuu_importance.csv";
    pub const EFFECT: &str = "iuu_effect.csv";

    /// Class counts per cell.
    pub fn binned_classes(cell_size: f64) -> String {
        format!("binned{cell_size}_iuu.csv")
    }

    /// Observed and predicted score sums per cell.
    pub fn binned_scores(cell_size: f64) -> String {
        format!("binned{cell_size}_iuu_pred.csv")
    }
}

/// Whether a score is a port-assessment label or a model prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreType {
    Obs,
    Pred,
}

/// An observed carrier trip with its label and in-sample prediction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FitRow {
    pub trip_id: String,
    pub risk_score: f64,
    pub risk_score_pred: f64,
    /// Class of the prediction.
    pub risk_class: RiskClass,
}

// =============================================================================
// Training and prediction
// =============================================================================

/// Trained model plus the scores of every trip it could score.
pub(crate) struct Fitted {
    pub encoder: OneHotEncoder,
    pub model: GBDTModel,
    /// Trip indices of the observed matrix rows.
    pub observed: Vec<usize>,
    pub observed_matrix: FeatureMatrix,
    pub targets: Vec<f64>,
    /// In-sample predictions, aligned with `observed`.
    pub fitted: Vec<f64>,
    /// Trip indices of the predicted rows.
    pub predicted: Vec<usize>,
    /// Aligned with `predicted`.
    pub predictions: Vec<f64>,
    pub n_unobserved: usize,
}

impl Fitted {
    /// Rows without a port assessment that carried unseen levels.
    pub fn n_unseen(&self) -> usize {
        self.n_unobserved - self.predicted.len()
    }

    /// Score and origin of every scored trip, observed first.
    pub fn scores(&self) -> impl Iterator<Item = (usize, f64, ScoreType)> + '_ {
        let observed = self.observed.iter().zip(&self.targets).map(|(&t, &s)| (t, s, ScoreType::Obs));
        let predicted = self.predicted.iter().zip(&self.predictions).map(|(&t, &s)| (t, s, ScoreType::Pred));
        observed.chain(predicted)
    }
}

/// Split trips, fit the encoder and the model on the observed ones and
/// predict the rest.
pub(crate) fn fit_and_predict(
    config: &PipelineConfig,
    specs: Vec<FeatureGroupSpec>,
    rows: &[CategoricalRow],
    counts: &[AssessmentCounts],
) -> Result<Fitted, PipelineError> {
    debug_assert_eq!(rows.len(), counts.len());
    let split = partition(counts, AssessmentCounts::is_observed);
    if split.observed.is_empty() {
        return Err(PipelineError::NoObservedTrips { path: config.input_path() });
    }
    tracing::info!(
        observed = split.observed.len(),
        unobserved = split.unobserved.len(),
        "split trips by port assessment"
    );

    let select = |indices: &[usize]| -> Vec<CategoricalRow> { indices.iter().map(|&i| rows[i].clone()).collect() };
    let observed_rows = select(&split.observed);
    let targets: Vec<f64> = split.observed.iter().filter_map(|&i| counts[i].risk_score()).collect();

    let encoder = OneHotEncoder::fit(specs, &observed_rows)?;
    let observed_matrix = encoder.transform(&observed_rows)?.matrix;
    tracing::info!(rows = observed_matrix.n_rows(), features = observed_matrix.n_features(), "encoded observed trips");

    let model = GBDTModel::train(&observed_matrix, &targets, config.model.clone())?;
    let fitted = model.predict(&observed_matrix);

    let unobserved = encoder.transform(&select(&split.unobserved))?;
    if unobserved.dropped > 0 {
        tracing::warn!(dropped = unobserved.dropped, "trips with levels unseen in training are not predicted");
    }
    let predictions = model.predict(&unobserved.matrix);
    let predicted = unobserved.kept.iter().map(|&k| split.unobserved[k]).collect();

    Ok(Fitted {
        encoder,
        model,
        observed: split.observed,
        observed_matrix,
        targets,
        fitted,
        predicted,
        predictions,
        n_unobserved: split.unobserved.len(),
    })
}

// =============================================================================
// Attribution
// =============================================================================

pub(crate) struct Explained {
    pub shap: ShapInteractionValues,
    pub importance: Vec<ImportanceRow>,
    pub effect: Vec<EffectRow>,
}

/// SHAP interactions of the observed trips and their aggregate tables.
pub(crate) fn explain(fitted: &Fitted) -> Result<Explained, PipelineError> {
    let matrix = &fitted.observed_matrix;
    tracing::info!(
        rows = matrix.n_rows(),
        features = matrix.n_features(),
        mib = ShapInteractionValues::tensor_bytes(matrix.n_rows(), matrix.n_features()) as f64 / (1024.0 * 1024.0),
        "computing SHAP interaction values"
    );
    let shap = fitted.model.shap_interaction_values(matrix)?;

    let layout = fitted.encoder.layout();
    let importance = importance_table(&shap, layout);
    let base = mean(&fitted.fitted);
    let effect = effect_table(&shap, matrix, layout, base);
    tracing::info!(importance = importance.len(), effect = effect.len(), "aggregated interactions");

    Ok(Explained { shap, importance, effect })
}

// =============================================================================
// Outputs
// =============================================================================

/// Writes outputs under the configured directory and records their paths.
pub(crate) struct Outputs<'a> {
    config: &'a PipelineConfig,
    written: Vec<PathBuf>,
}

impl<'a> Outputs<'a> {
    pub fn new(config: &'a PipelineConfig) -> Self {
        Self { config, written: Vec::new() }
    }

    fn path(&mut self, suffix: &str) -> PathBuf {
        let path = self.config.output_path(suffix);
        self.written.push(path.clone());
        path
    }

    pub fn records<T: Serialize>(&mut self, suffix: &str, records: &[T]) -> Result<(), PipelineError> {
        let path = self.path(suffix);
        io::write_records(&path, records)?;
        Ok(())
    }

    pub fn matrix(&mut self, suffix: &str, matrix: &FeatureMatrix) -> Result<(), PipelineError> {
        let path = self.path(suffix);
        io::write_matrix(&path, matrix)?;
        Ok(())
    }

    /// Encoded input, model, SHAP tensor and the aggregate tables.
    pub fn model_artefacts(&mut self, fitted: &Fitted, explained: &Explained) -> Result<(), PipelineError> {
        self.matrix(file_names::INPUT, &fitted.observed_matrix)?;
        let path = self.path(file_names::MODEL);
        fitted.model.save_json(&path)?;
        let path = self.path(file_names::SHAP);
        explained.shap.save(&path)?;
        self.records(file_names::IMPORTANCE, &explained.importance)?;
        self.records(file_names::EFFECT, &explained.effect)?;
        Ok(())
    }

    pub fn into_paths(self) -> Vec<PathBuf> {
        self.written
    }
}

/// Read an input table.
pub(crate) fn read_table<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Vec<T>, PipelineError> {
    let records = io::read_records(path)?;
    tracing::info!(path = %path.display(), rows = records.len(), "loaded table");
    Ok(records)
}
