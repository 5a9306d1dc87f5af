//! Batch analyses.
//!
//! Both analyses run the same stages:
//!
//! 1. Load the input tables and keep complete records
//! 2. Split trips into observed (port assessments) and to-predict
//! 3. Fit the encoder and train the forest on the observed trips
//! 4. Predict the remaining trips (unseen levels are dropped)
//! 5. Classify and spatially bin the merged scores
//! 6. Compute SHAP interactions on the observed trips and aggregate them
//!
//! [`FishingPipeline`] and [`TransshipPipeline`] differ in how trips and
//! their categorical rows are built, and in which positions are binned.

pub mod config;
mod fishing;
mod report;
mod stages;
mod transship;

use std::path::PathBuf;

pub use config::{Analysis, PipelineConfig};
pub use fishing::{FishingPipeline, ObservedTripRow, TripFitRow, TripScoreRow};
pub use report::PipelineReport;
pub use stages::{file_names, FitRow, ScoreType};
pub use transship::{carrier_trips, CarrierTrip, PointSource, ScoredPointRow, TransshipPipeline};

use crate::classify::InvalidThresholds;
use crate::data::IoError;
use crate::explainability::ExplainError;
use crate::features::FeatureError;
use crate::model::ConfigError;
use crate::persist::PersistError;
use crate::spatial::InvalidCellSize;
use crate::training::TrainError;

/// Errors that abort a run.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("failed to read config {path}: {source}")]
    ConfigFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    ConfigParse(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Thresholds(#[from] InvalidThresholds),

    #[error(transparent)]
    CellSize(#[from] InvalidCellSize),

    #[error("{analysis} analysis needs a loitering table")]
    MissingLoitering { analysis: Analysis },

    /// No complete trip carries a port assessment, so there is nothing to train on.
    #[error("no observed trips in {path}")]
    NoObservedTrips { path: PathBuf },

    #[error(transparent)]
    Io(#[from] IoError),

    #[error(transparent)]
    Features(#[from] FeatureError),

    #[error(transparent)]
    Train(#[from] TrainError),

    #[error(transparent)]
    Explain(#[from] ExplainError),

    #[error(transparent)]
    Persist(#[from] PersistError),
}

/// Run the analysis selected by `config`.
pub fn run(config: &PipelineConfig) -> Result<PipelineReport, PipelineError> {
    match config.analysis {
        Analysis::Fishing => FishingPipeline::run(config),
        Analysis::Transship => TransshipPipeline::run(config),
    }
}
