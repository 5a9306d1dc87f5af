//! Run configuration.
//!
//! Each analysis has built-in defaults; an optional TOML file overrides any
//! subset of them:
//!
//! ```toml
//! data_dir = "data"
//! out_dir = "out"
//! thresholds = [0.0, 2.0]
//!
//! [model]
//! n_trees = 200
//! learning_rate = 0.02
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::PipelineError;
use crate::classify::RiskThresholds;
use crate::model::GBDTConfig;
use crate::spatial::SpatialBinner;
use crate::training::Verbosity;

// =============================================================================
// Analysis
// =============================================================================

/// Which batch analysis to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Analysis {
    /// One row per fishing trip.
    Fishing,
    /// One row per carrier trip, built from its encounters and loitering events.
    Transship,
}

impl Analysis {
    /// Prefix of every output file.
    pub fn name(self) -> &'static str {
        match self {
            Self::Fishing => "fishing",
            Self::Transship => "transship",
        }
    }

    /// Hyperparameters used for this analysis unless overridden.
    pub fn default_model_config(self) -> GBDTConfig {
        let (learning_rate, n_trees, log_every) = match self {
            Self::Fishing => (0.05, 100, 10),
            Self::Transship => (0.01, 300, 50),
        };
        GBDTConfig {
            n_trees,
            learning_rate,
            max_depth: 10,
            min_child_weight: 1.0,
            lambda: 1.0,
            min_gain: 0.0,
            colsample_bytree: 0.6,
            seed: 42,
            verbosity: Verbosity::Info,
            log_every,
        }
    }

    fn default_input(self) -> &'static str {
        match self {
            Self::Fishing => "fishing_trips.csv",
            Self::Transship => "transship_trips.csv",
        }
    }

    fn default_loitering(self) -> Option<&'static str> {
        match self {
            Self::Fishing => None,
            Self::Transship => Some("transship_trips_loitering.csv"),
        }
    }
}

impl std::fmt::Display for Analysis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// PipelineConfig
// =============================================================================

/// Fully resolved configuration of one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineConfig {
    pub analysis: Analysis,
    /// Directory holding the input tables.
    pub data_dir: PathBuf,
    /// Directory receiving all outputs.
    pub out_dir: PathBuf,
    /// Main input table, relative to `data_dir`.
    pub input: PathBuf,
    /// Loitering events, relative to `data_dir` (transship only).
    pub loitering: Option<PathBuf>,
    /// Class boundaries `[low, high]`.
    pub thresholds: [f64; 2],
    /// Spatial cell size in degrees.
    pub cell_size: f64,
    pub model: GBDTConfig,
}

impl PipelineConfig {
    /// Defaults of `analysis`, reading from and writing to `data/`.
    pub fn new(analysis: Analysis) -> Self {
        Self {
            analysis,
            data_dir: PathBuf::from("data"),
            out_dir: PathBuf::from("data"),
            input: PathBuf::from(analysis.default_input()),
            loitering: analysis.default_loitering().map(PathBuf::from),
            thresholds: [0.0, 2.0],
            cell_size: 1.0,
            model: analysis.default_model_config(),
        }
    }

    /// Defaults of `analysis` overridden by a TOML document.
    pub fn from_toml_str(analysis: Analysis, source: &str) -> Result<Self, PipelineError> {
        let file: ConfigFile = toml::from_str(source).map_err(|e| PipelineError::ConfigParse(e.to_string()))?;
        let mut config = Self::new(analysis);
        file.apply(&mut config)?;
        Ok(config)
    }

    /// Defaults of `analysis`, overridden by the TOML file at `path` if given.
    pub fn load(analysis: Analysis, path: Option<&Path>) -> Result<Self, PipelineError> {
        let Some(path) = path else {
            return Ok(Self::new(analysis));
        };
        let source = std::fs::read_to_string(path)
            .map_err(|source| PipelineError::ConfigFile { path: path.to_path_buf(), source })?;
        let config = Self::from_toml_str(analysis, &source)?;
        tracing::debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Validated class thresholds.
    pub fn risk_thresholds(&self) -> Result<RiskThresholds, PipelineError> {
        Ok(RiskThresholds::new(self.thresholds[0], self.thresholds[1])?)
    }

    /// Binner for the configured cell size.
    pub fn spatial_binner(&self) -> Result<SpatialBinner, PipelineError> {
        Ok(SpatialBinner::new(self.cell_size)?)
    }

    pub fn input_path(&self) -> PathBuf {
        self.data_dir.join(&self.input)
    }

    pub fn loitering_path(&self) -> Option<PathBuf> {
        self.loitering.as_ref().map(|p| self.data_dir.join(p))
    }

    /// Output path `{out_dir}/{analysis}_{suffix}`.
    pub fn output_path(&self, suffix: &str) -> PathBuf {
        self.out_dir.join(format!("{}_{suffix}", self.analysis.name()))
    }
}

// =============================================================================
// File overrides
// =============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    data_dir: Option<PathBuf>,
    out_dir: Option<PathBuf>,
    input: Option<PathBuf>,
    loitering: Option<PathBuf>,
    thresholds: Option<[f64; 2]>,
    cell_size: Option<f64>,
    model: ModelOverrides,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ModelOverrides {
    n_trees: Option<u32>,
    learning_rate: Option<f64>,
    max_depth: Option<u32>,
    min_child_weight: Option<f64>,
    lambda: Option<f64>,
    min_gain: Option<f64>,
    colsample_bytree: Option<f64>,
    seed: Option<u64>,
    verbosity: Option<Verbosity>,
    log_every: Option<usize>,
}

impl ConfigFile {
    fn apply(self, config: &mut PipelineConfig) -> Result<(), PipelineError> {
        if let Some(dir) = self.data_dir {
            config.data_dir = dir;
        }
        if let Some(dir) = self.out_dir {
            config.out_dir = dir;
        }
        if let Some(input) = self.input {
            config.input = input;
        }
        if self.loitering.is_some() {
            config.loitering = self.loitering;
        }
        if let Some(thresholds) = self.thresholds {
            config.thresholds = thresholds;
        }
        if let Some(size) = self.cell_size {
            config.cell_size = size;
        }
        config.model = self.model.apply(&config.model)?;
        config.risk_thresholds()?;
        config.spatial_binner()?;
        Ok(())
    }
}

impl ModelOverrides {
    fn apply(self, base: &GBDTConfig) -> Result<GBDTConfig, PipelineError> {
        Ok(GBDTConfig::builder()
            .n_trees(self.n_trees.unwrap_or(base.n_trees))
            .learning_rate(self.learning_rate.unwrap_or(base.learning_rate))
            .max_depth(self.max_depth.unwrap_or(base.max_depth))
            .min_child_weight(self.min_child_weight.unwrap_or(base.min_child_weight))
            .lambda(self.lambda.unwrap_or(base.lambda))
            .min_gain(self.min_gain.unwrap_or(base.min_gain))
            .colsample_bytree(self.colsample_bytree.unwrap_or(base.colsample_bytree))
            .seed(self.seed.unwrap_or(base.seed))
            .verbosity(self.verbosity.unwrap_or(base.verbosity))
            .log_every(self.log_every.unwrap_or(base.log_every))
            .build()?)
    }
}
