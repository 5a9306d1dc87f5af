//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::path::Path;

use iuu_risk::pipeline::{Analysis, PipelineConfig};
use iuu_risk::{GBDTConfig, Verbosity};

/// Pipeline config reading from and writing to `dir`, with a small, silent model.
pub fn small_config(analysis: Analysis, dir: &Path) -> PipelineConfig {
    let mut config = PipelineConfig::new(analysis);
    config.data_dir = dir.to_path_buf();
    config.out_dir = dir.join("out");
    config.model = GBDTConfig::builder()
        .n_trees(15)
        .learning_rate(0.3)
        .max_depth(4)
        .colsample_bytree(0.6)
        .verbosity(Verbosity::Silent)
        .build()
        .expect("valid config");
    config
}

/// Sum of squared differences.
pub fn sse(predictions: &[f64], targets: &[f64]) -> f64 {
    predictions.iter().zip(targets).map(|(p, t)| (p - t).powi(2)).sum()
}
