//! High-level GBDT configuration with builder pattern.
//!
//! [`GBDTConfig`] uses the `bon` crate for builder generation and validates
//! every hyperparameter at `build()`.
//!
//! # Example
//!
//! ```
//! use iuu_risk::model::GBDTConfig;
//!
//! // All defaults
//! let config = GBDTConfig::builder().build().unwrap();
//!
//! // Slow, deep ensemble
//! let config = GBDTConfig::builder()
//!     .n_trees(300)
//!     .learning_rate(0.01)
//!     .max_depth(10)
//!     .colsample_bytree(0.6)
//!     .build()
//!     .unwrap();
//! ```

use bon::Builder;
use serde::{Deserialize, Serialize};

use crate::training::{GBDTParams, Verbosity};

// =============================================================================
// ConfigError
// =============================================================================

/// Errors that can occur during configuration validation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// Learning rate must be positive.
    #[error("learning_rate must be positive, got {0}")]
    InvalidLearningRate(f64),
    /// Number of trees must be at least 1.
    #[error("n_trees must be at least 1")]
    InvalidNTrees,
    /// Trees must be allowed at least one split.
    #[error("max_depth must be at least 1")]
    InvalidMaxDepth,
    /// Invalid sampling ratio (must be in (0, 1]).
    #[error("{field} must be in (0, 1], got {value}")]
    InvalidSamplingRatio { field: &'static str, value: f64 },
    /// Invalid regularization parameter.
    #[error("{field} must be non-negative, got {value}")]
    InvalidRegularization { field: &'static str, value: f64 },
}

// =============================================================================
// GBDTConfig
// =============================================================================

/// Configuration for GBDT model training.
#[derive(Debug, Clone, PartialEq, Builder, Serialize, Deserialize)]
#[builder(
    derive(Clone, Debug),
    finish_fn(vis = "", name = __build_internal)
)]
pub struct GBDTConfig {
    // === Boosting parameters ===
    /// Number of boosting rounds (trees to train). Default: 100.
    #[builder(default = 100)]
    pub n_trees: u32,

    /// Learning rate (shrinkage). Default: 0.3.
    #[builder(default = 0.3)]
    pub learning_rate: f64,

    // === Tree structure ===
    /// Maximum tree depth. Default: 6.
    #[builder(default = 6)]
    pub max_depth: u32,

    // === Regularization ===
    /// Minimum hessian sum per child. Default: 1.0.
    #[builder(default = 1.0)]
    pub min_child_weight: f64,

    /// L2 regularization on leaf weights. Default: 1.0.
    #[builder(default = 1.0)]
    pub lambda: f64,

    /// Minimum gain to keep a split. Default: 0.0.
    #[builder(default = 0.0)]
    pub min_gain: f64,

    // === Sampling ===
    /// Fraction of columns sampled per tree. Default: 1.0.
    #[builder(default = 1.0)]
    pub colsample_bytree: f64,

    // === Reproducibility ===
    /// Random seed. Default: 42.
    #[builder(default = 42)]
    pub seed: u64,

    // === Logging ===
    /// Verbosity level. Default: `Silent`.
    #[builder(default)]
    pub verbosity: Verbosity,

    /// Metric logging interval in rounds. Default: 10.
    #[builder(default = 10)]
    pub log_every: usize,
}

/// Custom finishing function that validates the config.
impl<S: g_b_d_t_config_builder::IsComplete> GBDTConfigBuilder<S> {
    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if any parameter is invalid:
    /// - `learning_rate <= 0`
    /// - `n_trees == 0` or `max_depth == 0`
    /// - `colsample_bytree` outside (0, 1]
    /// - Negative regularization parameters
    pub fn build(self) -> Result<GBDTConfig, ConfigError> {
        let config = self.__build_internal();
        config.validate()?;
        Ok(config)
    }
}

impl GBDTConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        // NaN fails every comparison, so test the accepted range
        if !(self.learning_rate > 0.0) {
            return Err(ConfigError::InvalidLearningRate(self.learning_rate));
        }
        if self.n_trees == 0 {
            return Err(ConfigError::InvalidNTrees);
        }
        if self.max_depth == 0 {
            return Err(ConfigError::InvalidMaxDepth);
        }
        if !(self.colsample_bytree > 0.0 && self.colsample_bytree <= 1.0) {
            return Err(ConfigError::InvalidSamplingRatio {
                field: "colsample_bytree",
                value: self.colsample_bytree,
            });
        }
        for (field, value) in [
            ("lambda", self.lambda),
            ("min_child_weight", self.min_child_weight),
            ("min_gain", self.min_gain),
        ] {
            if !(value >= 0.0) {
                return Err(ConfigError::InvalidRegularization { field, value });
            }
        }
        Ok(())
    }

    /// Convert to trainer parameters.
    pub fn to_trainer_params(&self) -> GBDTParams {
        GBDTParams {
            n_trees: self.n_trees,
            learning_rate: self.learning_rate,
            max_depth: self.max_depth,
            min_child_weight: self.min_child_weight,
            lambda: self.lambda,
            min_gain: self.min_gain,
            colsample_bytree: self.colsample_bytree,
            seed: self.seed,
            verbosity: self.verbosity,
            log_every: self.log_every,
        }
    }
}

impl Default for GBDTConfig {
    fn default() -> Self {
        Self::builder().__build_internal()
    }
}

// =============================================================================
// Tests
// =============================================================================
