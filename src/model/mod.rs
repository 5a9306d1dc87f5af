//! High-level model wrappers.
//!
//! [`GBDTModel`] combines training, prediction, explainability and
//! serialization of the boosted regression forest.
//!
//! # Example
//!
//! ```ignore
//! use iuu_risk::model::{GBDTConfig, GBDTModel};
//!
//! let config = GBDTConfig::builder()
//!     .n_trees(100)
//!     .learning_rate(0.05)
//!     .max_depth(10)
//!     .colsample_bytree(0.6)
//!     .build()?;
//! let model = GBDTModel::train(&matrix, &labels, config)?;
//! let scores = model.predict(&unlabelled);
//! model.save_json(path)?;
//! ```

pub mod gbdt;
mod meta;

pub use gbdt::{ConfigError, GBDTConfig, GBDTModel};
pub use meta::ModelMeta;
