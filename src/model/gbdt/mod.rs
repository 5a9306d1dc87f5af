//! Boosted regression forest model.

mod config;
mod model;

pub use config::{ConfigError, GBDTConfig};
pub use model::GBDTModel;
