//! Gradient boosted decision tree training.
//!
//! Exact greedy split search over raw feature values, depth-wise growth and
//! per-tree column subsampling.

mod grower;
mod sampling;
mod split;
mod trainer;

pub use grower::{GrowerParams, TreeGrower};
pub use sampling::ColSampler;
pub use split::{find_best_split, GainParams, SplitInfo};
pub use trainer::{GBDTParams, GBDTTrainer, TrainError};
