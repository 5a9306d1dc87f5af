//! Training infrastructure for gradient boosting.
//!
//! ## Shared Infrastructure
//!
//! - [`GradsTuple`], [`ObjectiveFn`]: gradient computation
//! - [`MetricFn`], [`EvalHistory`]: evaluation during training
//! - [`TrainingLogger`], [`Verbosity`]: structured logging via `tracing`
//!
//! ## GBDT
//!
//! - [`gbdt`]: exact greedy, depth-wise regression tree boosting
//!
//! Training is single-threaded and deterministic for a fixed seed.

mod eval;
pub mod gbdt;
mod logger;
mod metrics;
mod objectives;

pub use eval::{EvalHistory, MetricValue};
pub use logger::{TrainingLogger, Verbosity};
pub use metrics::{MetricFn, Rmse};
pub use objectives::{GradsTuple, ObjectiveFn, SquaredLoss};

pub use gbdt::{ColSampler, GBDTParams, GBDTTrainer, GainParams, TrainError};
