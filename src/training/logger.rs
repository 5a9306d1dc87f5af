//! Training progress logging.
//!
//! Routes trainer progress through `tracing`, gated by a [`Verbosity`]
//! level so library users can silence training output independently of the
//! subscriber's filter.

use serde::{Deserialize, Serialize};

use super::eval::MetricValue;

/// Verbosity level for training output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verbosity {
    /// No output.
    #[default]
    Silent,
    /// Warnings only.
    Warning,
    /// Start/finish summaries and periodic metrics.
    Info,
    /// Every round.
    Debug,
}

/// Logger used by the trainer.
#[derive(Debug, Clone)]
pub struct TrainingLogger {
    verbosity: Verbosity,
    log_every: usize,
    n_rounds: usize,
}

impl TrainingLogger {
    /// Create a logger; metrics are reported every `log_every` rounds at
    /// `Info`, and every round at `Debug`.
    pub fn new(verbosity: Verbosity, log_every: usize) -> Self {
        Self {
            verbosity,
            log_every: log_every.max(1),
            n_rounds: 0,
        }
    }

    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    pub fn start_training(&mut self, n_rounds: usize, n_rows: usize, n_features: usize) {
        self.n_rounds = n_rounds;
        if self.verbosity >= Verbosity::Info {
            tracing::info!(n_rounds, n_rows, n_features, "training started");
        }
    }

    pub fn log_round(&self, round: usize, metric: &MetricValue) {
        let last = round + 1 == self.n_rounds;
        if self.verbosity >= Verbosity::Debug {
            tracing::debug!(round, %metric, "round finished");
        } else if self.verbosity >= Verbosity::Info && (round % self.log_every == 0 || last) {
            tracing::info!(round, %metric, "round finished");
        }
    }

    pub fn warn(&self, message: &str) {
        if self.verbosity >= Verbosity::Warning {
            tracing::warn!("{message}");
        }
    }

    pub fn finish_training(&self, n_trees: usize, final_metric: Option<&MetricValue>) {
        if self.verbosity < Verbosity::Info {
            return;
        }
        match final_metric {
            Some(metric) => tracing::info!(n_trees, %metric, "training finished"),
            None => tracing::info!(n_trees, "training finished"),
        }
    }
}
