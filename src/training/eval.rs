//! Evaluation records kept during training.

use serde::{Deserialize, Serialize};

// =============================================================================
// MetricValue
// =============================================================================

/// A computed metric value with metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricValue {
    /// Name of the metric (e.g., "train-rmse").
    pub name: String,
    pub value: f64,
    /// Whether higher values are better (false for RMSE).
    pub higher_is_better: bool,
}

impl MetricValue {
    pub fn new(name: impl Into<String>, value: f64, higher_is_better: bool) -> Self {
        Self {
            name: name.into(),
            value,
            higher_is_better,
        }
    }

    /// Returns true if this value is better than another.
    pub fn is_better_than(&self, other: &Self) -> bool {
        if self.higher_is_better {
            self.value > other.value
        } else {
            self.value < other.value
        }
    }
}

impl std::fmt::Display for MetricValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {:.6}", self.name, self.value)
    }
}

// =============================================================================
// EvalHistory
// =============================================================================

/// Per-round training metric.
///
/// Evaluated on the training rows themselves, so it measures fit rather than
/// generalisation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvalHistory {
    /// Metric name, prefixed with the evaluation set ("train-rmse").
    pub metric: String,
    /// One value per boosting round.
    pub values: Vec<f64>,
}

impl EvalHistory {
    pub fn new(metric: impl Into<String>) -> Self {
        Self {
            metric: metric.into(),
            values: Vec::new(),
        }
    }

    pub fn push(&mut self, value: f64) {
        self.values.push(value);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Metric after the final round.
    pub fn last(&self) -> Option<f64> {
        self.values.last().copied()
    }

    /// Metric after round `round` as a [`MetricValue`].
    pub fn value_at(&self, round: usize, higher_is_better: bool) -> Option<MetricValue> {
        self.values
            .get(round)
            .map(|&v| MetricValue::new(self.metric.clone(), v, higher_is_better))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_tracks_rounds() {
        let mut history = EvalHistory::new("train-rmse");
        assert!(history.is_empty());
        history.push(2.0);
        history.push(1.5);
        assert_eq!(history.len(), 2);
        assert_eq!(history.last(), Some(1.5));

        let first = history.value_at(0, false).unwrap();
        let second = history.value_at(1, false).unwrap();
        assert!(second.is_better_than(&first));
        assert_eq!(second.to_string(), "train-rmse: 1.500000");
        assert!(history.value_at(2, false).is_none());
    }
}
