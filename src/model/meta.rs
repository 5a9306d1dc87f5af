//! Model metadata.

use serde::{Deserialize, Serialize};

/// Introspection data about a trained model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelMeta {
    /// Feature (column) names, in training column order.
    pub feature_names: Option<Vec<String>>,
    /// Number of features.
    pub n_features: usize,
    /// Objective the forest was trained with.
    pub objective: String,
    /// Training metric after the final round.
    pub train_metric: Option<f64>,
}

impl ModelMeta {
    pub fn new(n_features: usize) -> Self {
        Self {
            n_features,
            ..Default::default()
        }
    }

    /// Name of feature `index`, or `f{index}` when names are unknown.
    pub fn feature_name(&self, index: usize) -> String {
        self.feature_names
            .as_ref()
            .and_then(|names| names.get(index).cloned())
            .unwrap_or_else(|| format!("f{index}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feature_name_falls_back_to_index() {
        let mut meta = ModelMeta::new(2);
        assert_eq!(meta.feature_name(1), "f1");
        meta.feature_names = Some(vec!["flag_a".into(), "gear_b".into()]);
        assert_eq!(meta.feature_name(1), "gear_b");
    }
}
