//! TreeSHAP invariants on trained forests.

use ndarray::Array2;
use proptest::prelude::*;

use iuu_risk::training::{GBDTParams, GBDTTrainer, Rmse, SquaredLoss};
use iuu_risk::TreeExplainer;

fn dataset(rows: &[([bool; 3], f64)]) -> (Array2<f32>, Vec<f64>) {
    let features = Array2::from_shape_fn((rows.len(), 3), |(r, c)| if rows[r].0[c] { 1.0 } else { 0.0 });
    let targets = rows.iter().map(|(_, y)| *y).collect();
    (features, targets)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn shap_values_are_locally_accurate(rows in prop::collection::vec((any::<[bool; 3]>(), -5.0f64..5.0), 4..40)) {
        let (features, targets) = dataset(&rows);
        let params = GBDTParams { n_trees: 6, learning_rate: 0.5, max_depth: 3, ..Default::default() };
        let (forest, _) = GBDTTrainer::new(SquaredLoss, Rmse, params).train(features.view(), &targets).unwrap();
        let predictions = forest.predict(features.view());

        let explainer = TreeExplainer::new(&forest).unwrap();
        let shap = explainer.shap_values(features.view());
        prop_assert!(shap.verify(&predictions, 1e-6));

        let interactions = explainer.shap_interaction_values(features.view());
        prop_assert!(interactions.is_symmetric(1e-9));
        prop_assert!(interactions.verify(&predictions, 1e-6));

        // Interaction rows sum to the per-feature SHAP values
        let collapsed = interactions.shap_values();
        for s in 0..shap.n_samples() {
            for f in 0..shap.n_features() {
                prop_assert!((collapsed.get(s, f) - shap.get(s, f)).abs() < 1e-6);
            }
        }
    }
}

#[test]
fn unused_features_get_no_attribution() {
    // Target depends on column 0 only
    let rows: Vec<([bool; 3], f64)> = (0..32)
        .map(|i| ([i % 2 == 0, i % 3 == 0, i % 5 == 0], if i % 2 == 0 { 2.0 } else { -1.0 }))
        .collect();
    let (features, targets) = dataset(&rows);
    let params = GBDTParams { n_trees: 5, max_depth: 1, ..Default::default() };
    let (forest, _) = GBDTTrainer::new(SquaredLoss, Rmse, params).train(features.view(), &targets).unwrap();

    let interactions = TreeExplainer::new(&forest).unwrap().shap_interaction_values(features.view());
    for s in 0..interactions.n_samples() {
        for j in 0..interactions.n_features() {
            for i in 1..interactions.n_features() {
                assert_eq!(interactions.get(s, i, j), 0.0);
                assert_eq!(interactions.get(s, j, i), 0.0);
            }
        }
    }
}
