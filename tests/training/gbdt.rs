//! GBDT trainer integration tests.
//!
//! Focused on behavior and invariants (not default params or superficial shapes).

use ndarray::Array2;

use iuu_risk::training::{GBDTParams, GBDTTrainer, Rmse, SquaredLoss, TrainError};

use crate::common::sse;

#[test]
fn train_rejects_invalid_targets_len() {
    let features = Array2::from_shape_vec((4, 2), vec![0.0, 1.0, 2.0, 3.0, 1.0, 2.0, 3.0, 4.0]).unwrap();
    let targets = vec![1.0, 2.0];

    let trainer = GBDTTrainer::new(SquaredLoss, Rmse, GBDTParams::default());
    let result = trainer.train(features.view(), &targets);

    assert!(matches!(result, Err(TrainError::TargetLengthMismatch { n_rows: 4, n_targets: 2 })));
}

#[test]
fn trained_forest_improves_over_base_score() {
    // y = x + 0.5
    let n_samples = 100;
    let xs: Vec<f32> = (0..n_samples).map(|i| i as f32 / 10.0).collect();
    let targets: Vec<f64> = xs.iter().map(|&x| x as f64 + 0.5).collect();
    let features = Array2::from_shape_vec((n_samples, 1), xs).unwrap();

    let params = GBDTParams { n_trees: 50, learning_rate: 0.1, max_depth: 3, ..Default::default() };
    let trainer = GBDTTrainer::new(SquaredLoss, Rmse, params);
    let (forest, history) = trainer.train(features.view(), &targets).unwrap();

    forest.validate().expect("trained forest should be structurally valid");
    assert_eq!(forest.n_trees(), 50);
    assert_eq!(history.len(), 50);

    let base = vec![forest.base_score(); n_samples];
    let predictions = forest.predict(features.view());
    assert!(sse(&predictions, &targets) < 0.1 * sse(&base, &targets));
}

#[test]
fn training_loss_never_increases() {
    // Leaf weights shrink the Newton step, so every round lowers in-sample squared error
    let n_samples = 120;
    let n_features = 4;
    let mut values = Vec::with_capacity(n_samples * n_features);
    let mut targets = Vec::with_capacity(n_samples);
    for i in 0..n_samples {
        let row: Vec<f32> = (0..n_features).map(|j| ((i >> j) & 1) as f32).collect();
        targets.push(2.0 * row[0] as f64 - row[1] as f64 + 3.0 * (row[2] * row[3]) as f64);
        values.extend(row);
    }
    let features = Array2::from_shape_vec((n_samples, n_features), values).unwrap();

    let params = GBDTParams {
        n_trees: 30,
        learning_rate: 0.2,
        max_depth: 3,
        colsample_bytree: 0.5,
        ..Default::default()
    };
    let (_, history) = GBDTTrainer::new(SquaredLoss, Rmse, params).train(features.view(), &targets).unwrap();

    assert_eq!(history.metric, "train-rmse");
    for pair in history.values.windows(2) {
        assert!(pair[1] <= pair[0] + 1e-12, "rmse increased: {pair:?}");
    }
}

#[test]
fn same_seed_same_forest() {
    let features = Array2::from_shape_fn((64, 6), |(i, j)| ((i * (j + 3)) % 7) as f32);
    let targets: Vec<f64> = (0..64).map(|i| (i % 5) as f64).collect();
    let params = GBDTParams { n_trees: 10, colsample_bytree: 0.5, seed: 9, ..Default::default() };

    let (a, _) = GBDTTrainer::new(SquaredLoss, Rmse, params.clone()).train(features.view(), &targets).unwrap();
    let (b, _) = GBDTTrainer::new(SquaredLoss, Rmse, params).train(features.view(), &targets).unwrap();
    assert_eq!(a, b);
}
