//! Model-level tests on encoded categorical trips.

use approx::assert_relative_eq;

use iuu_risk::testing::fishing_trips;
use iuu_risk::{AssessmentCounts, CategoricalRow, FeatureGroupSpec, GBDTConfig, GBDTModel, OneHotEncoder, Verbosity};

use crate::common::sse;

fn encoded_observed(n: usize, seed: u64) -> (OneHotEncoder, iuu_risk::FeatureMatrix, Vec<f64>) {
    let trips = fishing_trips(n, 1.0, seed);
    let (rows, targets): (Vec<CategoricalRow>, Vec<f64>) = trips
        .iter()
        .filter_map(|t| {
            let (flag, gear, tas) = t.predictors()?;
            let score = t.assessments().risk_score()?;
            Some((CategoricalRow::new().level(flag).level(gear).level(tas), score))
        })
        .unzip();
    let specs = vec![
        FeatureGroupSpec::one_hot("flag", Some("flag_group")),
        FeatureGroupSpec::one_hot("gear", Some("vessel_class")),
        FeatureGroupSpec::one_hot("tas", Some("time_at_sea")),
    ];
    let encoder = OneHotEncoder::fit(specs, &rows).unwrap();
    let matrix = encoder.transform(&rows).unwrap().matrix;
    (encoder, matrix, targets)
}

#[test]
fn model_learns_categorical_risk() {
    let (encoder, matrix, targets) = encoded_observed(400, 11);
    assert_eq!(matrix.n_features(), encoder.layout().n_features());

    let config = GBDTConfig::builder()
        .n_trees(60)
        .learning_rate(0.1)
        .max_depth(4)
        .verbosity(Verbosity::Silent)
        .build()
        .unwrap();
    let model = GBDTModel::train(&matrix, &targets, config).unwrap();

    let predictions = model.predict(&matrix);
    let base = vec![model.base_score(); targets.len()];
    assert!(sse(&predictions, &targets) < sse(&base, &targets));

    // Base score is the mean label
    let mean = targets.iter().sum::<f64>() / targets.len() as f64;
    assert_relative_eq!(model.base_score(), mean, epsilon = 1e-12);

    let meta = model.meta();
    assert_eq!(meta.n_features, matrix.n_features());
    assert_eq!(meta.feature_names.as_deref(), Some(matrix.column_names()));
    assert_eq!(meta.train_metric, model.eval_history().last());
}

#[test]
fn label_formula_matches_assessments() {
    let counts = AssessmentCounts::new(2.0, 3.0, 1.0, 0.0);
    assert_relative_eq!(counts.risk_score().unwrap(), -1.0 / 3.0, epsilon = 1e-12);
    assert!(AssessmentCounts::new(0.0, 0.0, 0.0, 0.0).risk_score().is_none());
}
