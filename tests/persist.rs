//! Run artefact round trips.

use iuu_risk::persist::{load_json, PersistError};
use iuu_risk::pipeline::{self, file_names, Analysis};
use iuu_risk::testing::write_fishing_dataset;
use iuu_risk::data::io::read_matrix;
use iuu_risk::ShapInteractionValues;

mod common;

#[test]
fn saved_model_reproduces_predictions() {
    let dir = tempfile::tempdir().unwrap();
    write_fishing_dataset(dir.path(), 300, 5).unwrap();
    let config = common::small_config(Analysis::Fishing, dir.path());
    pipeline::run(&config).unwrap();

    let model = load_json(&config.output_path(file_names::MODEL)).unwrap();
    let input = read_matrix(&config.output_path(file_names::INPUT)).unwrap();
    assert_eq!(input.column_names(), model.meta().feature_names.as_deref().unwrap());

    let shap = ShapInteractionValues::load(&config.output_path(file_names::SHAP)).unwrap();
    assert_eq!(shap.n_samples(), input.n_rows());
    assert_eq!(shap.n_features(), input.n_features());
    assert!(shap.verify(&model.predict(&input), 1e-6));
}

#[test]
fn missing_model_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_json(&dir.path().join("absent.model.json")).unwrap_err();
    assert!(matches!(err, PersistError::Io { .. }));
}
