//! Run artefact persistence.
//!
//! - Model: versioned JSON document (`serde_json`). Schema types in
//!   [`schema`] are separate from runtime types and validated on read.
//! - SHAP interaction tensor: magic bytes, a format version and a
//!   `postcard`-encoded payload.

mod convert;
mod error;
pub mod schema;
mod shap;

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

pub use error::PersistError;
pub use shap::{load_shap, read_shap_from, save_shap, write_shap_into, SHAP_MAGIC, SHAP_VERSION};

use crate::model::GBDTModel;
use schema::{ModelEnvelope, MODEL_FORMAT, MODEL_SCHEMA_VERSION};

pub(crate) fn create(path: &Path) -> Result<File, PersistError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| PersistError::Io { path: parent.to_path_buf(), source })?;
    }
    File::create(path).map_err(|source| PersistError::Io { path: path.to_path_buf(), source })
}

pub(crate) fn open(path: &Path) -> Result<File, PersistError> {
    File::open(path).map_err(|source| PersistError::Io { path: path.to_path_buf(), source })
}

/// Serialize a model as pretty-printed JSON into `writer`.
pub fn write_json_into<W: Write>(model: &GBDTModel, writer: W) -> Result<(), PersistError> {
    let envelope = ModelEnvelope {
        format: MODEL_FORMAT.to_string(),
        schema_version: MODEL_SCHEMA_VERSION,
        model: model.into(),
    };
    serde_json::to_writer_pretty(writer, &envelope)?;
    Ok(())
}

/// Deserialize and validate a model from JSON.
pub fn read_json_from<R: Read>(reader: R) -> Result<GBDTModel, PersistError> {
    let envelope: ModelEnvelope = serde_json::from_reader(reader)?;
    if envelope.format != MODEL_FORMAT {
        return Err(PersistError::Validation(format!("unknown model format '{}'", envelope.format)));
    }
    if envelope.schema_version > MODEL_SCHEMA_VERSION {
        return Err(PersistError::UnsupportedVersion {
            found: envelope.schema_version,
            supported: MODEL_SCHEMA_VERSION,
        });
    }
    GBDTModel::try_from(envelope.model)
}

/// Write a model to a JSON file, creating parent directories.
pub fn save_json(model: &GBDTModel, path: &Path) -> Result<(), PersistError> {
    let mut writer = BufWriter::new(create(path)?);
    write_json_into(model, &mut writer)?;
    writer.flush().map_err(|source| PersistError::Io { path: path.to_path_buf(), source })?;
    tracing::debug!(path = %path.display(), "model written");
    Ok(())
}

/// Read a model from a JSON file.
pub fn load_json(path: &Path) -> Result<GBDTModel, PersistError> {
    read_json_from(BufReader::new(open(path)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::FeatureMatrix;
    use crate::model::GBDTConfig;

    fn model() -> GBDTModel {
        let names = ["a", "b"].map(String::from).to_vec();
        let x = FeatureMatrix::from_rows_flat(vec![0.0, 1.0, 1.0, 0.0, 1.0, 1.0], 3, names).unwrap();
        let config = GBDTConfig::builder().n_trees(3).build().unwrap();
        GBDTModel::train(&x, &[1.0, 2.0, 4.0], config).unwrap()
    }

    #[test]
    fn json_round_trip_preserves_model() {
        let model = model();
        let mut buf = Vec::new();
        write_json_into(&model, &mut buf).unwrap();
        let loaded = read_json_from(buf.as_slice()).unwrap();
        assert_eq!(loaded, model);
    }

    #[test]
    fn newer_schema_is_rejected() {
        let mut buf = Vec::new();
        write_json_into(&model(), &mut buf).unwrap();
        let mut doc: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        doc["schema_version"] = serde_json::json!(MODEL_SCHEMA_VERSION + 1);
        let err = read_json_from(doc.to_string().as_bytes()).unwrap_err();
        assert!(matches!(err, PersistError::UnsupportedVersion { .. }));
    }

    #[test]
    fn corrupt_tree_fails_validation() {
        let mut buf = Vec::new();
        write_json_into(&model(), &mut buf).unwrap();
        let mut doc: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        doc["model"]["forest"]["trees"][0]["leaf_values"] = serde_json::json!([]);
        let err = read_json_from(doc.to_string().as_bytes()).unwrap_err();
        assert!(matches!(err, PersistError::Validation(_)));
    }
}
