//! Binary SHAP interaction tensor format.
//!
//! ```text
//! ┌──────────────┬──────────────────┬─────────────────────────────┐
//! │ magic (4 B)  │ version (u32 LE) │ postcard(ShapPayload)       │
//! └──────────────┴──────────────────┴─────────────────────────────┘
//! ```

use std::borrow::Cow;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use ndarray::Array3;
use serde::{Deserialize, Serialize};

use super::error::PersistError;
use crate::explainability::ShapInteractionValues;

/// Magic bytes identifying a SHAP tensor file.
pub const SHAP_MAGIC: &[u8; 4] = b"IUUS";

/// Current tensor format version.
pub const SHAP_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
enum ShapPayload {
    V1 {
        n_samples: u64,
        n_features: u64,
        base_value: f64,
        /// Row-major `[sample][i][j]`.
        values: Vec<f64>,
    },
}

/// Same wire layout as [`ShapPayload`], serialized from borrowed values.
#[derive(Serialize)]
enum ShapPayloadRef<'a> {
    V1 {
        n_samples: u64,
        n_features: u64,
        base_value: f64,
        values: &'a [f64],
    },
}

/// Stream a tensor into `writer`. Contiguous tensors are not copied.
pub fn write_shap_into<W: Write>(shap: &ShapInteractionValues, mut writer: W) -> Result<(), PersistError> {
    let values = match shap.as_slice() {
        Some(values) => Cow::Borrowed(values),
        None => Cow::Owned(shap.to_flat_vec()),
    };
    let payload = ShapPayloadRef::V1 {
        n_samples: shap.n_samples() as u64,
        n_features: shap.n_features() as u64,
        base_value: shap.base_value(),
        values: &values,
    };
    let io = |source| PersistError::Io { path: "<writer>".into(), source };
    writer.write_all(SHAP_MAGIC).map_err(io)?;
    writer.write_all(&SHAP_VERSION.to_le_bytes()).map_err(io)?;
    postcard::to_io(&payload, &mut writer)?;
    Ok(())
}

pub fn read_shap_from<R: Read>(mut reader: R) -> Result<ShapInteractionValues, PersistError> {
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .map_err(|source| PersistError::Io { path: "<reader>".into(), source })?;

    if bytes.len() < 8 || &bytes[..4] != SHAP_MAGIC {
        return Err(PersistError::BadMagic);
    }
    let mut version = [0u8; 4];
    version.copy_from_slice(&bytes[4..8]);
    let version = u32::from_le_bytes(version);
    if version > SHAP_VERSION {
        return Err(PersistError::UnsupportedVersion { found: version, supported: SHAP_VERSION });
    }

    let ShapPayload::V1 { n_samples, n_features, base_value, values } = postcard::from_bytes(&bytes[8..])?;
    let shape = (n_samples as usize, n_features as usize, n_features as usize);
    let values = Array3::from_shape_vec(shape, values).map_err(|e| PersistError::Validation(e.to_string()))?;
    Ok(ShapInteractionValues::new(values, base_value))
}

/// Write a tensor to `path`, creating parent directories.
pub fn save_shap(shap: &ShapInteractionValues, path: &Path) -> Result<(), PersistError> {
    let mut writer = BufWriter::new(super::create(path)?);
    write_shap_into(shap, &mut writer).map_err(|e| with_path(e, path))?;
    writer.flush().map_err(|source| PersistError::Io { path: path.to_path_buf(), source })?;
    tracing::debug!(
        path = %path.display(),
        n_samples = shap.n_samples(),
        n_features = shap.n_features(),
        "SHAP tensor written"
    );
    Ok(())
}

pub fn load_shap(path: &Path) -> Result<ShapInteractionValues, PersistError> {
    read_shap_from(BufReader::new(super::open(path)?)).map_err(|e| with_path(e, path))
}

fn with_path(err: PersistError, path: &Path) -> PersistError {
    match err {
        PersistError::Io { source, .. } => PersistError::Io { path: path.to_path_buf(), source },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    fn tensor() -> ShapInteractionValues {
        let values = Array3::from_shape_fn((3, 2, 2), |(r, i, j)| (r * 4 + i * 2 + j) as f64 * 0.25);
        ShapInteractionValues::new(values, -0.5)
    }

    #[test]
    fn tensor_round_trip() {
        let shap = tensor();
        let mut buf = Vec::new();
        write_shap_into(&shap, &mut buf).unwrap();
        assert_eq!(&buf[..4], SHAP_MAGIC);
        assert_eq!(read_shap_from(buf.as_slice()).unwrap(), shap);
    }

    #[test]
    fn streamed_payload_matches_owned_encoding() {
        let shap = tensor();
        let mut buf = Vec::new();
        write_shap_into(&shap, &mut buf).unwrap();

        let owned = ShapPayload::V1 {
            n_samples: 3,
            n_features: 2,
            base_value: -0.5,
            values: shap.to_flat_vec(),
        };
        assert_eq!(&buf[8..], postcard::to_stdvec(&owned).unwrap().as_slice());
    }

    #[test]
    fn non_contiguous_tensor_round_trip() {
        let values = Array3::from_shape_fn((2, 3, 3), |(r, i, j)| (r * 9 + i * 3 + j) as f64).permuted_axes([0, 2, 1]);
        let shap = ShapInteractionValues::new(values, 1.5);
        assert!(shap.as_slice().is_none());

        let mut buf = Vec::new();
        write_shap_into(&shap, &mut buf).unwrap();
        let back = read_shap_from(buf.as_slice()).unwrap();
        assert_eq!(back, shap);
        assert_eq!(back.get(1, 0, 2), shap.get(1, 0, 2));
    }

    #[test]
    fn file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("shap.bin");
        let shap = tensor();
        save_shap(&shap, &path).unwrap();
        assert_eq!(load_shap(&path).unwrap(), shap);
    }

    #[test]
    fn rejects_foreign_and_future_files() {
        assert!(matches!(read_shap_from(&b"NOPE\x01\0\0\0"[..]), Err(PersistError::BadMagic)));

        let mut buf = Vec::new();
        write_shap_into(&tensor(), &mut buf).unwrap();
        buf[4..8].copy_from_slice(&(SHAP_VERSION + 1).to_le_bytes());
        assert!(matches!(
            read_shap_from(buf.as_slice()),
            Err(PersistError::UnsupportedVersion { found: 2, supported: 1 })
        ));
    }

    #[test]
    fn rejects_inconsistent_shape() {
        let payload = ShapPayload::V1 { n_samples: 2, n_features: 2, base_value: 0.0, values: vec![0.0; 3] };
        let mut buf = SHAP_MAGIC.to_vec();
        buf.extend_from_slice(&SHAP_VERSION.to_le_bytes());
        buf.extend_from_slice(&postcard::to_stdvec(&payload).unwrap());
        assert!(matches!(read_shap_from(buf.as_slice()), Err(PersistError::Validation(_))));
    }
}
