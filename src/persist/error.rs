use std::path::PathBuf;

/// Errors reading or writing run artefacts.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("postcard error: {0}")]
    Postcard(#[from] postcard::Error),

    /// The file does not start with the expected magic bytes.
    #[error("not a SHAP tensor file")]
    BadMagic,

    /// Written by a newer version of this crate.
    #[error("unsupported format version {found} (this build reads up to {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },

    /// Decoded data violates a structural invariant.
    #[error("invalid artefact: {0}")]
    Validation(String),
}
