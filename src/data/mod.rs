//! Data handling: raw trip tables, the dense feature matrix and CSV I/O.
//!
//! - [`records`]: serde row types for the input tables
//! - [`FeatureMatrix`]: dense `[n_rows, n_features]` one-hot matrix
//! - [`io`]: CSV readers and writers for inputs and output tables

pub mod io;
mod matrix;
pub mod records;

pub use io::IoError;
pub use matrix::{FeatureMatrix, MatrixError, SampleAccessor};
pub use records::{EncounterRecord, FishingTrip, LoiteringEvent};
