//! CSV readers and writers.
//!
//! Input tables are read row by row through serde; rows that fail to parse are
//! dropped and counted rather than aborting the run. Output tables are written
//! with a header row derived from the record type.

use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{FeatureMatrix, MatrixError};

/// Errors from reading or writing CSV tables.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// Failed to open or create a file.
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to create an output directory.
    #[error("failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    /// CSV-level failure (header, encoding or write error).
    #[error("csv error in {path}: {source}")]
    Csv {
        path: PathBuf,
        source: csv::Error,
    },
    /// A feature matrix cell could not be parsed.
    #[error("invalid value {value:?} in {path} at row {row}, column {column}")]
    InvalidCell {
        path: PathBuf,
        row: usize,
        column: usize,
        value: String,
    },
    /// The parsed feature matrix was inconsistent.
    #[error(transparent)]
    Matrix(#[from] MatrixError),
}

/// Records read from a table plus the number of rows that failed to parse.
#[derive(Debug, Clone)]
pub struct ReadOutcome<T> {
    pub records: Vec<T>,
    pub dropped: usize,
}

// =============================================================================
// Records
// =============================================================================

/// Read all records of a CSV file, dropping malformed rows.
pub fn read_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, IoError> {
    let file = File::open(path).map_err(|source| IoError::Open { path: path.to_path_buf(), source })?;
    let outcome = read_records_from(file, path)?;
    if outcome.dropped > 0 {
        tracing::warn!(
            path = %path.display(),
            dropped = outcome.dropped,
            "dropped malformed rows"
        );
    }
    tracing::debug!(path = %path.display(), rows = outcome.records.len(), "read table");
    Ok(outcome.records)
}

/// Read records from any reader. `origin` is only used in error messages.
pub fn read_records_from<R: Read, T: DeserializeOwned>(
    reader: R,
    origin: &Path,
) -> Result<ReadOutcome<T>, IoError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    // Fail on an unreadable header; individual rows are recoverable.
    csv_reader
        .headers()
        .map_err(|source| IoError::Csv { path: origin.to_path_buf(), source })?;

    let mut records = Vec::new();
    let mut dropped = 0;
    for result in csv_reader.deserialize::<T>() {
        match result {
            Ok(record) => records.push(record),
            Err(err) => {
                tracing::debug!(error = %err, "skipping row");
                dropped += 1;
            }
        }
    }
    Ok(ReadOutcome { records, dropped })
}

/// Write records to a CSV file, creating parent directories as needed.
pub fn write_records<T: Serialize>(path: &Path, records: &[T]) -> Result<(), IoError> {
    let file = create_file(path)?;
    write_records_into(file, records, path)?;
    tracing::debug!(path = %path.display(), rows = records.len(), "wrote table");
    Ok(())
}

/// Write records to any writer. `origin` is only used in error messages.
pub fn write_records_into<W: Write, T: Serialize>(
    writer: W,
    records: &[T],
    origin: &Path,
) -> Result<(), IoError> {
    let csv_err = |source| IoError::Csv { path: origin.to_path_buf(), source };
    let mut csv_writer = csv::Writer::from_writer(writer);
    for record in records {
        csv_writer.serialize(record).map_err(csv_err)?;
    }
    csv_writer
        .flush()
        .map_err(|e| IoError::Csv { path: origin.to_path_buf(), source: e.into() })
}

// =============================================================================
// Feature matrix
// =============================================================================

/// Write a feature matrix with its column names as header.
pub fn write_matrix(path: &Path, matrix: &FeatureMatrix) -> Result<(), IoError> {
    let file = create_file(path)?;
    let csv_err = |source| IoError::Csv { path: path.to_path_buf(), source };
    let mut writer = csv::Writer::from_writer(file);

    writer.write_record(matrix.column_names()).map_err(csv_err)?;
    for row in matrix.view().rows() {
        writer
            .write_record(row.iter().map(|v| v.to_string()))
            .map_err(csv_err)?;
    }
    writer
        .flush()
        .map_err(|e| IoError::Csv { path: path.to_path_buf(), source: e.into() })
}

/// Read a feature matrix written by [`write_matrix`].
pub fn read_matrix(path: &Path) -> Result<FeatureMatrix, IoError> {
    let file = File::open(path).map_err(|source| IoError::Open { path: path.to_path_buf(), source })?;
    let csv_err = |source| IoError::Csv { path: path.to_path_buf(), source };
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(file);

    let names: Vec<String> = reader.headers().map_err(csv_err)?.iter().map(String::from).collect();
    let mut data = Vec::new();
    let mut n_rows = 0;
    for (row, record) in reader.records().enumerate() {
        let record = record.map_err(csv_err)?;
        for (column, cell) in record.iter().enumerate() {
            let value = cell.parse::<f32>().map_err(|_| IoError::InvalidCell {
                path: path.to_path_buf(),
                row,
                column,
                value: cell.to_string(),
            })?;
            data.push(value);
        }
        n_rows += 1;
    }
    Ok(FeatureMatrix::from_rows_flat(data, n_rows, names)?)
}

fn create_file(path: &Path) -> Result<File, IoError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|source| IoError::CreateDir { path: parent.to_path_buf(), source })?;
    }
    File::create(path).map_err(|source| IoError::Open { path: path.to_path_buf(), source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{FishingTrip, LoiteringEvent};

    #[test]
    fn malformed_rows_are_dropped() {
        let csv = "trip_id,ssvid,lon_mean,lat_mean\n\
                   a,1,10.5,-3.0\n\
                   b,2,not-a-number,1.0\n\
                   c,3,,\n";
        let outcome: ReadOutcome<LoiteringEvent> =
            read_records_from(csv.as_bytes(), Path::new("inline")).unwrap();
        assert_eq!(outcome.dropped, 1);
        assert_eq!(outcome.records.len(), 2);
        assert_eq!(outcome.records[0].position(), Some((10.5, -3.0)));
        assert_eq!(outcome.records[1].position(), None);
    }

    #[test]
    fn empty_categorical_fields_read_as_none() {
        let csv = "trip_id,flag_group,vessel_class,time_at_sea,iuu_no_to\n\
                   t1,china,,<1 month,2\n";
        let outcome: ReadOutcome<FishingTrip> =
            read_records_from(csv.as_bytes(), Path::new("inline")).unwrap();
        let trip = &outcome.records[0];
        assert_eq!(trip.vessel_class, None);
        assert_eq!(trip.predictors(), None);
        assert_eq!(trip.iuu_no_to, Some(2.0));
        assert_eq!(trip.lon_mean, None);
    }

    #[test]
    fn matrix_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/input.csv");
        let matrix = FeatureMatrix::from_rows_flat(
            vec![1.0, 0.0, 0.0, 1.0],
            2,
            vec!["flag_a".into(), "flag_b".into()],
        )
        .unwrap();

        write_matrix(&path, &matrix).unwrap();
        let loaded = read_matrix(&path).unwrap();
        assert_eq!(loaded, matrix);
    }
}
