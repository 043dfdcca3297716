use thiserror::Error;

use crate::constants::PointingId;

#[derive(Error, Debug)]
pub enum OpSimError {
    #[error("Unsupported OpSim version: {0}")]
    UnsupportedVersion(String),

    #[error("Subset {0} not implemented")]
    UnsupportedSubset(String),

    #[error("Proposal role '{0}' not found in the proposal table of this run")]
    UnknownRole(String),

    #[error("Angle unit of ra and dec columns not recognized: {0}")]
    UnsupportedAngleUnit(String),

    #[error("Pointing ID {0} appears more than once after de-duplication")]
    DuplicatePointingID(PointingId),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Column not found: {0}")]
    MissingColumn(String),

    #[error("Column '{column}' is not of type {expected}")]
    ColumnType {
        column: String,
        expected: &'static str,
    },

    #[error("Column '{column}' has {found} rows, expected {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        found: usize,
    },

    #[error("Column '{0}' already exists in the table")]
    DuplicateColumn(String),

    #[error("Table not found: {0}")]
    TableNotFound(String),

    #[error("Column '{column}' has unsupported data type {data_type}")]
    UnsupportedColumnType { column: String, data_type: String },

    #[error("Null value found in column '{0}'")]
    NullValue(String),

    #[error("Unable to perform file operation: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Parquet error: {0}")]
    ParquetError(#[from] parquet::errors::ParquetError),

    #[error("Arrow error: {0}")]
    ArrowError(#[from] arrow_schema::ArrowError),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl PartialEq for OpSimError {
    fn eq(&self, other: &Self) -> bool {
        use OpSimError::*;
        match (self, other) {
            (UnsupportedVersion(a), UnsupportedVersion(b)) => a == b,
            (UnsupportedSubset(a), UnsupportedSubset(b)) => a == b,
            (UnknownRole(a), UnknownRole(b)) => a == b,
            (UnsupportedAngleUnit(a), UnsupportedAngleUnit(b)) => a == b,
            (DuplicatePointingID(a), DuplicatePointingID(b)) => a == b,
            (InvalidOperation(a), InvalidOperation(b)) => a == b,
            (MissingColumn(a), MissingColumn(b)) => a == b,
            (
                ColumnType {
                    column: c1,
                    expected: e1,
                },
                ColumnType {
                    column: c2,
                    expected: e2,
                },
            ) => c1 == c2 && e1 == e2,
            (
                LengthMismatch {
                    column: c1,
                    expected: e1,
                    found: f1,
                },
                LengthMismatch {
                    column: c2,
                    expected: e2,
                    found: f2,
                },
            ) => c1 == c2 && e1 == e2 && f1 == f2,
            (DuplicateColumn(a), DuplicateColumn(b)) => a == b,
            (TableNotFound(a), TableNotFound(b)) => a == b,
            (
                UnsupportedColumnType {
                    column: c1,
                    data_type: d1,
                },
                UnsupportedColumnType {
                    column: c2,
                    data_type: d2,
                },
            ) => c1 == c2 && d1 == d2,
            (NullValue(a), NullValue(b)) => a == b,
            (Config(a), Config(b)) => a == b,

            // Wrapped library errors are not comparable: equal if same variant
            (IoError(_), IoError(_)) => true,
            (ParquetError(_), ParquetError(_)) => true,
            (ArrowError(_), ArrowError(_)) => true,
            (CsvError(_), CsvError(_)) => true,

            _ => false,
        }
    }
}
