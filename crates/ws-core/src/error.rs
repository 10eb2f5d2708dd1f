//! Input and configuration errors.
//!
//! `DataError` covers everything that can be wrong with the tables and
//! parameters handed to the engine.  All of these are detected before the
//! infection state is touched.  Sub-crates wrap it in their own enums via
//! `From` impls.

use thiserror::Error;

use crate::WardId;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("{what}: row {row} has {got} fields, expected {expected}")]
    RowShape {
        what:     &'static str,
        row:      usize,
        expected: usize,
        got:      usize,
    },

    #[error("{what}: row count {got} does not match expected {expected}")]
    RowCountMismatch {
        what:     &'static str,
        expected: usize,
        got:      usize,
    },

    #[error("ward ids must be contiguous from 0: expected {expected}, found {found}")]
    NonContiguousWards { expected: u32, found: u32 },

    #[error("ward {ward} has negative population {population}")]
    NegativePopulation { ward: WardId, population: i64 },

    #[error("{context} references unknown ward {ward} (network has {ward_count} wards)")]
    UnknownWard {
        ward:       u32,
        ward_count: usize,
        context:    &'static str,
    },

    #[error("link {from} -> {to} has invalid {what} {value}")]
    InvalidLink {
        from:  WardId,
        to:    WardId,
        what:  &'static str,
        value: f64,
    },

    #[error("unknown parameter {0:?}")]
    UnknownParameter(String),

    #[error("invalid value {value:?} for {field}: {reason}")]
    InvalidValue {
        field:  String,
        value:  String,
        reason: String,
    },

    #[error("parameter file has {available} data rows, line {line} requested")]
    LineOutOfRange { line: usize, available: usize },

    #[error("invalid disease: {0}")]
    Disease(String),
}

impl DataError {
    pub fn invalid(field: impl Into<String>, value: impl ToString, reason: impl Into<String>) -> Self {
        DataError::InvalidValue {
            field:  field.into(),
            value:  value.to_string(),
            reason: reason.into(),
        }
    }
}

/// Shorthand result type for loaders and validators.
pub type DataResult<T> = Result<T, DataError>;
