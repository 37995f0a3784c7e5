use thiserror::Error;

use crate::core::converter::{ConfigError, ParseError, ValueTypeError};

#[derive(Error, Debug)]
/// Errors raised while building a record schema or mapping rows.
///
/// Setup errors (`NoConverterAvailable`, `InvalidConfiguration`, `NoColumns`)
/// abort schema construction. Row errors carry the row number and only
/// abort the row being decoded.
pub enum MappingError {
    #[error("No converter available for field '{field}' of type {field_type}")]
    NoConverterAvailable { field: String, field_type: String },

    #[error("Invalid configuration for column '{column}': {source}")]
    InvalidConfiguration {
        column: String,
        #[source]
        source: ConfigError,
    },

    #[error("No CSV columns declared for record type {record}")]
    NoColumns { record: &'static str },

    #[error("Row {row}: column '{column}' at position {position} was not supplied")]
    MissingColumn {
        row: usize,
        column: String,
        position: usize,
    },

    #[error("Row {row}: column '{column}' must not be blank")]
    BlankColumn { row: usize, column: String },

    #[error("Row {row}: column '{column}': {source}")]
    Parse {
        row: usize,
        column: String,
        #[source]
        source: ParseError,
    },

    #[error("Row {row}: expected at most {expected} columns but found {found}")]
    TooManyColumns {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("Row {row}: invalid header: {reason}")]
    InvalidHeader { row: usize, reason: String },

    #[error("Row {row}: could not assign column '{column}': {source}")]
    FieldAssignment {
        row: usize,
        column: String,
        #[source]
        source: ValueTypeError,
    },

    #[error("Row {row}: {reason}")]
    RowValidation { row: usize, reason: String },

    #[error("Column '{column}' cannot format value: {source}")]
    ValueType {
        column: String,
        #[source]
        source: ValueTypeError,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "csv")]
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[cfg(feature = "json")]
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MappingError {
    /// Returns the row number attached to a row-scoped error.
    pub fn row_number(&self) -> Option<usize> {
        match self {
            MappingError::MissingColumn { row, .. }
            | MappingError::BlankColumn { row, .. }
            | MappingError::Parse { row, .. }
            | MappingError::TooManyColumns { row, .. }
            | MappingError::InvalidHeader { row, .. }
            | MappingError::FieldAssignment { row, .. }
            | MappingError::RowValidation { row, .. } => Some(*row),
            _ => None,
        }
    }

    /// Whether the error only concerns the current row, so the caller may
    /// skip it and keep reading.
    pub fn is_row_error(&self) -> bool {
        self.row_number().is_some() && !matches!(self, MappingError::InvalidHeader { .. })
    }

    /// Name of the column the error refers to, if any.
    pub fn column(&self) -> Option<&str> {
        match self {
            MappingError::InvalidConfiguration { column, .. }
            | MappingError::MissingColumn { column, .. }
            | MappingError::BlankColumn { column, .. }
            | MappingError::Parse { column, .. }
            | MappingError::FieldAssignment { column, .. }
            | MappingError::ValueType { column, .. } => Some(column),
            _ => None,
        }
    }
}
