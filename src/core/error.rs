//! Errors raised by the extraction core.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("schema mismatch: expected [{}], found [{}]", expected.join(", "), found.join(", "))]
    SchemaMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("invalid selector: {0}")]
    InvalidSelector(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid cell in row {row}, column {column}: {message}")]
    InvalidCell {
        row: usize,
        column: String,
        message: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid season calendar: {0}")]
    Calendar(String),

    #[error("unreadable page markup: {0}")]
    Markup(String),
}

impl CoreError {
    pub fn schema_mismatch(expected: &[String], found: &[String]) -> Self {
        Self::SchemaMismatch {
            expected: expected.to_vec(),
            found: found.to_vec(),
        }
    }

    pub fn is_schema_mismatch(&self) -> bool {
        matches!(self, Self::SchemaMismatch { .. })
    }
}
