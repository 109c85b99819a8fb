use crate::model::types::ParseElementError;
use thiserror::Error;

/// Failure modes while reading or writing a single CIF record.
///
/// All variants are local to one structure; batch callers log the offending
/// record and move on rather than aborting the run.
#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O operation failed: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("required CIF field '{field}' is missing")]
    MissingField { field: String },

    #[error("no '{keyword}' block found in record")]
    BlockNotFound { keyword: &'static str },

    #[error("malformed CIF data: {details} (at line ~{line})")]
    Malformed { line: usize, details: String },

    #[error(transparent)]
    UnknownElement(#[from] ParseElementError),
}

impl Error {
    pub fn malformed(line: usize, details: impl Into<String>) -> Self {
        Self::Malformed {
            line,
            details: details.into(),
        }
    }

    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }
}
