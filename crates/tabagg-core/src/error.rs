//! Error types for column selection and aggregation.

use std::path::PathBuf;
use thiserror::Error;

/// Reasons a column selection cannot be finalized.
///
/// None of these are fatal to an interactive run; the selector reports the
/// error and asks again.
#[derive(Debug, Error)]
pub enum SelectionError {
    /// The selection contained no column names.
    #[error("no columns were selected")]
    Empty,

    /// Selected names absent from the reference schema (all of them).
    #[error("the following columns do not exist: {}", quote_list(.0))]
    MissingColumns(Vec<String>),

    /// Empty entry given but the companion list file does not exist.
    #[error("no column list found at {path}")]
    CompanionMissing { path: PathBuf },

    /// Companion list file exists but could not be read.
    #[error("failed to read column list {path}: {source}")]
    CompanionRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised while building or stacking batches.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Failed DataFrame operation.
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl From<polars::prelude::PolarsError> for CoreError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

/// Result type for aggregation operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Formats names as `'a', 'b'`.
pub(crate) fn quote_list(names: &[String]) -> String {
    names
        .iter()
        .map(|name| format!("'{name}'"))
        .collect::<Vec<_>>()
        .join(", ")
}
