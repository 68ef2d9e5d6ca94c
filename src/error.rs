use std::path::PathBuf;

use thiserror::Error;

/// Errors returned when loading or analysing sales data.
#[derive(Debug, Error)]
pub enum SalesError {
    /// The input file does not exist.
    #[error("data file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// A row contains a malformed date or numeric field.
    #[error("parsing {} line {line}: {message}", path.display())]
    Parse {
        path: PathBuf,
        line: u64,
        message: String,
    },

    /// The header row lacks one of the required columns.
    #[error("loading {}: missing required column {column:?}", path.display())]
    MissingColumn { path: PathBuf, column: &'static str },

    /// Any other failure while reading the input.
    #[error("loading {}: {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Statistics were requested for a table with no records.
    #[error("no sales records to summarize")]
    EmptyInput,
}

pub type Result<T> = std::result::Result<T, SalesError>;
