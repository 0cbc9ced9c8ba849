//! Error types for the table engine

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    // Schema errors
    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Column already exists: {0}")]
    DuplicateColumn(String),

    #[error("Row has {found} cells, table {table} has {expected} columns")]
    ColumnCountMismatch {
        table: String,
        expected: usize,
        found: usize,
    },

    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    // Type errors
    #[error("Type mismatch on column {column}: expected {expected}, found {found:?}")]
    TypeMismatch {
        column: String,
        expected: String,
        found: String,
    },

    // State errors
    #[error("No active transaction")]
    NoActiveTransaction,

    // Lookup errors
    #[error("Row not found at position {0}")]
    RowNotFound(usize),

    #[error("No row matches {column} = {value}")]
    NoMatchingRow { column: String, value: String },

    #[error("Index not found: {0}")]
    IndexNotFound(String),

    // Aggregate errors
    #[error("No numeric values in column {0}")]
    EmptyAggregate(String),

    // Caller errors
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Parse error: {0}")]
    Parse(String),

    // System errors
    #[error("I/O error: {0}")]
    Io(String),
}

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Schema,
    Type,
    State,
    NotFound,
    Aggregate,
    Argument,
    Io,
}

impl Error {
    /// Returns the category this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::ColumnNotFound(_)
            | Error::DuplicateColumn(_)
            | Error::ColumnCountMismatch { .. }
            | Error::InvalidSchema(_) => ErrorKind::Schema,
            Error::TypeMismatch { .. } => ErrorKind::Type,
            Error::NoActiveTransaction => ErrorKind::State,
            Error::RowNotFound(_) | Error::NoMatchingRow { .. } | Error::IndexNotFound(_) => {
                ErrorKind::NotFound
            }
            Error::EmptyAggregate(_) => ErrorKind::Aggregate,
            Error::InvalidArgument(_) | Error::Parse(_) => ErrorKind::Argument,
            Error::Io(_) => ErrorKind::Io,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}
