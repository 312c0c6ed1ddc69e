use thiserror::Error;

use super::column_type::ColumnType;
use super::key::Key;

pub type TableResult<T> = Result<T, TableError>;

/// Failures raised by the table contract and its backends.
///
/// A row or column that simply does not exist is not an error; lookups
/// report that with `Option`.
#[derive(Debug, Error, PartialEq)]
pub enum TableError {
    #[error("key mismatch: '{key}' does not conform to key type {expected:?}")]
    KeyMismatch {
        key: Key,
        expected: Vec<ColumnType>,
    },

    #[error("integrity violation: key '{0}' already exists")]
    DuplicateKey(Key),

    #[error("table declares a key type; a key is required to insert")]
    KeyRequired,

    #[error("out of bound: column {index} (table has {len} columns)")]
    ColumnOutOfRange { index: usize, len: usize },

    #[error("too many values: {bound} bound for {len} columns")]
    TooManyValues { bound: usize, len: usize },

    #[error("null value in non-nullable column '{0}'")]
    NullViolation(String),

    #[error("cursor is read-only")]
    ReadOnlyCursor,

    #[error("cannot transfer column '{column}' of type {column_type}")]
    UnsupportedTransfer {
        column: String,
        column_type: ColumnType,
    },

    #[error("out of bound: sheet {sheet} (table has {len} sheets)")]
    SheetOutOfRange { sheet: usize, len: usize },

    #[error("a transaction is already active")]
    TransactionActive,

    #[error("no active transaction")]
    NoTransaction,

    #[error("integer overflow while incrementing column '{column}'")]
    Overflow { column: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("backend failure: {0}")]
    Backend(String),
}
