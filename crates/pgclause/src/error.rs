//! Error types for pgclause
//!
//! Two channels with different propagation:
//!
//! - [`SchemaError`]: programmer errors found while constructing a table or
//!   binding receivers. These are fatal; the table should not be used after one.
//! - [`QueryError`]: runtime faults while executing a built query. These are
//!   recoverable and keep the underlying cause available via `source()`.

use crate::value::ValueKind;
use std::fmt::Write as _;
use thiserror::Error;

/// Boxed error used at the driver boundary.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type alias for schema and binding operations
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Result type alias for query execution
pub type QueryResult<T> = Result<T, QueryError>;

/// Schema and binding violations.
///
/// Every variant is non-recoverable: it describes a mismatch between code and
/// schema that must be fixed, not retried.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The model has no fields to derive columns from
    #[error("table model must be a struct with at least one field: {0}")]
    EmptyModel(String),

    /// A model field has no column name for the dialect's schema tag
    #[error("field '{field}' has no '{tag}' column tag")]
    MissingTag { field: String, tag: String },

    /// Two fields map to the same column name
    #[error("column '{0}' is declared more than once")]
    DuplicateColumn(String),

    /// The column is not part of the table
    #[error("no column named {column} found for table {table}, available columns: {available:?}")]
    UnknownColumn {
        table: String,
        column: String,
        available: Vec<String>,
    },

    /// A plain value was supplied where a writable receiver is required
    #[error("receiver for column '{0}' must be a writable receiver, got a value")]
    NotWritable(String),

    /// Receiver or parameter kind does not fit the column
    #[error("invalid type for column '{column}': cannot assign {found} to {expected}")]
    KindMismatch {
        column: String,
        expected: ValueKind,
        found: String,
    },

    /// Build was called with no receivers bound
    #[error("table {0} has no bound receivers to select")]
    NoReceivers(String),

    /// A serialized schema could not be read
    #[error("invalid schema descriptor: {0}")]
    InvalidSchema(String),

    /// Every violation found by a batch binding
    #[error("{}", format_violations(.0))]
    Multiple(Vec<(String, SchemaError)>),
}

fn format_violations(violations: &[(String, SchemaError)]) -> String {
    let mut out = String::new();
    for (column, err) in violations {
        let _ = writeln!(out, "{column}: {err}");
    }
    out
}

impl SchemaError {
    /// Create an unknown-column error
    pub fn unknown_column(
        table: impl Into<String>,
        column: impl Into<String>,
        available: impl IntoIterator<Item = String>,
    ) -> Self {
        Self::UnknownColumn {
            table: table.into(),
            column: column.into(),
            available: available.into_iter().collect(),
        }
    }

    /// Create a kind mismatch error
    pub fn kind_mismatch(
        column: impl Into<String>,
        expected: ValueKind,
        found: impl Into<String>,
    ) -> Self {
        Self::KindMismatch {
            column: column.into(),
            expected,
            found: found.into(),
        }
    }

    /// Schema errors are never recoverable.
    pub fn is_fatal(&self) -> bool {
        true
    }

    /// Check if this is an unknown column error
    pub fn is_unknown_column(&self) -> bool {
        matches!(self, Self::UnknownColumn { .. })
    }

    /// Check if this is a kind mismatch error
    pub fn is_kind_mismatch(&self) -> bool {
        matches!(self, Self::KindMismatch { .. })
    }

    /// Check if this is a non-writable receiver error
    pub fn is_not_writable(&self) -> bool {
        matches!(self, Self::NotWritable(_))
    }

    /// The individual violations carried by this error.
    ///
    /// A single error yields itself; [`SchemaError::Multiple`] yields its entries.
    pub fn violations(&self) -> Vec<&SchemaError> {
        match self {
            Self::Multiple(all) => all.iter().map(|(_, e)| e).collect(),
            other => vec![other],
        }
    }
}

/// Runtime execution faults returned from [`Query::run`](crate::Query::run).
#[derive(Debug, Error)]
pub enum QueryError {
    /// The driver could not execute the statement
    #[error("failed to run query: {source}")]
    Execute {
        #[source]
        source: BoxError,
    },

    /// A row could not be scanned into the receivers
    #[error("failed to scan row {row}: {source}")]
    Scan {
        row: usize,
        #[source]
        source: BoxError,
    },
}

impl QueryError {
    pub fn execute(source: impl Into<BoxError>) -> Self {
        Self::Execute {
            source: source.into(),
        }
    }

    pub fn scan(row: usize, source: impl Into<BoxError>) -> Self {
        Self::Scan {
            row,
            source: source.into(),
        }
    }

    /// Check if this error happened while executing the statement
    pub fn is_execute(&self) -> bool {
        matches!(self, Self::Execute { .. })
    }

    /// Check if this error happened while scanning a row
    pub fn is_scan(&self) -> bool {
        matches!(self, Self::Scan { .. })
    }
}

/// Failure writing one column value into a receiver.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScanError {
    /// SQL NULL reached a receiver without a nullable adapter
    #[error("cannot scan NULL into non-nullable {0} receiver")]
    UnexpectedNull(ValueKind),

    /// The column value has a different kind than the receiver
    #[error("cannot scan {found} into {expected} receiver")]
    KindMismatch {
        expected: ValueKind,
        found: ValueKind,
    },

    /// The cursor handed over a different number of values than receivers
    #[error("expected {expected} column values, got {got}")]
    ColumnCount { expected: usize, got: usize },

    /// Driver-level decode failure
    #[error("decode error: {0}")]
    Decode(String),
}
