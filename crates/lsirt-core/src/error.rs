//! # Error Hierarchy
//!
//! Structured error types for the core data contracts, built with
//! `thiserror`. Each variant carries enough context (column name, row,
//! offending value) for an operator to locate the problem in the
//! sampler output without re-running anything.

use thiserror::Error;

/// Top-level error type for the core crate.
#[derive(Error, Debug)]
pub enum LsirtError {
    /// Draws table construction or lookup failure.
    #[error("draws table error: {0}")]
    Table(#[from] TableError),

    /// Parameter column token could not be parsed.
    #[error("parameter key error: {0}")]
    ParamKey(#[from] ParamKeyError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised while building or querying a [`DrawsTable`](crate::DrawsTable).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TableError {
    /// The designated chain column is not among the table's columns.
    #[error("chain column \"{0}\" not found")]
    MissingChainColumn(String),

    /// Two columns share the same name.
    #[error("duplicate column \"{0}\"")]
    DuplicateColumn(String),

    /// A column's length differs from the first column's length.
    #[error("column \"{column}\" has {actual} rows, expected {expected}")]
    RaggedColumn {
        /// The offending column.
        column: String,
        /// Row count of the first column.
        expected: usize,
        /// Row count of the offending column.
        actual: usize,
    },

    /// A chain value is not a positive integer.
    #[error("invalid chain identifier {value} at row {row} (expected a positive integer)")]
    InvalidChain {
        /// Zero-based row index.
        row: usize,
        /// The raw value found in the chain column.
        value: f64,
    },

    /// The named column does not exist.
    #[error("column \"{0}\" not found")]
    UnknownColumn(String),

    /// The chain column cannot be overwritten.
    #[error("column \"{0}\" is the chain column and cannot be overwritten")]
    ReadOnlyColumn(String),
}

/// Errors raised while parsing a `prefix[entity,dimension]` token.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParamKeyError {
    /// The token does not follow the `prefix[i,d]` shape.
    #[error("malformed parameter key \"{0}\" (expected <prefix>[<entity>,<dimension>])")]
    Malformed(String),

    /// An index is zero; sampler indices are 1-based.
    #[error("parameter key \"{0}\" uses a zero index (indices are 1-based)")]
    ZeroIndex(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lsirt_error_table_display() {
        let err = LsirtError::Table(TableError::MissingChainColumn("chain__".to_string()));
        let msg = format!("{err}");
        assert!(msg.contains("draws table error"));
        assert!(msg.contains("chain__"));
    }

    #[test]
    fn lsirt_error_param_key_display() {
        let err = LsirtError::from(ParamKeyError::Malformed("xi(1,2)".to_string()));
        assert!(format!("{err}").contains("xi(1,2)"));
    }

    #[test]
    fn ragged_column_reports_both_lengths() {
        let err = TableError::RaggedColumn {
            column: "xi[1,1]".to_string(),
            expected: 4,
            actual: 3,
        };
        let msg = format!("{err}");
        assert!(msg.contains("xi[1,1]"));
        assert!(msg.contains('4'));
        assert!(msg.contains('3'));
    }

    #[test]
    fn invalid_chain_reports_row_and_value() {
        let err = TableError::InvalidChain { row: 7, value: 1.5 };
        let msg = format!("{err}");
        assert!(msg.contains("row 7"));
        assert!(msg.contains("1.5"));
    }

    #[test]
    fn zero_index_mentions_one_based() {
        let err = ParamKeyError::ZeroIndex("xi[0,1]".to_string());
        assert!(format!("{err}").contains("1-based"));
    }
}
