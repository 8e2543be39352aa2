//! # Alignment Errors
//!
//! Every failure is detected where it originates and returned
//! synchronously. There is no retry and no partial result: a failed
//! extraction or alignment yields no map at all.
//!
//! Numeric degeneracy (rank-deficient or zero-spread configurations) is
//! deliberately absent from this enum. It surfaces only through the
//! disparity diagnostic.

use thiserror::Error;

use lsirt_core::{ChainId, TableError};

/// Errors raised by extraction, alignment and rewriting.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AlignError {
    /// A required coordinate column is absent from the draws table.
    #[error("missing parameter column {prefix}[{entity},{dimension}]")]
    MissingParameter {
        /// Coordinate family prefix.
        prefix: String,
        /// 1-based entity index.
        entity: usize,
        /// 1-based dimension index.
        dimension: usize,
    },

    /// A chain has no draws.
    #[error("chain {0} has no draws")]
    EmptyChain(ChainId),

    /// The reference chain is absent from one or both coordinate maps.
    #[error("reference chain {0} not found in coordinate maps")]
    ReferenceChainNotFound(ChainId),

    /// Person and item maps cover different chains.
    #[error("person chains {persons:?} do not match item chains {items:?}")]
    ChainSetMismatch {
        /// Chains present in the person map.
        persons: Vec<ChainId>,
        /// Chains present in the item map.
        items: Vec<ChainId>,
    },

    /// A coordinate matrix does not have the expected shape.
    #[error("chain {chain}: {what} is {actual_rows}x{actual_cols}, expected {expected_rows}x{expected_cols}")]
    ShapeMismatch {
        /// Chain whose matrix is off.
        chain: ChainId,
        /// Which matrix (e.g. "person coordinates").
        what: &'static str,
        /// Expected row count.
        expected_rows: usize,
        /// Expected column count.
        expected_cols: usize,
        /// Actual row count.
        actual_rows: usize,
        /// Actual column count.
        actual_cols: usize,
    },

    /// Entity count or dimensionality is zero, or a prefix is empty.
    #[error("invalid latent layout: {0}")]
    InvalidLayout(String),

    /// The SVD did not produce the requested singular vectors.
    #[error("singular value decomposition failed for chain {0}")]
    Decomposition(ChainId),

    /// A coordinate matrix holds NaN or an infinite value.
    #[error("chain {chain}: non-finite value in {what}")]
    NonFinite {
        /// Offending chain.
        chain: ChainId,
        /// Which configuration (e.g. "candidate configuration").
        what: &'static str,
    },

    /// Draws table operation failed.
    #[error("draws table error: {0}")]
    Table(#[from] TableError),
}
