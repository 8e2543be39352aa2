//! # Chain Identifiers
//!
//! A [`ChainId`] names one independent MCMC run. Samplers number chains
//! from 1, but identifiers are not required to be contiguous.

use serde::{Deserialize, Serialize};

use crate::error::TableError;

/// Identifier of one MCMC chain. Always a positive integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChainId(u32);

impl ChainId {
    /// Create a chain identifier. Returns `None` for zero.
    pub fn new(id: u32) -> Option<Self> {
        (id > 0).then_some(Self(id))
    }

    /// Interpret a raw table cell as a chain identifier.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::InvalidChain`] unless `value` is a finite,
    /// integral, positive number that fits in `u32`.
    pub fn from_cell(value: f64, row: usize) -> Result<Self, TableError> {
        let valid = value.is_finite() && value.fract() == 0.0 && value >= 1.0;
        if !valid || value > f64::from(u32::MAX) {
            return Err(TableError::InvalidChain { row, value });
        }
        Ok(Self(value as u32))
    }

    /// The numeric identifier.
    pub fn get(self) -> u32 {
        self.0
    }

    /// The identifier as a table cell value.
    pub fn as_cell(self) -> f64 {
        f64::from(self.0)
    }
}

impl Default for ChainId {
    /// Chain 1, the conventional alignment reference.
    fn default() -> Self {
        Self(1)
    }
}

impl std::fmt::Display for ChainId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
