//! # Chain Coordinate Maps
//!
//! `ChainId → n_entities × D` matrices. Ordered by chain so iteration,
//! logging and serialization are reproducible.

use std::collections::BTreeMap;

use nalgebra::DMatrix;

use lsirt_core::ChainId;

/// Per-chain coordinate matrices for one entity family.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChainCoordinates(BTreeMap<ChainId, DMatrix<f64>>);

impl ChainCoordinates {
    /// An empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace one chain's matrix.
    pub fn insert(&mut self, chain: ChainId, coords: DMatrix<f64>) {
        self.0.insert(chain, coords);
    }

    /// Matrix for one chain.
    pub fn get(&self, chain: ChainId) -> Option<&DMatrix<f64>> {
        self.0.get(&chain)
    }

    /// Whether a chain is present.
    pub fn contains(&self, chain: ChainId) -> bool {
        self.0.contains_key(&chain)
    }

    /// Chains present, ascending.
    pub fn chains(&self) -> Vec<ChainId> {
        self.0.keys().copied().collect()
    }

    /// Number of chains.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the map has no chains.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate `(chain, matrix)` pairs in chain order.
    pub fn iter(&self) -> impl Iterator<Item = (ChainId, &DMatrix<f64>)> {
        self.0.iter().map(|(chain, coords)| (*chain, coords))
    }

    /// One chain's matrix as nested rows, for serialization.
    pub fn rows(&self, chain: ChainId) -> Option<Vec<Vec<f64>>> {
        self.get(chain).map(|m| {
            m.row_iter()
                .map(|row| row.iter().copied().collect())
                .collect()
        })
    }
}

impl FromIterator<(ChainId, DMatrix<f64>)> for ChainCoordinates {
    fn from_iter<I: IntoIterator<Item = (ChainId, DMatrix<f64>)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for ChainCoordinates {
    type Item = (ChainId, DMatrix<f64>);
    type IntoIter = std::collections::btree_map::IntoIter<ChainId, DMatrix<f64>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
