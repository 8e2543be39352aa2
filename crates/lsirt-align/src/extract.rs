//! # Coordinate Extraction
//!
//! Collapses a draws table into per-chain posterior-mean coordinate
//! matrices for one parameter family.
//!
//! The full expected column set is validated before any mean is
//! computed, so a schema mismatch between the sampler output and the
//! caller's layout fails fast with the first absent column.

use nalgebra::DMatrix;

use lsirt_core::{DrawsTable, ParamKey};

use crate::coords::ChainCoordinates;
use crate::error::AlignError;

/// Extract per-chain mean coordinates for `prefix[1..=n_entities, 1..=dims]`.
///
/// # Errors
///
/// - [`AlignError::InvalidLayout`] if `n_entities` or `dims` is zero.
/// - [`AlignError::MissingParameter`] for the first absent column.
/// - [`AlignError::EmptyChain`] if a chain has no draws.
pub fn extract_coordinates(
    draws: &DrawsTable,
    n_entities: usize,
    dims: usize,
    prefix: &str,
) -> Result<ChainCoordinates, AlignError> {
    if n_entities == 0 || dims == 0 {
        return Err(AlignError::InvalidLayout(format!(
            "{prefix}: need at least one entity and one dimension, got {n_entities}x{dims}"
        )));
    }

    let mut columns = Vec::with_capacity(n_entities * dims);
    for entity in 1..=n_entities {
        for dimension in 1..=dims {
            let name = ParamKey::new(prefix, entity, dimension).column_name();
            if !draws.has_column(&name) {
                return Err(AlignError::MissingParameter {
                    prefix: prefix.to_string(),
                    entity,
                    dimension,
                });
            }
            columns.push(name);
        }
    }

    let mut coords = ChainCoordinates::new();
    for (chain, rows) in draws.rows_by_chain() {
        if rows.is_empty() {
            return Err(AlignError::EmptyChain(chain));
        }
        let mut matrix = DMatrix::zeros(n_entities, dims);
        for (k, name) in columns.iter().enumerate() {
            let mean = draws
                .column_mean(name, &rows)
                .ok_or(AlignError::EmptyChain(chain))?;
            matrix[(k / dims, k % dims)] = mean;
        }
        coords.insert(chain, matrix);
    }

    tracing::debug!(
        prefix,
        chains = coords.len(),
        columns = columns.len(),
        "extracted per-chain mean coordinates"
    );
    Ok(coords)
}
