//! # Draws Rewriting
//!
//! Produces a copy of the draws table in which every coordinate column
//! holds, on each row, the aligned posterior-mean coordinate of that row's
//! chain. Draw-level variability of the coordinates is collapsed to the
//! chain mean; only the mean point is carried into the aligned frame.
//!
//! Columns that are not coordinate columns of the two families, the chain
//! column included, are passed through untouched. Target columns missing
//! from the table are skipped.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use lsirt_core::{ChainId, DrawsTable, ParamKey};

use crate::coords::ChainCoordinates;
use crate::error::AlignError;

/// Column prefixes of the person and item coordinate families.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyPrefixes {
    /// Person coordinate prefix.
    pub persons: String,
    /// Item coordinate prefix.
    pub items: String,
}

impl Default for FamilyPrefixes {
    fn default() -> Self {
        Self {
            persons: "xi".to_string(),
            items: "zt_centered".to_string(),
        }
    }
}

/// Copy `original`, overwriting coordinate columns with aligned chain means.
///
/// # Errors
///
/// [`AlignError::ShapeMismatch`] if a matrix has fewer than `dims` columns.
pub fn rewrite_draws(
    original: &DrawsTable,
    persons: &ChainCoordinates,
    items: &ChainCoordinates,
    dims: usize,
    prefixes: &FamilyPrefixes,
) -> Result<DrawsTable, AlignError> {
    let rows = original.rows_by_chain();
    let mut rewritten = original.clone();

    let person_cells = overwrite_family(
        &mut rewritten,
        &rows,
        &prefixes.persons,
        persons,
        dims,
        "person coordinates",
    )?;
    let item_cells = overwrite_family(
        &mut rewritten,
        &rows,
        &prefixes.items,
        items,
        dims,
        "item coordinates",
    )?;

    tracing::debug!(
        person_columns = person_cells,
        item_columns = item_cells,
        rows = rewritten.n_rows(),
        "rewrote coordinate columns"
    );
    Ok(rewritten)
}

/// Returns the number of `(chain, column)` assignments made.
fn overwrite_family(
    table: &mut DrawsTable,
    rows: &BTreeMap<ChainId, Vec<usize>>,
    prefix: &str,
    coords: &ChainCoordinates,
    dims: usize,
    what: &'static str,
) -> Result<usize, AlignError> {
    let mut assigned = 0;
    for (chain, matrix) in coords.iter() {
        if matrix.ncols() < dims {
            return Err(AlignError::ShapeMismatch {
                chain,
                what,
                expected_rows: matrix.nrows(),
                expected_cols: dims,
                actual_rows: matrix.nrows(),
                actual_cols: matrix.ncols(),
            });
        }
        let Some(chain_rows) = rows.get(&chain) else {
            continue;
        };
        for i in 0..matrix.nrows() {
            for d in 0..dims {
                let name = ParamKey::from_matrix_index(prefix, i, d).column_name();
                if !table.has_column(&name) {
                    continue;
                }
                table.fill_rows(&name, chain_rows, matrix[(i, d)])?;
                assigned += 1;
            }
        }
    }
    Ok(assigned)
}
