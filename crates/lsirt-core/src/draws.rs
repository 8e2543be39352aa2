//! # Posterior Draws Table
//!
//! Row-per-draw, column-per-scalar-parameter table as produced by the
//! external sampler. One designated column carries the chain identifier of
//! each draw; every other column is an opaque `f64` parameter sample.
//!
//! Values are stored column-major: per-chain means and per-chain
//! overwrites both walk one column at a time.
//!
//! ## Invariants
//!
//! - Column names are unique and all columns have the same length.
//! - The chain column exists and every value in it is a valid [`ChainId`].
//! - The chain column cannot be overwritten through [`DrawsTable::fill_rows`],
//!   so the cached per-row chain identifiers never go stale.

use std::collections::{BTreeMap, HashMap};

use crate::chain::ChainId;
use crate::error::TableError;

/// In-memory posterior draws table.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawsTable {
    names: Vec<String>,
    columns: Vec<Vec<f64>>,
    index: HashMap<String, usize>,
    chain_position: usize,
    chains: Vec<ChainId>,
}

impl DrawsTable {
    /// Build a table from named columns, in order.
    ///
    /// # Errors
    ///
    /// - [`TableError::DuplicateColumn`] if two columns share a name.
    /// - [`TableError::RaggedColumn`] if column lengths differ.
    /// - [`TableError::MissingChainColumn`] if `chain_column` is absent.
    /// - [`TableError::InvalidChain`] if a chain value is not a positive integer.
    pub fn new(
        chain_column: &str,
        columns: impl IntoIterator<Item = (String, Vec<f64>)>,
    ) -> Result<Self, TableError> {
        let mut names = Vec::new();
        let mut values = Vec::new();
        let mut index = HashMap::new();

        for (name, column) in columns {
            if index.contains_key(&name) {
                return Err(TableError::DuplicateColumn(name));
            }
            if let Some(first) = values.first().map(Vec::len) {
                if column.len() != first {
                    return Err(TableError::RaggedColumn {
                        column: name,
                        expected: first,
                        actual: column.len(),
                    });
                }
            }
            index.insert(name.clone(), names.len());
            names.push(name);
            values.push(column);
        }

        let chain_position = *index
            .get(chain_column)
            .ok_or_else(|| TableError::MissingChainColumn(chain_column.to_string()))?;
        let chains = values[chain_position]
            .iter()
            .enumerate()
            .map(|(row, &cell)| ChainId::from_cell(cell, row))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            names,
            columns: values,
            index,
            chain_position,
            chains,
        })
    }

    /// Name of the chain identifier column.
    pub fn chain_column(&self) -> &str {
        &self.names[self.chain_position]
    }

    /// Number of draws (rows).
    pub fn n_rows(&self) -> usize {
        self.chains.len()
    }

    /// Number of columns, chain column included.
    pub fn n_columns(&self) -> usize {
        self.names.len()
    }

    /// Column names in table order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Whether a column with this name exists.
    pub fn has_column(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Values of one column, if present.
    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.index.get(name).map(|&i| self.columns[i].as_slice())
    }

    /// Chain identifier of each row, in row order.
    pub fn row_chains(&self) -> &[ChainId] {
        &self.chains
    }

    /// Distinct chain identifiers, ascending.
    pub fn chain_ids(&self) -> Vec<ChainId> {
        self.rows_by_chain().into_keys().collect()
    }

    /// Row indices grouped by chain.
    pub fn rows_by_chain(&self) -> BTreeMap<ChainId, Vec<usize>> {
        let mut groups: BTreeMap<ChainId, Vec<usize>> = BTreeMap::new();
        for (row, chain) in self.chains.iter().enumerate() {
            groups.entry(*chain).or_default().push(row);
        }
        groups
    }

    /// Cell values of one row, in column order.
    pub fn row(&self, row: usize) -> impl Iterator<Item = f64> + '_ {
        self.columns.iter().map(move |column| column[row])
    }

    /// Arithmetic mean of a column over the given rows.
    ///
    /// Accumulated as offsets from the first value, so a constant column
    /// averages to exactly that constant. A non-finite first value falls
    /// back to a plain sum.
    ///
    /// Returns `None` when the column is absent or `rows` is empty.
    pub fn column_mean(&self, name: &str, rows: &[usize]) -> Option<f64> {
        let column = self.column(name)?;
        let pivot = column[*rows.first()?];
        if !pivot.is_finite() {
            let total: f64 = rows.iter().map(|&r| column[r]).sum();
            return Some(total / rows.len() as f64);
        }
        let offset: f64 = rows.iter().map(|&r| column[r] - pivot).sum();
        Some(pivot + offset / rows.len() as f64)
    }

    /// Overwrite `name` with `value` on every listed row.
    ///
    /// # Errors
    ///
    /// [`TableError::UnknownColumn`] if the column does not exist,
    /// [`TableError::ReadOnlyColumn`] if it is the chain column.
    pub fn fill_rows(&mut self, name: &str, rows: &[usize], value: f64) -> Result<(), TableError> {
        let position = *self
            .index
            .get(name)
            .ok_or_else(|| TableError::UnknownColumn(name.to_string()))?;
        if position == self.chain_position {
            return Err(TableError::ReadOnlyColumn(name.to_string()));
        }
        let column = &mut self.columns[position];
        for &row in rows {
            column[row] = value;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DrawsTable {
        DrawsTable::new(
            "chain",
            vec![
                ("lp__".to_string(), vec![-1.0, -2.0, -3.0, -4.0]),
                ("chain".to_string(), vec![2.0, 1.0, 2.0, 1.0]),
                ("xi[1,1]".to_string(), vec![1.0, 2.0, 3.0, 4.0]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn keeps_column_order_and_shape() {
        let table = sample();
        assert_eq!(table.n_rows(), 4);
        assert_eq!(table.n_columns(), 3);
        let names: Vec<_> = table.column_names().collect();
        assert_eq!(names, ["lp__", "chain", "xi[1,1]"]);
        assert_eq!(table.chain_column(), "chain");
    }

    #[test]
    fn groups_rows_by_chain() {
        let table = sample();
        let groups = table.rows_by_chain();
        assert_eq!(groups[&ChainId::new(1).unwrap()], vec![1, 3]);
        assert_eq!(groups[&ChainId::new(2).unwrap()], vec![0, 2]);
        assert_eq!(
            table.chain_ids(),
            vec![ChainId::new(1).unwrap(), ChainId::new(2).unwrap()]
        );
    }

    #[test]
    fn column_mean_over_rows() {
        let table = sample();
        assert_eq!(table.column_mean("xi[1,1]", &[1, 3]), Some(3.0));
        assert_eq!(table.column_mean("xi[1,1]", &[]), None);
        assert_eq!(table.column_mean("xi[9,9]", &[0]), None);
    }

    #[test]
    fn column_mean_keeps_infinities() {
        let table = DrawsTable::new(
            "chain",
            vec![
                ("chain".to_string(), vec![1.0, 1.0, 1.0]),
                ("up".to_string(), vec![f64::INFINITY; 3]),
                ("down".to_string(), vec![2.0, f64::NEG_INFINITY, 4.0]),
                ("mixed".to_string(), vec![f64::INFINITY, f64::NEG_INFINITY, 1.0]),
            ],
        )
        .unwrap();
        let rows = [0, 1, 2];
        assert_eq!(table.column_mean("up", &rows), Some(f64::INFINITY));
        assert_eq!(table.column_mean("down", &rows), Some(f64::NEG_INFINITY));
        assert!(table.column_mean("mixed", &rows).unwrap().is_nan());
    }

    #[test]
    fn row_yields_cells_in_column_order() {
        let row: Vec<f64> = sample().row(2).collect();
        assert_eq!(row, vec![-3.0, 2.0, 3.0]);
    }

    #[test]
    fn fill_rows_overwrites_only_listed_rows() {
        let mut table = sample();
        table.fill_rows("xi[1,1]", &[0, 2], 9.5).unwrap();
        assert_eq!(table.column("xi[1,1]").unwrap(), &[9.5, 2.0, 9.5, 4.0]);
    }

    #[test]
    fn fill_rows_protects_chain_column() {
        let mut table = sample();
        assert_eq!(
            table.fill_rows("chain", &[0], 7.0),
            Err(TableError::ReadOnlyColumn("chain".to_string()))
        );
        assert!(matches!(
            table.fill_rows("nope", &[0], 7.0),
            Err(TableError::UnknownColumn(_))
        ));
    }

    #[test]
    fn rejects_missing_chain_column() {
        let err = DrawsTable::new("chain__", vec![("chain".to_string(), vec![1.0])]).unwrap_err();
        assert_eq!(err, TableError::MissingChainColumn("chain__".to_string()));
    }

    #[test]
    fn rejects_duplicate_and_ragged_columns() {
        let dup = DrawsTable::new(
            "chain",
            vec![
                ("chain".to_string(), vec![1.0]),
                ("chain".to_string(), vec![1.0]),
            ],
        );
        assert!(matches!(dup, Err(TableError::DuplicateColumn(_))));

        let ragged = DrawsTable::new(
            "chain",
            vec![
                ("chain".to_string(), vec![1.0, 1.0]),
                ("a".to_string(), vec![1.0]),
            ],
        );
        assert!(matches!(ragged, Err(TableError::RaggedColumn { .. })));
    }

    #[test]
    fn rejects_non_integer_chain() {
        let err = DrawsTable::new("chain", vec![("chain".to_string(), vec![1.0, 0.5])]).unwrap_err();
        assert_eq!(err, TableError::InvalidChain { row: 1, value: 0.5 });
    }

    #[test]
    fn empty_table_is_valid() {
        let table = DrawsTable::new("chain", vec![("chain".to_string(), Vec::new())]).unwrap();
        assert_eq!(table.n_rows(), 0);
        assert!(table.chain_ids().is_empty());
    }
}
