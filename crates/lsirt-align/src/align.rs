//! # Joint Person/Item Alignment
//!
//! Persons and items live in the same latent space, so the rotation that
//! resolves a chain's indeterminacy is shared between them. Each chain's
//! person matrix is stacked on top of its item matrix and the stack is
//! fitted as one rigid configuration onto the reference chain's stack.
//!
//! The reference chain is copied through untouched. Every other chain is
//! fitted independently against the same fixed target, so the result does
//! not depend on the order in which chains are visited.

use nalgebra::DMatrix;
use serde::Serialize;

use lsirt_core::ChainId;

use crate::coords::ChainCoordinates;
use crate::error::AlignError;
use crate::procrustes::{is_finite, procrustes, ProcrustesFailure, ProcrustesOptions};

/// Per-chain fit diagnostics for a non-reference chain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChainDiagnostic {
    /// The aligned chain.
    pub chain: ChainId,
    /// Normalized residual sum of squares against the reference.
    pub disparity: f64,
    /// Uniform scale applied to the chain's configuration.
    pub scale: f64,
    /// Effective rank of the cross-product matrix; below `D` means the
    /// orthogonal map was not uniquely determined.
    pub rank: usize,
}

/// Output of a joint alignment.
#[derive(Debug, Clone, PartialEq)]
pub struct Alignment {
    /// Chain every other chain was mapped onto.
    pub reference: ChainId,
    /// Aligned person coordinates, same chains and shapes as the input.
    pub persons: ChainCoordinates,
    /// Aligned item coordinates, same chains and shapes as the input.
    pub items: ChainCoordinates,
    /// One entry per non-reference chain, in chain order.
    pub diagnostics: Vec<ChainDiagnostic>,
}

/// Joint Procrustes aligner.
#[derive(Debug, Clone, Copy, Default)]
pub struct Aligner {
    options: ProcrustesOptions,
}

impl Aligner {
    /// Create an aligner with the given fit options.
    pub fn new(options: ProcrustesOptions) -> Self {
        Self { options }
    }

    /// Fit options in use.
    pub fn options(&self) -> ProcrustesOptions {
        self.options
    }

    /// Align every chain onto `reference`, jointly over persons and items.
    ///
    /// # Errors
    ///
    /// - [`AlignError::ReferenceChainNotFound`] if either map lacks `reference`.
    /// - [`AlignError::ChainSetMismatch`] if the maps cover different chains.
    /// - [`AlignError::ShapeMismatch`] if a chain's matrices differ in shape
    ///   from the reference chain's, or persons and items disagree on `D`.
    /// - [`AlignError::NonFinite`] if a configuration that must be fitted
    ///   holds NaN or an infinity.
    /// - [`AlignError::Decomposition`] if the SVD fails.
    pub fn align(
        &self,
        persons: &ChainCoordinates,
        items: &ChainCoordinates,
        reference: ChainId,
    ) -> Result<Alignment, AlignError> {
        let (Some(ref_persons), Some(ref_items)) = (persons.get(reference), items.get(reference))
        else {
            return Err(AlignError::ReferenceChainNotFound(reference));
        };
        if persons.chains() != items.chains() {
            return Err(AlignError::ChainSetMismatch {
                persons: persons.chains(),
                items: items.chains(),
            });
        }

        let (n_persons, dims) = ref_persons.shape();
        let n_items = ref_items.nrows();
        check_shape(reference, "item coordinates", ref_items, n_items, dims)?;
        let target = stack(ref_persons, ref_items);
        if persons.len() > 1 {
            check_finite(reference, "reference configuration", &target)?;
        }

        let mut aligned_persons = ChainCoordinates::new();
        let mut aligned_items = ChainCoordinates::new();
        let mut diagnostics = Vec::new();
        aligned_persons.insert(reference, ref_persons.clone());
        aligned_items.insert(reference, ref_items.clone());

        for (chain, chain_persons) in persons.iter() {
            if chain == reference {
                continue;
            }
            let chain_items = items
                .get(chain)
                .ok_or_else(|| AlignError::ChainSetMismatch {
                    persons: persons.chains(),
                    items: items.chains(),
                })?;
            check_shape(chain, "person coordinates", chain_persons, n_persons, dims)?;
            check_shape(chain, "item coordinates", chain_items, n_items, dims)?;

            let candidate = stack(chain_persons, chain_items);
            check_finite(chain, "candidate configuration", &candidate)?;
            let fit = procrustes(&target, &candidate, self.options).map_err(|failure| match failure {
                ProcrustesFailure::Decomposition => AlignError::Decomposition(chain),
                ProcrustesFailure::NonFinite => AlignError::NonFinite {
                    chain,
                    what: "stacked configuration",
                },
                ProcrustesFailure::ShapeMismatch => AlignError::ShapeMismatch {
                    chain,
                    what: "stacked configuration",
                    expected_rows: target.nrows(),
                    expected_cols: target.ncols(),
                    actual_rows: candidate.nrows(),
                    actual_cols: candidate.ncols(),
                },
            })?;

            tracing::info!(
                chain = %chain,
                reference = %reference,
                disparity = fit.disparity,
                scale = fit.scale,
                "aligned chain to reference"
            );
            if fit.rank < dims {
                tracing::warn!(
                    chain = %chain,
                    rank = fit.rank,
                    dims,
                    "rank-deficient configuration; rotation is not unique"
                );
            }

            aligned_persons.insert(chain, fit.aligned.rows(0, n_persons).into_owned());
            aligned_items.insert(chain, fit.aligned.rows(n_persons, n_items).into_owned());
            diagnostics.push(ChainDiagnostic {
                chain,
                disparity: fit.disparity,
                scale: fit.scale,
                rank: fit.rank,
            });
        }

        Ok(Alignment {
            reference,
            persons: aligned_persons,
            items: aligned_items,
            diagnostics,
        })
    }
}

/// Align with default options, returning only the aligned maps.
///
/// # Errors
///
/// See [`Aligner::align`].
pub fn align(
    persons: &ChainCoordinates,
    items: &ChainCoordinates,
    reference: ChainId,
) -> Result<(ChainCoordinates, ChainCoordinates), AlignError> {
    let alignment = Aligner::default().align(persons, items, reference)?;
    Ok((alignment.persons, alignment.items))
}

/// Persons on top, items below.
fn stack(persons: &DMatrix<f64>, items: &DMatrix<f64>) -> DMatrix<f64> {
    let split = persons.nrows();
    DMatrix::from_fn(split + items.nrows(), persons.ncols(), |i, j| {
        if i < split {
            persons[(i, j)]
        } else {
            items[(i - split, j)]
        }
    })
}

fn check_finite(
    chain: ChainId,
    what: &'static str,
    matrix: &DMatrix<f64>,
) -> Result<(), AlignError> {
    if is_finite(matrix) {
        Ok(())
    } else {
        Err(AlignError::NonFinite { chain, what })
    }
}

fn check_shape(
    chain: ChainId,
    what: &'static str,
    matrix: &DMatrix<f64>,
    rows: usize,
    cols: usize,
) -> Result<(), AlignError> {
    if matrix.shape() == (rows, cols) {
        return Ok(());
    }
    Err(AlignError::ShapeMismatch {
        chain,
        what,
        expected_rows: rows,
        expected_cols: cols,
        actual_rows: matrix.nrows(),
        actual_cols: matrix.ncols(),
    })
}
