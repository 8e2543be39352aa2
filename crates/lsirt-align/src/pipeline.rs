//! # Alignment Pipeline
//!
//! Runs extraction, joint alignment and rewriting for one
//! [`LatentLayout`]. Each run owns its intermediate maps; nothing is
//! shared between runs.

use serde::{Deserialize, Serialize};

use lsirt_core::{ChainId, DrawsTable};

use crate::align::{Aligner, Alignment};
use crate::error::AlignError;
use crate::extract::extract_coordinates;
use crate::procrustes::ProcrustesOptions;
use crate::rewrite::{rewrite_draws, FamilyPrefixes};

/// One coordinate family: its column prefix and entity count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatentFamily {
    /// Column prefix, e.g. `xi`.
    pub prefix: String,
    /// Number of entities (matrix rows).
    pub count: usize,
}

/// Shape of the latent space shared by persons and items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatentLayout {
    /// Person coordinate family.
    pub persons: LatentFamily,
    /// Item coordinate family.
    pub items: LatentFamily,
    /// Number of latent dimensions `D`.
    pub dims: usize,
}

impl LatentLayout {
    /// Check counts, dimensionality and prefixes.
    ///
    /// # Errors
    ///
    /// [`AlignError::InvalidLayout`] describing the first problem found.
    pub fn validate(&self) -> Result<(), AlignError> {
        if self.dims == 0 {
            return Err(AlignError::InvalidLayout("dims must be at least 1".to_string()));
        }
        for (role, family) in [("persons", &self.persons), ("items", &self.items)] {
            if family.prefix.is_empty() {
                return Err(AlignError::InvalidLayout(format!("{role}: empty prefix")));
            }
            if family.count == 0 {
                return Err(AlignError::InvalidLayout(format!(
                    "{role}: count must be at least 1"
                )));
            }
        }
        if self.persons.prefix == self.items.prefix {
            return Err(AlignError::InvalidLayout(format!(
                "persons and items share the prefix \"{}\"",
                self.persons.prefix
            )));
        }
        Ok(())
    }

    /// The two family prefixes.
    pub fn prefixes(&self) -> FamilyPrefixes {
        FamilyPrefixes {
            persons: self.persons.prefix.clone(),
            items: self.items.prefix.clone(),
        }
    }
}

/// Rewritten draws plus the alignment that produced them.
#[derive(Debug, Clone)]
pub struct AlignedDraws {
    /// Copy of the input with coordinate columns replaced.
    pub draws: DrawsTable,
    /// Aligned per-chain coordinates and diagnostics.
    pub alignment: Alignment,
}

/// Extract, align and rewrite in one call.
///
/// # Errors
///
/// Any error from layout validation, [`extract_coordinates`],
/// [`Aligner::align`] or [`rewrite_draws`].
pub fn align_draws(
    draws: &DrawsTable,
    layout: &LatentLayout,
    reference: ChainId,
    options: ProcrustesOptions,
) -> Result<AlignedDraws, AlignError> {
    layout.validate()?;

    let persons = extract_coordinates(draws, layout.persons.count, layout.dims, &layout.persons.prefix)?;
    let items = extract_coordinates(draws, layout.items.count, layout.dims, &layout.items.prefix)?;

    let alignment = Aligner::new(options).align(&persons, &items, reference)?;
    let rewritten = rewrite_draws(
        draws,
        &alignment.persons,
        &alignment.items,
        layout.dims,
        &layout.prefixes(),
    )?;

    tracing::info!(
        chains = alignment.persons.len(),
        reference = %reference,
        rows = rewritten.n_rows(),
        "aligned draws table"
    );
    Ok(AlignedDraws {
        draws: rewritten,
        alignment,
    })
}
