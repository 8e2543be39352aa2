//! # lsirt-align: Cross-Chain Latent-Space Alignment
//!
//! Latent-space models are identified only up to rotation, reflection and
//! scale, so independent MCMC chains settle into differently oriented
//! copies of the same geometry. This crate puts every chain into the frame
//! of one reference chain:
//!
//! - **Extraction** (`extract.rs`): draws table → per-chain matrices of
//!   posterior-mean coordinates for one parameter family.
//!
//! - **Procrustes** (`procrustes.rs`): optimal orthogonal (+ uniform scale)
//!   map of one configuration onto another, with disparity.
//!
//! - **Alignment** (`align.rs`): persons and items stacked into one rigid
//!   configuration per chain and aligned jointly to the reference chain.
//!
//! - **Rewrite** (`rewrite.rs`): a copy of the draws table with each
//!   chain's coordinate columns replaced by its aligned means.
//!
//! - **Pipeline** (`pipeline.rs`): the three stages above for one
//!   [`LatentLayout`].
//!
//! ## Data Flow
//!
//! ```text
//! DrawsTable ──extract──▶ ChainCoordinates (persons, items)
//!                               │
//!                             align ──▶ Alignment (aligned maps + diagnostics)
//!                               │
//! DrawsTable ◀──rewrite─────────┘
//! ```
//!
//! No stage mutates its inputs and none depends on another's internals.

pub mod align;
pub mod coords;
pub mod error;
pub mod extract;
pub mod pipeline;
pub mod procrustes;
pub mod rewrite;

pub use align::{align, Aligner, Alignment, ChainDiagnostic};
pub use coords::ChainCoordinates;
pub use error::AlignError;
pub use extract::extract_coordinates;
pub use pipeline::{align_draws, AlignedDraws, LatentFamily, LatentLayout};
pub use procrustes::{procrustes, ProcrustesFit, ProcrustesOptions};
pub use rewrite::{rewrite_draws, FamilyPrefixes};
