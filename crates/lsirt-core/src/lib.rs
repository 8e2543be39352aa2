//! # lsirt-core: Foundational Types for Latent-Space IRT Post-Processing
//!
//! This crate is the leaf of the workspace DAG. It defines the data
//! contracts shared by the extraction, alignment and rewrite stages:
//! the posterior draws table, chain identifiers, and the parameter
//! column naming convention emitted by the sampler.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for identifiers.** Chains are [`ChainId`], never a
//!    bare integer. Chain values are validated (positive integers) when a
//!    [`DrawsTable`] is built.
//!
//! 2. **Parameter keys are a wire contract.** Column names of the form
//!    `prefix[entity,dimension]` are produced and parsed only through
//!    [`ParamKey`]. The token format is versioned as [`PARAM_KEY_FORMAT`].
//!
//! 3. **Tables are immutable from the caller's view.** Transformations take
//!    `&DrawsTable` and return a new table.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `lsirt-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod chain;
pub mod draws;
pub mod error;
pub mod param;

// Re-export primary types for ergonomic imports.
pub use chain::ChainId;
pub use draws::DrawsTable;
pub use error::{LsirtError, ParamKeyError, TableError};
pub use param::{ParamKey, PARAM_KEY_FORMAT};
