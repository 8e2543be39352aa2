//! # lsirt-cli: Command-Line Driver
//!
//! Provides the `lsirt` binary: the file-level wrapper around the
//! extraction → alignment → rewrite pipeline of `lsirt-align`.
//!
//! ## Subcommands
//!
//! - `lsirt align`: align a draws table across chains and write the
//!   rewritten table (plus an optional JSON diagnostics report).
//! - `lsirt extract`: dump per-chain posterior-mean coordinates of one
//!   parameter family as JSON.
//!
//! ```bash
//! lsirt align results/ls-lnrt/draws.csv --out results/ls-lnrt/draws_aligned.csv \
//!     --config run.yaml --report results/ls-lnrt/alignment.json
//! lsirt extract draws.csv --prefix xi --entities 120 --dims 2
//! ```
//!
//! ## Crate Policy
//!
//! - Argument parsing lives in the subcommand modules; numerical work is
//!   delegated to `lsirt-align`.
//! - Handlers return an exit code; `main` maps errors to exit code 1.

pub mod align;
pub mod config;
pub mod extract;
pub mod io;
