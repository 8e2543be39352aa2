//! # Extract Subcommand
//!
//! Dumps the per-chain posterior-mean coordinates of one parameter family
//! as JSON, without aligning anything. Useful for eyeballing how far
//! chains have drifted apart before running `lsirt align`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use lsirt_align::{extract_coordinates, ChainCoordinates};
use lsirt_core::{ChainId, PARAM_KEY_FORMAT};

use crate::config::RunConfig;
use crate::io::read_draws_csv;

/// Arguments for the `lsirt extract` subcommand.
#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// Path to the draws CSV.
    #[arg(value_name = "DRAWS_CSV")]
    pub draws: PathBuf,

    /// Coordinate family prefix.
    #[arg(long, default_value = "xi")]
    pub prefix: String,

    /// Number of entities in the family.
    #[arg(long)]
    pub entities: usize,

    /// Number of latent dimensions.
    #[arg(long)]
    pub dims: usize,

    /// Name of the chain column [default: from config, else chain].
    #[arg(long)]
    pub chain_column: Option<String>,

    /// Write JSON here instead of stdout.
    #[arg(long, short)]
    pub out: Option<PathBuf>,
}

/// JSON document produced by `lsirt extract`.
#[derive(Debug, Serialize)]
pub struct CoordinateDump {
    /// Column token format of the input.
    pub format: &'static str,
    /// Family prefix.
    pub prefix: String,
    /// Entity count.
    pub entities: usize,
    /// Dimensionality.
    pub dims: usize,
    /// Chain id → rows of mean coordinates.
    pub chains: BTreeMap<ChainId, Vec<Vec<f64>>>,
}

impl CoordinateDump {
    /// Build the dump from extracted coordinates.
    pub fn new(prefix: &str, entities: usize, dims: usize, coords: &ChainCoordinates) -> Self {
        let chains = coords
            .chains()
            .into_iter()
            .filter_map(|chain| coords.rows(chain).map(|rows| (chain, rows)))
            .collect();
        Self {
            format: PARAM_KEY_FORMAT,
            prefix: prefix.to_string(),
            entities,
            dims,
            chains,
        }
    }
}

/// Execute the extract subcommand.
///
/// Returns exit code 0 on success.
pub fn run_extract(args: &ExtractArgs, config: Option<&Path>) -> Result<u8> {
    let chain_column = match (&args.chain_column, config) {
        (Some(column), _) => column.clone(),
        (None, Some(path)) => RunConfig::load(path)?.chain_column_or_default(),
        (None, None) => RunConfig::default().chain_column_or_default(),
    };

    let draws = read_draws_csv(&args.draws, &chain_column)?;
    let coords = extract_coordinates(&draws, args.entities, args.dims, &args.prefix)
        .with_context(|| format!("failed to extract {} coordinates", args.prefix))?;

    let dump = CoordinateDump::new(&args.prefix, args.entities, args.dims, &coords);
    let json = serde_json::to_string_pretty(&dump).context("failed to serialize coordinates")?;

    match &args.out {
        Some(path) => {
            std::fs::write(path, json + "\n")
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("OK: wrote {} chains to {}", coords.len(), path.display());
        }
        None => println!("{json}"),
    }
    Ok(0)
}
