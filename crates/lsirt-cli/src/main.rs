//! # lsirt CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use lsirt_cli::align::{run_align, AlignArgs};
use lsirt_cli::extract::{run_extract, ExtractArgs};

/// Latent-space IRT post-processing.
///
/// Aligns latent person and item coordinates across MCMC chains so that
/// posterior summaries from different chains share one orientation.
#[derive(Parser, Debug)]
#[command(name = "lsirt", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to a run configuration file (YAML).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Align chains onto a reference chain and rewrite the draws table.
    Align(AlignArgs),

    /// Print per-chain posterior-mean coordinates of one family.
    Extract(ExtractArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("lsirt CLI v{} starting", env!("CARGO_PKG_VERSION"));

    let config = cli.config.as_deref();
    let result = match cli.command {
        Commands::Align(args) => run_align(&args, config),
        Commands::Extract(args) => run_extract(&args, config),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
