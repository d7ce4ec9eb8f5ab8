//! # docvault CLI entry point
//!
//! Parses arguments, sets up tracing from `-v`, and dispatches to the
//! subcommand handlers on a single-threaded Tokio runtime.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use docvault_cli::blob::{run_blob, BlobArgs};
use docvault_cli::orphans::{run_orphans, OrphansArgs};

/// docvault operator CLI.
///
/// Works directly against a filesystem blob store and, for `orphans`, the
/// PostgreSQL document index.
#[derive(Parser, Debug)]
#[command(name = "docvault", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Put, get, and verify blobs.
    Blob(BlobArgs),

    /// List stored blobs that no document record references.
    Orphans(OrphansArgs),
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

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            tracing::error!("failed to start async runtime: {e}");
            return ExitCode::from(1);
        }
    };

    let result = runtime.block_on(async {
        match &cli.command {
            Commands::Blob(args) => run_blob(args).await,
            Commands::Orphans(args) => run_orphans(args).await,
        }
    });

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
