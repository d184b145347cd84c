//! # docwire CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use docwire_cli::encode::{run_encode, EncodeArgs};
use docwire_cli::gen_id::{run_gen_id, GenIdArgs};

/// docwire: identifier-first document encoding.
///
/// Encodes JSON documents into BSON-compatible bytes with `_id` written
/// first, generating identifiers for documents that lack one.
#[derive(Parser, Debug)]
#[command(name = "docwire", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    /// Ignored when RUST_LOG is set.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Encode JSON documents through the collectible codec.
    Encode(EncodeArgs),

    /// Print freshly generated document identifiers.
    GenId(GenIdArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    });

    // Diagnostics go to stderr so binary output on stdout stays clean.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Encode(args) => run_encode(&args),
        Commands::GenId(args) => run_gen_id(&args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(docwire_cli::exit_code(&e))
        }
    }
}
