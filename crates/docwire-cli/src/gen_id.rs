//! # Gen-Id Subcommand
//!
//! `docwire gen-id [--kind object_id|uuid] [--count N]` prints identifiers
//! from the same generators the codec uses, one Extended JSON value per line.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use docwire_core::IdGeneratorKind;

/// Arguments for the `docwire gen-id` subcommand.
#[derive(Args, Debug)]
pub struct GenIdArgs {
    /// Generator to use (`object_id` or `uuid`).
    #[arg(long, default_value = "object_id")]
    pub kind: IdGeneratorKind,

    /// Number of identifiers to print.
    #[arg(long, short = 'n', default_value_t = 1)]
    pub count: usize,

    /// Output file. Standard output when omitted.
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

/// Execute the gen-id subcommand.
pub fn run_gen_id(args: &GenIdArgs) -> Result<u8> {
    crate::with_output(args.output.as_deref(), |out| {
        write_ids(args.kind, args.count, out)
    })?;
    tracing::debug!(kind = %args.kind, count = args.count, "generated identifiers");
    Ok(0)
}

/// Generate `count` identifiers of `kind` into `out`.
pub fn write_ids(kind: IdGeneratorKind, count: usize, out: &mut dyn Write) -> Result<()> {
    let generator = kind.build();
    for _ in 0..count {
        let id = generator
            .generate()
            .with_context(|| format!("generating {kind} identifier"))?;
        serde_json::to_writer(&mut *out, &id.to_json()).context("writing identifier")?;
        writeln!(out)?;
    }
    Ok(())
}
