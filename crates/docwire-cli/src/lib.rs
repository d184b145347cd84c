//! # docwire-cli — Document Encoding Command-Line Interface
//!
//! Thin clap front end over `docwire-codec`. Each subcommand lives in its
//! own module as an `Args` struct plus a `run_*` handler returning the
//! process exit code.
//!
//! ## Subcommands
//!
//! - `encode`: JSON or NDJSON documents in, identifier-first binary out
//! - `gen-id`: print freshly generated identifiers as Extended JSON
//!
//! ## Crate Policy
//!
//! - Argument parsing is separated from the work; handlers write to any
//!   `io::Write` so they can be tested without a terminal.
//! - Encoding rules live in `docwire-codec`, not here.
//! - Domain failures are converted into `DocwireError` before `anyhow`
//!   context is attached, so the exit code can be chosen from the error kind.

pub mod encode;
pub mod gen_id;

use std::io::{self, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use docwire_core::DocwireError;

/// Exit code for a failed command.
pub const EXIT_FAILURE: u8 = 1;
/// Exit code when the codec configuration is unusable.
pub const EXIT_CONFIGURATION: u8 = 2;

/// Map a handler error to the process exit code.
pub fn exit_code(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<DocwireError>() {
        Some(DocwireError::Configuration(_)) => EXIT_CONFIGURATION,
        _ => EXIT_FAILURE,
    }
}

/// Run `f` against the file at `path`, or standard output when `None`.
pub(crate) fn with_output<T>(
    path: Option<&Path>,
    f: impl FnOnce(&mut dyn Write) -> Result<T>,
) -> Result<T> {
    match path {
        Some(path) => {
            let file = std::fs::File::create(path)
                .map_err(DocwireError::from)
                .with_context(|| format!("creating output file {}", path.display()))?;
            let mut out = BufWriter::new(file);
            let value = f(&mut out)?;
            out.flush()
                .map_err(DocwireError::from)
                .with_context(|| format!("writing output file {}", path.display()))?;
            Ok(value)
        }
        None => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            let value = f(&mut out)?;
            out.flush()
                .map_err(DocwireError::from)
                .context("writing standard output")?;
            Ok(value)
        }
    }
}
