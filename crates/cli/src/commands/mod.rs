//! Subcommand implementations.
//!
//! Every subcommand loads one snapshot, runs one [`Analysis`] over it, and
//! writes a single JSON document to stdout.

pub mod analyze;
pub mod source;

use std::io::Write;

use serde::Serialize;

pub use analyze::{Analysis, AnalysisOutput};
pub use source::{OrderSource, load_snapshot};

use crate::error::CliError;

/// Write `value` to stdout as pretty-printed JSON.
///
/// # Errors
///
/// Returns `CliError::Encode` if `value` cannot be serialized and
/// `CliError::Output` if stdout cannot be written.
pub fn emit<T: Serialize>(value: &T) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    stdout.flush()?;
    Ok(())
}
