//! Command-line interface for Bento.
//!
//! Every command runs to completion in the foreground; `show` additionally
//! waits for the background refill it starts before the process exits.

mod commands;
mod output;

pub use commands::{Cli, Commands};

use crate::error::BentoError;

/// Runs an already parsed command line.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn run(cli: &Cli) -> Result<(), BentoError> { cli.execute() }
