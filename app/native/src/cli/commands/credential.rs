//! Credential CLI commands.
//!
//! The stored credential takes precedence over the key in the API keys file.

use std::path::PathBuf;

use clap::Subcommand;
use colored::Colorize;

use super::wallpaper::{Session, block_on};
use crate::error::BentoError;
use crate::store::{CREDENTIAL_KEY, KeyValueStore};
use crate::wallpaper::is_usable_credential;

/// Credential subcommands.
#[derive(Subcommand, Debug)]
#[command(next_display_order = None)]
pub enum CredentialCommands {
    /// Save the primary provider's access key and prepare the next wallpaper.
    #[command(after_long_help = r#"Examples:
  bento credential set abc123     # Save the key and fetch the next wallpaper"#)]
    Set {
        /// Unsplash access key.
        #[arg(value_name = "KEY")]
        key: String,
    },

    /// Remove the stored access key.
    Clear,
}

/// Execute credential subcommands.
///
/// # Errors
///
/// Returns an error if the key is unusable, the store cannot be written, or
/// the next wallpaper cannot be prepared after saving.
pub fn execute(cmd: &CredentialCommands, store_path: Option<PathBuf>) -> Result<(), BentoError> {
    run(cmd, &Session::open(store_path, true)?)
}

fn run(cmd: &CredentialCommands, session: &Session) -> Result<(), BentoError> {
    match cmd {
        CredentialCommands::Set { key } => set_credential(session, key),
        CredentialCommands::Clear => {
            session.store.remove(CREDENTIAL_KEY)?;
            println!("Credential cleared.");
            Ok(())
        }
    }
}

fn set_credential(session: &Session, key: &str) -> Result<(), BentoError> {
    if !is_usable_credential(key) {
        return Err(BentoError::InvalidArguments(
            "The access key is empty or still the placeholder value.".to_string(),
        ));
    }

    session.store.set(CREDENTIAL_KEY, key.trim())?;
    println!("{} Preloading next wallpaper...", "Saved.".green());

    let url = block_on(session.cache.prefetch_next())??;
    println!("Next wallpaper ready: {url}");
    Ok(())
}
