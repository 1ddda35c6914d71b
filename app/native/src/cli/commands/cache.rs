//! Cache CLI commands.

use clap::Subcommand;

use crate::cache;
use crate::error::BentoError;

/// Cache subcommands for managing downloaded wallpapers.
#[derive(Subcommand, Debug)]
#[command(next_display_order = None)]
pub enum CacheCommands {
    /// Clear the cache directory.
    ///
    /// Removes downloaded wallpapers and rendered fallback images. The
    /// wallpaper slots are kept; images are downloaded again when needed.
    #[command(after_long_help = r#"Examples:
  bento cache clear   # Clear all cached data"#)]
    Clear,

    /// Show the cache directory location.
    #[command(after_long_help = r#"Examples:
  bento cache path    # Print the cache directory path"#)]
    Path,
}

/// Execute cache subcommands.
///
/// # Errors
///
/// Returns an error if the cache directory cannot be cleared.
pub fn execute(cmd: &CacheCommands) -> Result<(), BentoError> {
    match cmd {
        CacheCommands::Clear => {
            let cache_dir = cache::get_cache_dir();
            if !cache_dir.exists() {
                println!("Cache directory does not exist. Nothing to clear.");
                return Ok(());
            }

            let bytes_freed = cache::clear_cache()
                .map_err(|err| BentoError::CacheError(format!("Failed to clear cache: {err}")))?;
            println!("Cache cleared successfully. Freed {}.", cache::format_bytes(bytes_freed));
        }
        CacheCommands::Path => {
            println!("{}", cache::get_cache_dir().display());
        }
    }

    Ok(())
}
