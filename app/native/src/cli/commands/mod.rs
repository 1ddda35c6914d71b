//! CLI command definitions using Clap.
//!
//! Commands are organized into submodules:
//!
//! - `cache` - Downloaded image cache commands
//! - `config_cmd` - Configuration file commands
//! - `credential` - Stored provider credential commands
//! - `wallpaper` - Display, refill and inspection of the wallpaper slots

use std::io;
use std::path::PathBuf;

use clap::{ArgAction, CommandFactory, Parser, Subcommand};
use clap_complete::{Generator, Shell, generate};

use crate::error::BentoError;
use crate::platform::path::expand;
use crate::{config, schema};

pub mod cache;
pub mod config_cmd;
pub mod credential;
pub mod wallpaper;

pub use cache::CacheCommands;
pub use config_cmd::ConfigCommands;
pub use credential::CredentialCommands;

/// Application version from Cargo.toml.
const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Bento - a double-buffered wallpaper cache for your desktop.
///
/// Running `bento` with no command shows a wallpaper and prepares the next one.
#[derive(Parser, Debug)]
#[command(name = "bento")]
#[command(author, version = APP_VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to a custom configuration file.
    ///
    /// Overrides the default configuration file search paths.
    /// Supports JSONC format (JSON with comments).
    #[arg(long, short, global = true, value_name = "PATH")]
    pub config: Option<String>,

    /// Path to the slot store file.
    ///
    /// Defaults to `<data dir>/bento/store.json`.
    #[arg(long, global = true, value_name = "PATH", env = "BENTO_STORE")]
    pub store: Option<String>,

    /// Log more detail to stderr. Repeat for trace output.
    #[arg(long, short, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
#[command(next_display_order = None)]
pub enum Commands {
    /// Show a wallpaper and prepare the next one.
    ///
    /// Shows the prepared wallpaper if there is one, otherwise the current
    /// one, otherwise fetches a new one. Falls back to a solid color when no
    /// image can be shown. The next wallpaper is fetched before exiting.
    #[command(after_long_help = r#"Examples:
  bento show            # Set the desktop wallpaper
  bento show --print    # Print the display command instead"#)]
    Show {
        /// Print `image <url>` or `fallback <color>` instead of setting the
        /// desktop wallpaper.
        #[arg(long, short)]
        print: bool,
    },

    /// Fetch and store the next wallpaper now.
    Refill,

    /// Print a new wallpaper URL from the provider chain.
    Fetch {
        /// Topic to search for. Defaults to the configured topic.
        #[arg(long, short)]
        topic: Option<String>,
    },

    /// Check that a URL loads as an image.
    ///
    /// Exits with status 1 if the image cannot be fetched or decoded.
    Preload {
        /// Image URL to check.
        #[arg(value_name = "URL")]
        url: String,
    },

    /// Show the wallpaper slots and credential state.
    Status {
        /// Output as JSON.
        #[arg(long, short)]
        json: bool,
    },

    /// Stored provider credential commands.
    #[command(subcommand)]
    Credential(CredentialCommands),

    /// Downloaded image cache commands.
    ///
    /// Manage the directory where wallpapers are downloaded.
    #[command(subcommand)]
    Cache(CacheCommands),

    /// Configuration file commands.
    ///
    /// Write a starter config file or show the settings in effect.
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Output Bento configuration JSON Schema.
    ///
    /// Outputs a JSON Schema to stdout that describes the structure of the
    /// Bento configuration file. Can be redirected to a file for use with
    /// editors that support JSON Schema validation.
    Schema,

    /// Generate shell completions.
    ///
    /// Outputs shell completion script to stdout for the specified shell.
    ///
    /// Usage:
    ///   eval "$(bento completions --shell zsh)"
    ///   bento completions --shell fish > ~/.config/fish/completions/bento.fish
    Completions {
        /// The shell to generate completions for.
        #[arg(long, short, value_enum)]
        shell: Shell,
    },
}

impl Cli {
    /// Returns the custom store path if specified via `--store`.
    #[must_use]
    pub fn store_path(&self) -> Option<PathBuf> {
        self.store.as_deref().map(expand).filter(|p| !p.as_os_str().is_empty())
    }

    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command execution fails.
    pub fn execute(&self) -> Result<(), BentoError> {
        if let Some(ref path) = self.config {
            let path_buf = expand(path);
            if !path_buf.exists() {
                return Err(BentoError::ConfigError(format!(
                    "Configuration file not found: {path}"
                )));
            }
            config::set_custom_config_path(path_buf);
        }

        let store = self.store_path();

        match &self.command {
            None => wallpaper::show(store, false),
            Some(Commands::Show { print }) => wallpaper::show(store, *print),
            Some(Commands::Refill) => wallpaper::refill(store),
            Some(Commands::Fetch { topic }) => wallpaper::fetch(store, topic.as_deref()),
            Some(Commands::Preload { url }) => wallpaper::preload(store, url),
            Some(Commands::Status { json }) => wallpaper::status(store, *json),
            Some(Commands::Credential(cmd)) => credential::execute(cmd, store),
            Some(Commands::Cache(cmd)) => cache::execute(cmd),
            Some(Commands::Config(cmd)) => config_cmd::execute(cmd),

            Some(Commands::Schema) => {
                println!("{}", schema::print_schema());
                Ok(())
            }

            Some(Commands::Completions { shell }) => {
                Self::print_completions(*shell);
                Ok(())
            }
        }
    }

    /// Print shell completions to stdout.
    fn print_completions<G: Generator>(generator: G) {
        let mut cmd = Self::command();
        generate(generator, &mut cmd, "bento", &mut io::stdout());
    }
}
