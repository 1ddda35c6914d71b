//! Config CLI commands: write a starter file and show the wallpaper settings
//! in effect.

use std::path::{Path, PathBuf};

use clap::Subcommand;
use colored::Colorize;
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::cli::output;
use crate::config::env::load_api_keys;
use crate::config::template::create_config_file;
use crate::config::{self, WallpaperConfig, config_paths};
use crate::error::BentoError;
use crate::platform::path::expand_and_resolve;
use crate::wallpaper::is_usable_credential;

/// Config subcommands.
#[derive(Subcommand, Debug)]
#[command(next_display_order = None)]
pub enum ConfigCommands {
    /// Write a config file listing every wallpaper option at its default.
    #[command(after_long_help = r#"Examples:
  bento config init                          # Write ~/.config/bento/config.jsonc
  bento config init --path ./bento.jsonc     # Write somewhere else
  bento config init --force                  # Replace an existing file"#)]
    Init {
        /// Replace the file if it already exists.
        #[arg(long, short)]
        force: bool,

        /// Where to write the file.
        #[arg(long, short, value_name = "PATH")]
        path: Option<PathBuf>,
    },

    /// Show the config file in use and the wallpaper settings it resolves to.
    #[command(after_long_help = r#"Examples:
  bento config show          # Table of settings
  bento config show --json   # Machine-readable"#)]
    Show {
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
}

/// Execute config subcommands.
///
/// # Errors
///
/// Returns an error if the file cannot be written or already exists without
/// `--force`.
pub fn execute(cmd: &ConfigCommands) -> Result<(), BentoError> {
    match cmd {
        ConfigCommands::Init { force, path } => {
            let path = path
                .clone()
                .or_else(|| config_paths().into_iter().next())
                .ok_or_else(|| BentoError::ConfigError("No config directory is available.".to_string()))?;

            write_template(&path, *force)?;
            println!("{} {}", "Wrote".green(), path.display());
            println!("Uncomment options to change them; `bento config show` prints what is in effect.");
            Ok(())
        }
        ConfigCommands::Show { json } => {
            let settings = EffectiveSettings::resolve(
                &config::get_config().wallpaper,
                config::get_config_path().map(PathBuf::as_path),
                &config::config_dir(),
            );
            settings.print(*json)
        }
    }
}

fn write_template(path: &Path, force: bool) -> Result<(), BentoError> {
    if path.exists() && !force {
        return Err(BentoError::ConfigError(format!(
            "{} already exists; pass --force to replace it.",
            path.display()
        )));
    }

    create_config_file(path)
        .map_err(|err| BentoError::ConfigError(format!("Cannot write {}: {err}", path.display())))
}

/// Wallpaper settings after defaults, path expansion and key lookup.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EffectiveSettings {
    file: Option<PathBuf>,
    topic: String,
    orientation: String,
    content_filter: String,
    primary_url: String,
    fallback_url: String,
    width: u32,
    height: u32,
    fallback_color: String,
    api_keys_file: Option<PathBuf>,
    api_key_found: bool,
}

#[derive(Tabled)]
struct SettingRow {
    #[tabled(rename = "Setting")]
    name: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

impl EffectiveSettings {
    fn resolve(wallpaper: &WallpaperConfig, file: Option<&Path>, config_dir: &Path) -> Self {
        let api_keys_file = (!wallpaper.api_keys.trim().is_empty())
            .then(|| expand_and_resolve(&wallpaper.api_keys, config_dir));
        let api_key_found = load_api_keys(&wallpaper.api_keys, config_dir)
            .unsplash_access_key
            .as_deref()
            .is_some_and(is_usable_credential);

        Self {
            file: file.map(Path::to_path_buf),
            topic: wallpaper.topic.clone(),
            orientation: wallpaper.orientation.clone(),
            content_filter: wallpaper.content_filter.clone(),
            primary_url: wallpaper.primary_url.clone(),
            fallback_url: wallpaper.fallback_url.clone(),
            width: wallpaper.width,
            height: wallpaper.height,
            fallback_color: wallpaper.fallback_color.clone(),
            api_keys_file,
            api_key_found,
        }
    }

    fn rows(&self) -> Vec<SettingRow> {
        let path_or_dash = |path: &Option<PathBuf>| {
            path.as_ref().map_or_else(|| "-".dimmed().to_string(), |p| p.display().to_string())
        };
        let key_state = if self.api_key_found {
            "found".green().to_string()
        } else {
            "missing".yellow().to_string()
        };

        vec![
            SettingRow { name: "topic", value: self.topic.clone() },
            SettingRow { name: "orientation", value: self.orientation.clone() },
            SettingRow { name: "contentFilter", value: self.content_filter.clone() },
            SettingRow { name: "primaryUrl", value: self.primary_url.clone() },
            SettingRow { name: "fallbackUrl", value: self.fallback_url.clone() },
            SettingRow { name: "size", value: format!("{}x{}", self.width, self.height) },
            SettingRow { name: "fallbackColor", value: self.fallback_color.clone() },
            SettingRow { name: "apiKeys", value: path_or_dash(&self.api_keys_file) },
            SettingRow { name: "UNSPLASH_ACCESS_KEY", value: key_state },
        ]
    }

    fn print(&self, as_json: bool) -> Result<(), BentoError> {
        if as_json {
            output::print_json(&serde_json::to_value(self)?);
            return Ok(());
        }

        match &self.file {
            Some(path) => println!("{} {}", "Config file:".bold(), path.display()),
            None => println!("{} {}", "Config file:".bold(), "none, using defaults".dimmed()),
        }
        println!("{}", Table::new(self.rows()).with(Style::rounded()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::config::load_config_from_path;
    use crate::config::template::generate_config_template;
    use crate::constants::UNSPLASH_KEY_PLACEHOLDER;

    #[test]
    fn test_template_is_written_once_without_force() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.jsonc");

        write_template(&path, false).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), generate_config_template());

        std::fs::write(&path, r#"{ "wallpaper": { "topic": "ocean" } }"#).unwrap();
        assert!(matches!(write_template(&path, false), Err(BentoError::ConfigError(_))));
        assert!(std::fs::read_to_string(&path).unwrap().contains("ocean"));

        write_template(&path, true).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), generate_config_template());
    }

    #[test]
    fn test_defaults_resolve_without_key_file() {
        let temp_dir = TempDir::new().unwrap();
        let settings = EffectiveSettings::resolve(&WallpaperConfig::default(), None, temp_dir.path());

        assert_eq!(settings.file, None);
        assert_eq!(settings.topic, "landscape");
        assert_eq!(settings.api_keys_file, None);
        assert!(!settings.api_key_found);
    }

    #[test]
    fn test_key_file_is_resolved_against_config_dir() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("keys.env"), "UNSPLASH_ACCESS_KEY=abc123\n").unwrap();
        let config = WallpaperConfig { api_keys: "keys.env".to_string(), ..Default::default() };

        let settings = EffectiveSettings::resolve(&config, None, temp_dir.path());

        assert_eq!(settings.api_keys_file, Some(temp_dir.path().join("keys.env")));
        assert!(settings.api_key_found);
    }

    #[test]
    fn test_placeholder_key_counts_as_missing() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join(".env"),
            format!("UNSPLASH_ACCESS_KEY={UNSPLASH_KEY_PLACEHOLDER}\n"),
        )
        .unwrap();
        let config = WallpaperConfig { api_keys: ".env".to_string(), ..Default::default() };

        assert!(!EffectiveSettings::resolve(&config, None, temp_dir.path()).api_key_found);
    }

    #[test]
    fn test_loaded_file_settings_show_up() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.jsonc");
        std::fs::write(
            &path,
            r##"{
              // comment
              "wallpaper": { "topic": "forest", "width": 2560, "height": 1440, "fallbackColor": "#101010" }
            }"##,
        )
        .unwrap();
        let (config, loaded_from) = load_config_from_path(&path).unwrap();

        let settings = EffectiveSettings::resolve(&config.wallpaper, Some(&loaded_from), temp_dir.path());
        let json = serde_json::to_value(&settings).unwrap();

        assert_eq!(json["file"], path.display().to_string());
        assert_eq!(json["topic"], "forest");
        assert_eq!(json["fallbackColor"], "#101010");
        let rows = settings.rows();
        assert!(rows.iter().any(|row| row.name == "size" && row.value == "2560x1440"));
    }
}
