//! Configuration types for Bento.
//!
//! The configuration file supports JSONC format (JSON with comments).
//! Both single-line (`//`) and multi-line (`/* */`) comments are allowed.

use std::fs;
use std::path::{Path, PathBuf};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{APP_DIR_NAME, DEFAULT_FALLBACK_COLOR};

/// Name of the configuration file inside the config directories.
const CONFIG_FILE_NAME: &str = "config.jsonc";

/// Wallpaper cache configuration.
///
/// Example:
/// ```json
/// {
///   "wallpaper": {
///     "topic": "mountains",
///     "apiKeys": "~/.config/bento/.env",
///     "fallbackColor": "#0b1220"
///   }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct WallpaperConfig {
    /// Search topic sent to the primary provider.
    pub topic: String,

    /// Photo orientation requested from the primary provider.
    pub orientation: String,

    /// Content safety filter requested from the primary provider ("low" or "high").
    pub content_filter: String,

    /// Path to a `.env` file containing `UNSPLASH_ACCESS_KEY`.
    /// Relative paths are resolved against the config file's directory.
    /// A credential saved with `bento credential set` takes precedence.
    pub api_keys: String,

    /// Base URL of the primary (Unsplash) API.
    pub primary_url: String,

    /// Base URL of the secondary (Picsum) image service.
    pub fallback_url: String,

    /// Width in pixels requested from the secondary provider and used for
    /// the rendered fallback image.
    pub width: u32,

    /// Height in pixels requested from the secondary provider and used for
    /// the rendered fallback image.
    pub height: u32,

    /// Solid color shown when no image can be displayed, as `#rrggbb`.
    pub fallback_color: String,
}

impl Default for WallpaperConfig {
    fn default() -> Self {
        Self {
            topic: "landscape".to_string(),
            orientation: "landscape".to_string(),
            content_filter: "high".to_string(),
            api_keys: String::new(),
            primary_url: "https://api.unsplash.com".to_string(),
            fallback_url: "https://picsum.photos".to_string(),
            width: 1920,
            height: 1080,
            fallback_color: DEFAULT_FALLBACK_COLOR.to_string(),
        }
    }
}

impl WallpaperConfig {
    /// Returns the fallback color as RGB, or the default color if the
    /// configured value does not parse.
    #[must_use]
    pub fn fallback_rgb(&self) -> [u8; 3] {
        parse_hex_color(&self.fallback_color)
            .or_else(|| parse_hex_color(DEFAULT_FALLBACK_COLOR))
            .unwrap_or([0, 0, 0])
    }
}

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct BentoConfig {
    /// JSON Schema reference for editor support.
    #[serde(rename = "$schema", skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Wallpaper cache configuration.
    pub wallpaper: WallpaperConfig,
}

/// Errors that can occur when loading the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No configuration file was found in any of the expected locations.
    #[error(
        "No configuration file found. Expected at ~/.config/bento/config.jsonc or ~/.bento.jsonc"
    )]
    NotFound,
    /// The configuration file exists but could not be read.
    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),
    /// The configuration file contains invalid JSON.
    #[error("Failed to parse configuration file: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// Returns the possible configuration file paths in priority order.
///
/// 1. `$XDG_CONFIG_HOME/bento/config.jsonc` (if `XDG_CONFIG_HOME` is set)
/// 2. `~/.config/bento/config.jsonc`
/// 3. `{platform config dir}/bento/config.jsonc`
/// 4. `~/.bento.jsonc`
#[must_use]
pub fn config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
        paths.push(PathBuf::from(xdg_config).join(APP_DIR_NAME).join(CONFIG_FILE_NAME));
    }

    if let Some(home) = dirs::home_dir() {
        let path = home.join(".config").join(APP_DIR_NAME).join(CONFIG_FILE_NAME);
        if !paths.contains(&path) {
            paths.push(path);
        }
    }

    if let Some(config_dir) = dirs::config_dir() {
        let path = config_dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME);
        if !paths.contains(&path) {
            paths.push(path);
        }
    }

    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(format!(".{APP_DIR_NAME}.jsonc")));
    }

    paths
}

/// Loads the configuration from the first existing config file.
///
/// # Errors
///
/// Returns `ConfigError::NotFound` if no configuration file exists, or the
/// read/parse error of the first file that does.
pub fn load_config() -> Result<(BentoConfig, PathBuf), ConfigError> {
    for path in config_paths() {
        if path.exists() {
            return load_config_from_path(&path);
        }
    }

    Err(ConfigError::NotFound)
}

/// Loads the configuration from a specific file.
///
/// # Errors
///
/// Returns `ConfigError::NotFound` if the file does not exist,
/// `ConfigError::IoError` if it cannot be read, and
/// `ConfigError::ParseError` if it is not valid JSONC.
pub fn load_config_from_path(path: &Path) -> Result<(BentoConfig, PathBuf), ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound);
    }

    let file = fs::File::open(path)?;
    let reader = json_comments::StripComments::new(file);
    let config: BentoConfig = serde_json::from_reader(reader)?;

    Ok((config, path.to_path_buf()))
}

/// Parses a `#rrggbb` or `#rgb` color (the `#` is optional).
#[must_use]
pub fn parse_hex_color(value: &str) -> Option<[u8; 3]> {
    let hex = value.trim().trim_start_matches('#');

    match hex.len() {
        6 => {
            let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
            Some([channel(0)?, channel(2)?, channel(4)?])
        }
        3 => {
            let channel = |i: usize| {
                u8::from_str_radix(hex.get(i..=i)?, 16).ok().map(|v| v * 0x11)
            };
            Some([channel(0)?, channel(1)?, channel(2)?])
        }
        _ => None,
    }
}
