//! Environment file parsing for API keys.
//!
//! The Unsplash access key can live in a `.env` file referenced by the
//! `wallpaper.apiKeys` config option instead of the config file itself.
//! Parsing is delegated to `dotenvy`; variable expansion is not performed.

use std::collections::HashMap;
use std::path::Path;

use crate::constants::UNSPLASH_ACCESS_KEY;
use crate::platform::path::expand_and_resolve;

/// Parses an environment file into a map of key-value pairs.
///
/// Returns an empty map if the file doesn't exist or can't be read; a file
/// that exists but fails to parse is logged at warn level.
#[must_use]
pub fn parse_env_file(path: &Path) -> HashMap<String, String> {
    match dotenvy::from_path_iter(path) {
        Ok(iter) => iter.filter_map(Result::ok).collect(),
        Err(err) => {
            if path.exists() {
                tracing::warn!(path = %path.display(), error = %err, "config: failed to read env file");
            }
            HashMap::new()
        }
    }
}

/// Loads API keys from an environment file.
///
/// # Arguments
///
/// * `api_keys_path` - Path to the env file (can be relative, absolute, or `~`-prefixed)
/// * `config_dir` - Directory containing the config file (for resolving relative paths)
#[must_use]
pub fn load_api_keys(api_keys_path: &str, config_dir: &Path) -> ApiKeys {
    if api_keys_path.trim().is_empty() {
        return ApiKeys::default();
    }

    let resolved_path = expand_and_resolve(api_keys_path, config_dir);
    let env_vars = parse_env_file(&resolved_path);

    ApiKeys {
        unsplash_access_key: env_vars.get(UNSPLASH_ACCESS_KEY).cloned(),
    }
}

/// API keys loaded from an environment file.
#[derive(Debug, Clone, Default)]
pub struct ApiKeys {
    /// Unsplash access key (client id).
    pub unsplash_access_key: Option<String>,
}
