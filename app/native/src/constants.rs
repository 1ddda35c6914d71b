//! Application-wide constants.

/// Directory name used under the platform config, data and cache directories.
pub const APP_DIR_NAME: &str = "bento";

/// Name of the key-value store file inside the data directory.
pub const STORE_FILE_NAME: &str = "store.json";

/// Environment variable holding the Unsplash access key in the API keys file.
pub const UNSPLASH_ACCESS_KEY: &str = "UNSPLASH_ACCESS_KEY";

/// Value shipped in sample configs in place of a real Unsplash key.
pub const UNSPLASH_KEY_PLACEHOLDER: &str = "YOUR_UNSPLASH_KEY";

/// Neutral background shown when no image can be displayed.
pub const DEFAULT_FALLBACK_COLOR: &str = "#0b1220";
