//! Configuration template generation.
//!
//! Written to the preferred config path on first run, or on request with
//! `bento config init`.

use std::fs;
use std::path::Path;

/// Generates a configuration template with every option commented out at
/// its default value.
#[must_use]
pub fn generate_config_template() -> String {
    r##"// Bento Configuration File
// ========================
// This file uses JSONC format (JSON with comments).
// All options below are commented out and show their default values.
// Uncomment and modify the options you want to configure.

{
  // ============================================================================
  // Wallpaper
  // ============================================================================
  // "wallpaper": {
  //   // Search topic sent to Unsplash
  //   "topic": "landscape",
  //
  //   // Orientation requested from Unsplash: "landscape", "portrait" or "squarish"
  //   "orientation": "landscape",
  //
  //   // Unsplash content safety filter: "low" or "high"
  //   "contentFilter": "high",
  //
  //   // Path to .env file containing UNSPLASH_ACCESS_KEY
  //   // (a key saved with `bento credential set` takes precedence)
  //   "apiKeys": "",
  //
  //   // Provider endpoints
  //   "primaryUrl": "https://api.unsplash.com",
  //   "fallbackUrl": "https://picsum.photos",
  //
  //   // Size requested from the fallback provider and used for the solid background
  //   "width": 1920,
  //   "height": 1080,
  //
  //   // Solid color shown when no image can be displayed
  //   "fallbackColor": "#0b1220"
  // }
}
"##
    .to_string()
}

/// Creates a configuration file with the template at the specified path,
/// creating parent directories as needed.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn create_config_file(path: &Path) -> Result<(), std::io::Error> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::write(path, generate_config_template())
}
