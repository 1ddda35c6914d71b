//! On-disk copies of fetched wallpaper images.
//!
//! The preloader saves the bytes it validated so the desktop surface can
//! apply the same image without downloading it again.

use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use image::ImageFormat;

/// Extensions a cached image may have been saved with.
const CACHED_EXTENSIONS: &[&str] = &["jpg", "png", "img"];

/// Length of the hex file stem derived from a URL.
const STEM_LEN: usize = 16;

/// Returns the file stem used for `url` inside the image directory: the
/// leading hex digits of its BLAKE3 hash, stable across toolchains.
fn url_stem(url: &str) -> String {
    let hash = blake3::hash(url.as_bytes());
    hash.to_hex()[..STEM_LEN].to_string()
}

/// Returns the stem of `path` if it names a cached image copy.
fn cached_stem(path: &Path) -> Option<&str> {
    let ext = path.extension()?.to_str()?;
    let stem = path.file_stem()?.to_str()?;

    let is_copy = CACHED_EXTENSIONS.contains(&ext)
        && stem.len() == STEM_LEN
        && stem.bytes().all(|b| b.is_ascii_hexdigit());
    is_copy.then_some(stem)
}

/// Picks a file extension from the image bytes.
fn extension_for(bytes: &[u8]) -> &'static str {
    match image::guess_format(bytes) {
        Ok(ImageFormat::Jpeg) => "jpg",
        Ok(ImageFormat::Png) => "png",
        _ => "img",
    }
}

/// Returns the cached copy of `url`, if one exists.
#[must_use]
pub fn find_cached_image(dir: &Path, url: &str) -> Option<PathBuf> {
    let stem = url_stem(url);
    CACHED_EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("{stem}.{ext}")))
        .find(|path| path.is_file())
}

/// Saves `bytes` as the cached copy of `url` and returns its path.
///
/// # Errors
///
/// Returns an error if the directory or file cannot be written.
pub fn store_image(dir: &Path, url: &str, bytes: &[u8]) -> std::io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(format!("{}.{}", url_stem(url), extension_for(bytes)));
    fs::write(&path, bytes)?;
    Ok(path)
}

/// Deletes cached copies under `dir` for every URL not in `keep` and
/// returns how many were removed. Other files, such as rendered fallbacks,
/// are left alone.
///
/// # Errors
///
/// Returns an error if the directory cannot be listed or a file cannot be
/// removed. A missing directory is not an error.
pub fn prune_images(dir: &Path, keep: &[String]) -> std::io::Result<usize> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(0),
        Err(err) => return Err(err),
    };

    let keep: HashSet<String> = keep.iter().map(|url| url_stem(url)).collect();
    let mut removed = 0;

    for entry in entries {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }

        if cached_stem(&path).is_some_and(|stem| !keep.contains(stem)) {
            fs::remove_file(&path)?;
            removed += 1;
        }
    }

    Ok(removed)
}
