//! Shell-like path handling for user-supplied paths.
//!
//! Config values such as `apiKeys` and the `--store` flag accept `~` and
//! paths relative to the config file's directory.

use std::path::{Path, PathBuf};

/// Expands a leading `~` to the home directory. Whitespace is trimmed and an
/// empty input yields an empty path.
#[must_use]
pub fn expand(path: &str) -> PathBuf {
    let path = path.trim();

    if path.is_empty() {
        return PathBuf::new();
    }

    PathBuf::from(shellexpand::tilde(path).as_ref())
}

/// Expands `path` and, if it is still relative, joins it onto `base_dir`.
///
/// ```ignore
/// let keys = expand_and_resolve(".env", Path::new("/home/me/.config/bento"));
/// assert_eq!(keys, PathBuf::from("/home/me/.config/bento/.env"));
/// ```
#[must_use]
pub fn expand_and_resolve(path: &str, base_dir: &Path) -> PathBuf {
    let expanded = expand(path);

    if expanded.as_os_str().is_empty() || expanded.is_absolute() {
        return expanded;
    }

    base_dir.join(expanded)
}
