//! Rendering surfaces: where the resolved backdrop ends up.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use image::{Rgb, RgbImage};
use reqwest::Client;

use super::download::{find_cached_image, store_image};
use crate::config::{WallpaperConfig, parse_hex_color};

/// Accepts display commands. Neither command reports failure; a surface
/// logs what it could not do.
#[async_trait]
pub trait RenderSurface: Send + Sync {
    /// Shows the image at `url` as the background.
    async fn show_image(&self, url: &str);

    /// Shows a solid `color` (`#rrggbb`) as the background.
    async fn show_fallback(&self, color: &str);
}

/// Writes display commands to stdout, one per line.
#[derive(Debug, Default, Clone, Copy)]
pub struct PrintSurface;

#[async_trait]
impl RenderSurface for PrintSurface {
    async fn show_image(&self, url: &str) {
        println!("image {url}");
    }

    async fn show_fallback(&self, color: &str) {
        println!("fallback {color}");
    }
}

/// Sets the operating system's desktop wallpaper.
///
/// Images are reused from the preloader's local copies when present and
/// downloaded otherwise. Fallback colors are rendered once to a PNG of the
/// configured size.
pub struct DesktopSurface {
    client: Client,
    image_dir: PathBuf,
    width: u32,
    height: u32,
}

impl DesktopSurface {
    /// Creates a surface storing images under `image_dir`.
    #[must_use]
    pub fn new(client: Client, image_dir: impl Into<PathBuf>, config: &WallpaperConfig) -> Self {
        Self {
            client,
            image_dir: image_dir.into(),
            width: config.width.max(1),
            height: config.height.max(1),
        }
    }

    async fn local_copy(&self, url: &str) -> Result<PathBuf, String> {
        if let Some(path) = find_cached_image(&self.image_dir, url) {
            return Ok(path);
        }

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| err.without_url().to_string())?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("HTTP {status}"));
        }

        let bytes = response.bytes().await.map_err(|err| err.without_url().to_string())?;
        store_image(&self.image_dir, url, &bytes).map_err(|err| err.to_string())
    }

    fn fallback_path(&self, rgb: [u8; 3]) -> PathBuf {
        let [r, g, b] = rgb;
        self.image_dir
            .join(format!("fallback-{r:02x}{g:02x}{b:02x}-{}x{}.png", self.width, self.height))
    }
}

/// Renders a solid-color PNG at `path` unless it already exists.
fn render_solid(path: &Path, width: u32, height: u32, rgb: [u8; 3]) -> Result<(), String> {
    if path.is_file() {
        return Ok(());
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|err| err.to_string())?;
    }

    RgbImage::from_pixel(width, height, Rgb(rgb)).save(path).map_err(|err| err.to_string())
}

/// Hands `path` to the OS through `set`, logging the outcome. Returns
/// whether the wallpaper was applied.
fn apply_with(path: &Path, set: impl FnOnce(&str) -> Result<(), String>) -> bool {
    let Some(path_str) = path.to_str() else {
        tracing::warn!(path = %path.display(), "surface: wallpaper path is not valid UTF-8");
        return false;
    };

    match set(path_str) {
        Ok(()) => {
            tracing::info!(path = %path.display(), "surface: desktop wallpaper updated");
            true
        }
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "surface: failed to set desktop wallpaper");
            false
        }
    }
}

/// Runs `set` on the blocking pool. The `wallpaper` crate may shell out to
/// desktop tools, and its error type is not `Send`, so it is turned into a
/// string before leaving the closure.
async fn apply_blocking<F>(path: PathBuf, set: F) -> bool
where
    F: FnOnce(&str) -> Result<(), String> + Send + 'static,
{
    tokio::task::spawn_blocking(move || apply_with(&path, set)).await.unwrap_or_else(|err| {
        tracing::warn!(error = %err, "surface: wallpaper task failed");
        false
    })
}

async fn apply_wallpaper(path: PathBuf) -> bool {
    apply_blocking(path, |p| wallpaper::set_from_path(p).map_err(|err| err.to_string())).await
}

#[async_trait]
impl RenderSurface for DesktopSurface {
    async fn show_image(&self, url: &str) {
        match self.local_copy(url).await {
            Ok(path) => {
                apply_wallpaper(path).await;
            }
            Err(reason) => {
                tracing::warn!(url = %url, error = %reason, "surface: failed to download wallpaper");
            }
        }
    }

    async fn show_fallback(&self, color: &str) {
        let rgb = parse_hex_color(color).unwrap_or_else(|| WallpaperConfig::default().fallback_rgb());
        let path = self.fallback_path(rgb);
        let (width, height) = (self.width, self.height);

        let render_path = path.clone();
        let rendered =
            tokio::task::spawn_blocking(move || render_solid(&render_path, width, height, rgb))
                .await
                .map_err(|err| err.to_string())
                .and_then(|result| result);

        match rendered {
            Ok(()) => {
                apply_wallpaper(path).await;
            }
            Err(reason) => {
                tracing::warn!(color = %color, error = %reason, "surface: failed to render fallback");
            }
        }
    }
}
