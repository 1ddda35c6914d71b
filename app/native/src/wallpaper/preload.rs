//! Fetch-and-decode validation of image URLs.

use std::path::PathBuf;

use async_trait::async_trait;
use image::GenericImageView;
use reqwest::Client;

use super::WallpaperError;
use super::download::{prune_images, store_image};

/// Validates that an image URL can actually be shown.
#[async_trait]
pub trait ImagePreloader: Send + Sync {
    /// Resolves once the image at `url` has been fetched and decoded.
    ///
    /// No timeout is imposed here; failure is whatever the network stack
    /// or decoder reports.
    async fn preload(&self, url: &str) -> Result<(), WallpaperError>;

    /// Drops whatever was kept locally for URLs other than `urls`.
    fn retain(&self, _urls: &[String]) {}
}

/// Decodes `bytes` as an image and returns its dimensions.
///
/// # Errors
///
/// Returns the decoder error if the bytes are not a supported image.
pub fn decode_image(bytes: &[u8]) -> Result<(u32, u32), image::ImageError> {
    image::load_from_memory(bytes).map(|img| img.dimensions())
}

/// Preloads over HTTP(S) and decodes with the `image` crate.
pub struct HttpPreloader {
    client: Client,
    image_dir: Option<PathBuf>,
}

impl HttpPreloader {
    /// Creates a preloader that keeps nothing on disk.
    #[must_use]
    pub fn new(client: Client) -> Self { Self { client, image_dir: None } }

    /// Saves each successfully decoded image under `dir` for reuse by the
    /// desktop surface.
    #[must_use]
    pub fn with_image_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.image_dir = Some(dir.into());
        self
    }
}

#[async_trait]
impl ImagePreloader for HttpPreloader {
    async fn preload(&self, url: &str) -> Result<(), WallpaperError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| WallpaperError::load(url, err.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(WallpaperError::load(url, format!("HTTP {status}")));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|err| WallpaperError::load(url, err.without_url().to_string()))?;

        let decode_input = bytes.clone();
        let (width, height) = tokio::task::spawn_blocking(move || decode_image(&decode_input))
            .await
            .map_err(|err| WallpaperError::load(url, format!("decoder task failed: {err}")))?
            .map_err(|err| WallpaperError::load(url, err.to_string()))?;

        tracing::debug!(url = %url, width, height, "preload: image decoded");

        if let Some(dir) = &self.image_dir {
            if let Err(err) = store_image(dir, url, &bytes) {
                tracing::debug!(url = %url, error = %err, "preload: failed to keep a local copy");
            }
        }

        Ok(())
    }

    fn retain(&self, urls: &[String]) {
        let Some(dir) = &self.image_dir else {
            return;
        };

        match prune_images(dir, urls) {
            Ok(0) => {}
            Ok(removed) => tracing::debug!(removed, "preload: pruned cached images"),
            Err(err) => tracing::warn!(error = %err, "preload: failed to prune cached images"),
        }
    }
}
