use thiserror::Error;

use crate::store::StoreError;

/// Errors produced while acquiring, validating or caching wallpapers.
///
/// None of these escape [`super::WallpaperCache::resolve_display_image`] or
/// [`super::WallpaperCache::refill_next`]; they drive fallbacks and logging.
#[derive(Debug, Error)]
pub enum WallpaperError {
    /// The primary provider has no usable credential.
    #[error("primary provider is not configured")]
    NotConfigured,
    /// A provider answered with a non-2xx status or an unusable body, or
    /// could not be reached.
    #[error("{provider} request failed: {reason}")]
    ProviderHttp {
        /// Provider name.
        provider: &'static str,
        /// What went wrong, without the request URL.
        reason: String,
    },
    /// The image could not be fetched or decoded.
    #[error("failed to load {url}: {reason}")]
    Load {
        /// Image URL that failed.
        url: String,
        /// What went wrong.
        reason: String,
    },
    /// Every provider in the chain failed.
    #[error("no wallpaper provider returned an image")]
    AcquisitionExhausted,
    /// The slot store could not be read or written.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl WallpaperError {
    pub(crate) fn load(url: &str, reason: impl Into<String>) -> Self {
        Self::Load { url: url.to_string(), reason: reason.into() }
    }
}
