//! The double-buffer state machine.

use std::sync::Arc;

use super::{ImagePreloader, ProviderChain, RenderSurface, TaskSpawner, WallpaperError};
use crate::constants::DEFAULT_FALLBACK_COLOR;
use crate::store::{KeyValueStore, Slot};

/// What a load ended up showing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backdrop {
    /// An image, by URL.
    Image(String),
    /// The solid fallback color.
    Fallback(String),
}

/// Owns the `current`/`next` slots and decides what to show on each load.
///
/// Cloning is cheap; clones share every collaborator.
#[derive(Clone)]
pub struct WallpaperCache {
    store: Arc<dyn KeyValueStore>,
    providers: Arc<ProviderChain>,
    preloader: Arc<dyn ImagePreloader>,
    surface: Arc<dyn RenderSurface>,
    spawner: Arc<dyn TaskSpawner>,
    topic: String,
    fallback_color: String,
}

impl WallpaperCache {
    /// Creates a cache with the default topic and fallback color.
    #[must_use]
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        providers: Arc<ProviderChain>,
        preloader: Arc<dyn ImagePreloader>,
        surface: Arc<dyn RenderSurface>,
        spawner: Arc<dyn TaskSpawner>,
    ) -> Self {
        Self {
            store,
            providers,
            preloader,
            surface,
            spawner,
            topic: "landscape".to_string(),
            fallback_color: DEFAULT_FALLBACK_COLOR.to_string(),
        }
    }

    /// Sets the topic passed to providers.
    #[must_use]
    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = topic.into();
        self
    }

    /// Sets the color shown when no image can be displayed.
    #[must_use]
    pub fn with_fallback_color(mut self, color: impl Into<String>) -> Self {
        self.fallback_color = color.into();
        self
    }

    /// Returns the URL held by `slot`. Blank values count as empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn read_slot(&self, slot: Slot) -> Result<Option<String>, WallpaperError> {
        Ok(self.store.get(slot.key())?.filter(|url| !url.trim().is_empty()))
    }

    fn write_slot(&self, slot: Slot, url: &str) -> Result<(), WallpaperError> {
        Ok(self.store.set(slot.key(), url)?)
    }

    /// Moves `url` from `next` into `current`.
    fn promote(&self, url: &str) -> Result<(), WallpaperError> {
        self.write_slot(Slot::Current, url)?;
        self.store.remove(Slot::Next.key())?;
        tracing::debug!(url = %url, "wallpaper: promoted next to current");
        Ok(())
    }

    /// Lets the preloader drop local copies of images no slot refers to.
    /// Skipped if either slot cannot be read.
    fn retain_slot_images(&self) {
        let urls: Result<Vec<Option<String>>, _> =
            Slot::ALL.into_iter().map(|slot| self.read_slot(slot)).collect();

        match urls {
            Ok(urls) => self.preloader.retain(&urls.into_iter().flatten().collect::<Vec<_>>()),
            Err(err) => tracing::debug!(error = %err, "wallpaper: skipped image pruning"),
        }
    }

    fn fallback(&self) -> Backdrop { Backdrop::Fallback(self.fallback_color.clone()) }

    /// Returns a new image URL from the provider chain.
    ///
    /// # Errors
    ///
    /// Returns `AcquisitionExhausted` if every provider fails, which the
    /// standard chain never does.
    pub async fn acquire_wallpaper(&self, topic: &str) -> Result<String, WallpaperError> {
        self.providers.acquire(topic).await
    }

    /// Fetches and decodes `url`.
    ///
    /// # Errors
    ///
    /// Returns `WallpaperError::Load` if the image cannot be fetched or decoded.
    pub async fn preload_image(&self, url: &str) -> Result<(), WallpaperError> {
        self.preloader.preload(url).await
    }

    /// Decides what to show on this load, shows it, and starts a background
    /// refill of the `next` slot.
    ///
    /// Priority: a prepared `next` image (shown even if its preload fails,
    /// then promoted), else the `current` image if it still loads, else a
    /// freshly acquired image stored as `current` if it loads. Anything that
    /// fails along the way ends in the fallback color. Exactly one display
    /// command is issued and the refill is never awaited.
    pub async fn resolve_display_image(&self) -> Backdrop {
        let backdrop = match self.choose_backdrop().await {
            Ok(backdrop) => backdrop,
            Err(err) => {
                tracing::error!(error = %err, "wallpaper: failed to resolve display image");
                self.fallback()
            }
        };

        match &backdrop {
            Backdrop::Image(url) => self.surface.show_image(url).await,
            Backdrop::Fallback(color) => self.surface.show_fallback(color).await,
        }

        self.spawn_refill();
        backdrop
    }

    async fn choose_backdrop(&self) -> Result<Backdrop, WallpaperError> {
        if let Some(next) = self.read_slot(Slot::Next)? {
            if let Err(err) = self.preload_image(&next).await {
                tracing::warn!(url = %next, error = %err, "wallpaper: prepared image failed to preload, showing it anyway");
            }
            self.promote(&next)?;
            self.retain_slot_images();
            return Ok(Backdrop::Image(next));
        }

        if let Some(current) = self.read_slot(Slot::Current)? {
            return Ok(match self.preload_image(&current).await {
                Ok(()) => Backdrop::Image(current),
                Err(err) => {
                    tracing::warn!(url = %current, error = %err, "wallpaper: current image failed to preload");
                    self.fallback()
                }
            });
        }

        tracing::info!("wallpaper: no cached images, fetching one now");
        let url = self.acquire_wallpaper(&self.topic).await?;
        match self.preload_image(&url).await {
            Ok(()) => {
                self.write_slot(Slot::Current, &url)?;
                self.retain_slot_images();
                Ok(Backdrop::Image(url))
            }
            Err(err) => {
                tracing::warn!(url = %url, error = %err, "wallpaper: fresh image failed to preload");
                Ok(self.fallback())
            }
        }
    }

    fn spawn_refill(&self) {
        let cache = self.clone();
        self.spawner.spawn("refill-next", Box::pin(async move { cache.refill_next().await }));
    }

    /// Acquires a new image and stores it in `next` for the following load.
    ///
    /// The URL is stored even if its preload fails, since a transient
    /// failure now says little about the next load. If acquisition itself
    /// fails, `next` is left as it was. Nothing is returned; every failure
    /// is logged.
    pub async fn refill_next(&self) {
        let url = match self.acquire_wallpaper(&self.topic).await {
            Ok(url) => url,
            Err(err) => {
                tracing::warn!(error = %err, "wallpaper: failed to fetch next wallpaper");
                return;
            }
        };

        if let Err(err) = self.preload_image(&url).await {
            tracing::warn!(url = %url, error = %err, "wallpaper: next image failed to preload, caching it anyway");
        }

        match self.write_slot(Slot::Next, &url) {
            Ok(()) => {
                tracing::info!(url = %url, "wallpaper: next wallpaper cached");
                self.retain_slot_images();
            }
            Err(err) => tracing::warn!(url = %url, error = %err, "wallpaper: failed to cache next wallpaper"),
        }
    }

    /// Like [`Self::refill_next`], but only stores an image that preloaded
    /// and reports failures to the caller.
    ///
    /// # Errors
    ///
    /// Returns the acquisition, preload or store error; `next` is untouched
    /// in every error case.
    pub async fn prefetch_next(&self) -> Result<String, WallpaperError> {
        let url = self.acquire_wallpaper(&self.topic).await?;
        self.preload_image(&url).await?;
        self.write_slot(Slot::Next, &url)?;
        tracing::info!(url = %url, "wallpaper: next wallpaper cached");
        self.retain_slot_images();
        Ok(url)
    }
}
