//! Double-buffered wallpaper cache.
//!
//! Two persisted slots drive what is shown on each load: `next` holds an
//! image prepared by the previous run's background refill, `current` holds
//! the image shown last time. See [`WallpaperCache`] for the resolution order.
//!
//! The collaborators are traits so the state machine can be driven entirely
//! by test doubles:
//!
//! - [`WallpaperProvider`] / [`ProviderChain`] - where new image URLs come from
//! - [`ImagePreloader`] - fetch-and-decode validation of a URL
//! - [`RenderSurface`] - where the chosen image (or fallback color) is shown
//! - [`TaskSpawner`] - detached execution of the background refill

mod download;
mod error;
mod manager;
mod preload;
mod provider;
mod spawner;
mod surface;

pub use error::WallpaperError;
pub use manager::{Backdrop, WallpaperCache};
pub use preload::{HttpPreloader, ImagePreloader, decode_image};
pub use provider::{
    CredentialSource, PicsumProvider, ProviderChain, UnsplashProvider, WallpaperProvider,
    is_usable_credential, parse_photo_url,
};
pub use spawner::{BoxedTask, TaskSpawner, TokioSpawner};
pub use surface::{DesktopSurface, PrintSurface, RenderSurface};

/// Builds the HTTP client shared by providers, the preloader and the desktop surface.
///
/// # Errors
///
/// Returns an error if the TLS backend cannot be initialized.
pub fn http_client() -> Result<reqwest::Client, WallpaperError> {
    reqwest::Client::builder()
        .user_agent(concat!("bento/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|err| WallpaperError::ProviderHttp {
            provider: "http",
            reason: err.to_string(),
        })
}
