//! Wallpaper CLI commands: show, refill, fetch, preload and status.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use colored::Colorize;
use serde_json::json;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::cli::output;
use crate::config::WallpaperConfig;
use crate::config::env::load_api_keys;
use crate::error::BentoError;
use crate::store::{CREDENTIAL_KEY, FileStore, KeyValueStore, Slot};
use crate::wallpaper::{
    CredentialSource, DesktopSurface, HttpPreloader, PrintSurface, ProviderChain, RenderSurface,
    TokioSpawner, WallpaperCache, http_client, is_usable_credential,
};
use crate::{cache, config};

/// Subdirectory of the cache directory holding downloaded wallpapers.
pub const IMAGE_SUBDIR: &str = "wallpapers";

/// Everything a wallpaper command needs, wired from config and CLI flags.
pub(super) struct Session {
    pub(super) cache: WallpaperCache,
    pub(super) store: Arc<FileStore>,
    pub(super) spawner: Arc<TokioSpawner>,
    pub(super) providers: Arc<ProviderChain>,
    env_key: Option<String>,
    topic: String,
}

impl Session {
    /// Builds a session from the loaded configuration over the store at
    /// `store_path` (or the default store). With `print`, display commands go
    /// to stdout instead of the desktop.
    pub(super) fn open(store_path: Option<PathBuf>, print: bool) -> Result<Self, BentoError> {
        Self::from_config(
            &config::get_config().wallpaper,
            &config::config_dir(),
            &cache::get_cache_subdir(IMAGE_SUBDIR),
            store_path,
            print,
        )
    }

    /// Builds a session from explicit settings. `config_dir` anchors a
    /// relative `apiKeys` path; downloaded images go under `image_dir`.
    pub(super) fn from_config(
        wallpaper_config: &WallpaperConfig,
        config_dir: &Path,
        image_dir: &Path,
        store_path: Option<PathBuf>,
        print: bool,
    ) -> Result<Self, BentoError> {
        let store = Arc::new(store_path.map_or_else(FileStore::open_default, FileStore::new));
        let client = http_client()?;

        let env_key = load_api_keys(&wallpaper_config.api_keys, config_dir).unsplash_access_key;
        let credential = CredentialSource::new(store.clone(), env_key.clone());
        let providers =
            Arc::new(ProviderChain::standard(client.clone(), wallpaper_config, credential));

        let surface: Arc<dyn RenderSurface> = if print {
            Arc::new(PrintSurface)
        } else {
            Arc::new(DesktopSurface::new(client.clone(), image_dir, wallpaper_config))
        };

        let spawner = Arc::new(TokioSpawner::new());
        let cache = WallpaperCache::new(
            store.clone(),
            providers.clone(),
            Arc::new(HttpPreloader::new(client).with_image_dir(image_dir)),
            surface,
            spawner.clone(),
        )
        .with_topic(wallpaper_config.topic.clone())
        .with_fallback_color(wallpaper_config.fallback_color.clone());

        tracing::debug!(store = %store.path().display(), "cli: session ready");

        Ok(Self {
            cache,
            store,
            spawner,
            providers,
            env_key,
            topic: wallpaper_config.topic.clone(),
        })
    }

    /// Where the primary provider's credential currently comes from.
    pub(super) fn credential_origin(&self) -> Result<&'static str, BentoError> {
        let stored = self.store.get(CREDENTIAL_KEY)?;
        Ok(if stored.as_deref().is_some_and(is_usable_credential) {
            "store"
        } else if self.env_key.as_deref().is_some_and(is_usable_credential) {
            "env file"
        } else {
            "none"
        })
    }
}

/// Runs `future` to completion on a fresh current-thread runtime.
pub(super) fn block_on<F: Future>(future: F) -> Result<F::Output, BentoError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| BentoError::RuntimeError(err.to_string()))?;

    Ok(runtime.block_on(future))
}

/// Shows a wallpaper, then waits for the background refill to finish.
pub fn show(store_path: Option<PathBuf>, print: bool) -> Result<(), BentoError> {
    let session = Session::open(store_path, print)?;

    let backdrop = block_on(async {
        let backdrop = session.cache.resolve_display_image().await;
        session.spawner.wait_idle().await;
        backdrop
    })?;

    tracing::debug!(backdrop = ?backdrop, "cli: show finished");
    Ok(())
}

/// Runs the refill in the foreground and prints what `next` now holds.
pub fn refill(store_path: Option<PathBuf>) -> Result<(), BentoError> {
    let session = Session::open(store_path, true)?;
    block_on(session.cache.refill_next())?;

    match session.cache.read_slot(Slot::Next)? {
        Some(url) => println!("{url}"),
        None => println!("{}", "No next wallpaper could be fetched.".yellow()),
    }

    Ok(())
}

/// Prints one URL from the provider chain.
pub fn fetch(store_path: Option<PathBuf>, topic: Option<&str>) -> Result<(), BentoError> {
    let session = Session::open(store_path, true)?;
    let topic = topic.unwrap_or(&session.topic);

    let url = block_on(session.cache.acquire_wallpaper(topic))??;
    println!("{url}");
    Ok(())
}

/// Fetches and decodes `url`, failing if it is not a loadable image.
pub fn preload(store_path: Option<PathBuf>, url: &str) -> Result<(), BentoError> {
    let session = Session::open(store_path, true)?;
    block_on(session.cache.preload_image(url))??;

    println!("{} {url}", "ok".green());
    Ok(())
}

#[derive(Tabled)]
struct SlotRow {
    #[tabled(rename = "Slot")]
    slot: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "URL")]
    url: String,
}

/// Prints the slots, the credential origin and the provider order.
pub fn status(store_path: Option<PathBuf>, as_json: bool) -> Result<(), BentoError> {
    let session = Session::open(store_path, true)?;
    let current = session.cache.read_slot(Slot::Current)?;
    let next = session.cache.read_slot(Slot::Next)?;
    let credential = session.credential_origin()?;

    if as_json {
        output::print_json(&json!({
            "store": session.store.path(),
            "current": current,
            "next": next,
            "credential": credential,
            "providers": session.providers.names(),
        }));
        return Ok(());
    }

    let rows: Vec<SlotRow> = [(Slot::Current, &current), (Slot::Next, &next)]
        .into_iter()
        .map(|(slot, url)| SlotRow {
            slot: slot.name().to_string(),
            state: output::slot_state_cell(url.is_some()),
            url: output::slot_url_cell(url.as_deref(), 72),
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();

    println!("{}", "Wallpaper slots".bold());
    println!("{table}");
    println!("{} {}", "Store:".bold(), session.store.path().display());
    println!("{} {credential}", "Credential:".bold());
    println!("{} {}", "Providers:".bold(), session.providers.names().join(" → "));

    Ok(())
}
