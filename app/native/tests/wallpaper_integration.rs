//! Integration tests for the wallpaper providers, the preloader and the cache.
//!
//! Each test serves canned HTTP responses from a throwaway server on a random
//! local port, so no network access is needed.
//!
//! ```bash
//! cargo test -p bento --test wallpaper_integration
//! ```

use std::io::{Cursor, Read, Write};
use std::net::TcpListener;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use bento_lib::config::WallpaperConfig;
use bento_lib::store::{CREDENTIAL_KEY, KeyValueStore, MemoryStore, Slot};
use bento_lib::wallpaper::{
    Backdrop, CredentialSource, HttpPreloader, ImagePreloader, PrintSurface, ProviderChain,
    TokioSpawner, UnsplashProvider, WallpaperCache, WallpaperError, WallpaperProvider,
};
use image::{ImageFormat, Rgb, RgbImage};
use tempfile::TempDir;

/// Nothing listens here, so every request is refused immediately.
const REFUSED: &str = "http://127.0.0.1:9";

// ============================================================================
// Local HTTP server
// ============================================================================

struct Served {
    base_url: String,
    requests: JoinHandle<Vec<String>>,
}

impl Served {
    /// Returns the first request line the server received.
    fn request_line(self) -> String { self.requests.join().unwrap().remove(0) }
}

/// Answers exactly one request with `status`, `content_type` and `body`.
fn serve_once(status: &str, content_type: &str, body: Vec<u8>) -> Served {
    serve(1, status, content_type, body)
}

/// Answers `count` requests, one connection each, with the same response.
fn serve(count: usize, status: &str, content_type: &str, body: Vec<u8>) -> Served {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    let head = format!(
        "HTTP/1.1 {status}\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        body.len()
    );

    let requests = thread::spawn(move || {
        let mut lines = Vec::with_capacity(count);

        for _ in 0..count {
            let (mut stream, _) = listener.accept().unwrap();

            let mut received = Vec::new();
            let mut buf = [0u8; 1024];
            while !received.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                received.extend_from_slice(&buf[..n]);
            }

            stream.write_all(head.as_bytes()).unwrap();
            stream.write_all(&body).unwrap();
            stream.flush().unwrap();

            lines.push(String::from_utf8_lossy(&received).lines().next().unwrap_or_default().to_string());
        }

        lines
    });

    Served { base_url, requests }
}

fn png_bytes() -> Vec<u8> {
    let mut bytes = Vec::new();
    RgbImage::from_pixel(3, 2, Rgb([10, 20, 30]))
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

fn credential(key: &str) -> CredentialSource {
    let store = MemoryStore::new();
    store.set(CREDENTIAL_KEY, key).unwrap();
    CredentialSource::new(Arc::new(store), None)
}

fn config_for(primary_url: &str, fallback_url: &str) -> WallpaperConfig {
    WallpaperConfig {
        primary_url: primary_url.to_string(),
        fallback_url: fallback_url.to_string(),
        ..Default::default()
    }
}

// ============================================================================
// Primary provider
// ============================================================================

#[tokio::test]
async fn test_unsplash_returns_regular_url_and_sends_query() {
    let served = serve_once(
        "200 OK",
        "application/json",
        br#"{"id":"abc","urls":{"full":"https://images/full.jpg","regular":"https://images/regular.jpg"}}"#
            .to_vec(),
    );
    let provider = UnsplashProvider::new(
        reqwest::Client::new(),
        &config_for(&served.base_url, REFUSED),
        credential("secret-key"),
    );

    let url = provider.fetch("mountains").await.unwrap();
    let request = served.request_line();

    assert_eq!(url, "https://images/regular.jpg");
    assert!(request.starts_with("GET /photos/random?"));
    assert!(request.contains("query=mountains"));
    assert!(request.contains("orientation=landscape"));
    assert!(request.contains("content_filter=high"));
    assert!(request.contains("client_id=secret-key"));
}

#[tokio::test]
async fn test_unsplash_non_success_status_is_provider_error() {
    let served = serve_once("401 Unauthorized", "application/json", br#"{"errors":["OAuth error"]}"#.to_vec());
    let provider = UnsplashProvider::new(
        reqwest::Client::new(),
        &config_for(&served.base_url, REFUSED),
        credential("secret-key"),
    );

    let err = provider.fetch("landscape").await.unwrap_err();

    assert!(matches!(err, WallpaperError::ProviderHttp { provider: "unsplash", .. }));
    assert!(err.to_string().contains("401"));
    assert!(!err.to_string().contains("secret-key"));
}

#[tokio::test]
async fn test_unsplash_body_without_urls_is_provider_error() {
    let served = serve_once("200 OK", "application/json", b"{\"id\":\"abc\"}".to_vec());
    let provider = UnsplashProvider::new(
        reqwest::Client::new(),
        &config_for(&served.base_url, REFUSED),
        credential("secret-key"),
    );

    let err = provider.fetch("landscape").await.unwrap_err();
    assert!(matches!(err, WallpaperError::ProviderHttp { .. }));
}

#[tokio::test]
async fn test_unreachable_unsplash_error_hides_credential() {
    let provider =
        UnsplashProvider::new(reqwest::Client::new(), &config_for(REFUSED, REFUSED), credential("secret-key"));

    let err = provider.fetch("landscape").await.unwrap_err();

    assert!(matches!(err, WallpaperError::ProviderHttp { .. }));
    assert!(!err.to_string().contains("secret-key"));
}

#[tokio::test]
async fn test_chain_falls_back_to_secondary_on_server_error() {
    let served = serve_once("500 Internal Server Error", "text/plain", b"boom".to_vec());
    let chain = ProviderChain::standard(
        reqwest::Client::new(),
        &config_for(&served.base_url, "http://pics.local"),
        credential("secret-key"),
    );

    let url = chain.acquire("landscape").await.unwrap();

    assert!(url.starts_with("http://pics.local/1920/1080?random="));
    assert!(served.request_line().starts_with("GET /photos/random"));
}

// ============================================================================
// Preloader
// ============================================================================

#[tokio::test]
async fn test_preloader_accepts_png_and_keeps_a_copy() {
    let served = serve_once("200 OK", "image/png", png_bytes());
    let temp_dir = TempDir::new().unwrap();
    let preloader = HttpPreloader::new(reqwest::Client::new()).with_image_dir(temp_dir.path());

    preloader.preload(&format!("{}/photo.png", served.base_url)).await.unwrap();

    assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 1);
}

#[tokio::test]
async fn test_preloader_rejects_non_image_body() {
    let served = serve_once("200 OK", "text/html", b"<html>not an image</html>".to_vec());
    let preloader = HttpPreloader::new(reqwest::Client::new());
    let url = format!("{}/photo.jpg", served.base_url);

    let err = preloader.preload(&url).await.unwrap_err();

    assert!(matches!(err, WallpaperError::Load { url: ref failed, .. } if *failed == url));
}

#[tokio::test]
async fn test_preloader_rejects_missing_image() {
    let served = serve_once("404 Not Found", "image/png", png_bytes());
    let preloader = HttpPreloader::new(reqwest::Client::new());

    let err = preloader.preload(&format!("{}/gone.png", served.base_url)).await.unwrap_err();
    assert!(err.to_string().contains("404"));
}

// ============================================================================
// Cache over real providers
// ============================================================================

#[tokio::test]
async fn test_cold_start_shows_fetched_image_and_refills_next() {
    let image = serve_once("200 OK", "image/png", png_bytes());
    let image_url = format!("{}/cold.png", image.base_url);
    let api = serve_once(
        "200 OK",
        "application/json",
        format!(r#"{{"urls":{{"regular":"{image_url}"}}}}"#).into_bytes(),
    );

    let store = Arc::new(MemoryStore::new());
    store.set(CREDENTIAL_KEY, "secret-key").unwrap();
    let client = reqwest::Client::new();
    let config = config_for(&api.base_url, REFUSED);
    let spawner = Arc::new(TokioSpawner::new());
    let cache = WallpaperCache::new(
        store.clone(),
        Arc::new(ProviderChain::standard(
            client.clone(),
            &config,
            CredentialSource::new(store.clone(), None),
        )),
        Arc::new(HttpPreloader::new(client)),
        Arc::new(PrintSurface),
        spawner.clone(),
    );

    let backdrop = cache.resolve_display_image().await;
    assert_eq!(backdrop, Backdrop::Image(image_url.clone()));
    assert_eq!(store.get(Slot::Current.key()).unwrap(), Some(image_url));

    // Both one-shot servers are gone now: the refill falls through to the
    // secondary provider and caches its URL even though it cannot preload.
    spawner.wait_idle().await;
    let next = store.get(Slot::Next.key()).unwrap().unwrap();
    assert!(next.starts_with(&format!("{REFUSED}/1920/1080?random=")));
}

#[tokio::test]
async fn test_repeated_loads_keep_only_slot_images_on_disk() {
    const RUNS: usize = 5;

    // Every load preloads twice: the image it shows and the refilled next one.
    let images = serve(RUNS * 2, "200 OK", "image/png", png_bytes());
    let temp_dir = TempDir::new().unwrap();
    let image_dir = temp_dir.path().join("wallpapers");

    let store = Arc::new(MemoryStore::new());
    let client = reqwest::Client::new();
    let config = config_for(REFUSED, &images.base_url);
    let spawner = Arc::new(TokioSpawner::new());
    let cache = WallpaperCache::new(
        store.clone(),
        Arc::new(ProviderChain::standard(
            client.clone(),
            &config,
            CredentialSource::new(store.clone(), None),
        )),
        Arc::new(HttpPreloader::new(client).with_image_dir(&image_dir)),
        Arc::new(PrintSurface),
        spawner.clone(),
    );

    for _ in 0..RUNS {
        assert!(matches!(cache.resolve_display_image().await, Backdrop::Image(_)));
        spawner.wait_idle().await;
    }

    assert_eq!(images.requests.join().unwrap().len(), RUNS * 2);
    let files = std::fs::read_dir(&image_dir).unwrap().count();
    assert!(files <= 2, "expected at most two cached images, found {files}");
    assert!(store.get(Slot::Current.key()).unwrap().is_some());
    assert!(store.get(Slot::Next.key()).unwrap().is_some());
}
