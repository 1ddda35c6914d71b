//! Image providers and the ordered fallback chain.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::WallpaperError;
use crate::config::WallpaperConfig;
use crate::constants::UNSPLASH_KEY_PLACEHOLDER;
use crate::store::{CREDENTIAL_KEY, KeyValueStore};

/// A source of wallpaper image URLs.
#[async_trait]
pub trait WallpaperProvider: Send + Sync {
    /// Short name for logging.
    fn name(&self) -> &'static str;

    /// Returns the URL of a new image for `topic`.
    async fn fetch(&self, topic: &str) -> Result<String, WallpaperError>;
}

/// Returns whether `value` is a real credential rather than blank or the
/// sample placeholder.
#[must_use]
pub fn is_usable_credential(value: &str) -> bool {
    let value = value.trim();
    !value.is_empty() && value != UNSPLASH_KEY_PLACEHOLDER
}

/// Resolves the primary provider credential at request time.
///
/// The store's `provider.credential` wins; the key loaded from the API keys
/// file is used otherwise.
#[derive(Clone)]
pub struct CredentialSource {
    store: Arc<dyn KeyValueStore>,
    fallback: Option<String>,
}

impl CredentialSource {
    /// Creates a source reading from `store`, with `fallback` as the
    /// env-file key.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>, fallback: Option<String>) -> Self {
        Self { store, fallback }
    }

    /// Returns the usable credential, if any.
    #[must_use]
    pub fn resolve(&self) -> Option<String> {
        let stored = self.store.get(CREDENTIAL_KEY).unwrap_or_else(|err| {
            tracing::warn!(error = %err, "provider: failed to read stored credential");
            None
        });

        stored
            .filter(|key| is_usable_credential(key))
            .or_else(|| self.fallback.clone().filter(|key| is_usable_credential(key)))
            .map(|key| key.trim().to_string())
    }
}

#[derive(Debug, Deserialize)]
struct RandomPhoto {
    #[serde(default)]
    urls: Option<PhotoUrls>,
}

#[derive(Debug, Deserialize)]
struct PhotoUrls {
    #[serde(default)]
    regular: Option<String>,
    #[serde(default)]
    full: Option<String>,
}

/// Extracts the image URL from an Unsplash random-photo response,
/// preferring `urls.regular` over `urls.full`. Empty strings don't count.
#[must_use]
pub fn parse_photo_url(body: &[u8]) -> Option<String> {
    let photo: RandomPhoto = serde_json::from_slice(body).ok()?;
    let urls = photo.urls?;
    let non_empty = |url: Option<String>| url.filter(|u| !u.trim().is_empty());

    non_empty(urls.regular).or_else(|| non_empty(urls.full))
}

/// Primary provider: a random photo from the Unsplash API.
pub struct UnsplashProvider {
    client: Client,
    base_url: String,
    orientation: String,
    content_filter: String,
    credential: CredentialSource,
}

impl UnsplashProvider {
    /// Creates a provider from the wallpaper configuration.
    #[must_use]
    pub fn new(client: Client, config: &WallpaperConfig, credential: CredentialSource) -> Self {
        Self {
            client,
            base_url: config.primary_url.trim_end_matches('/').to_string(),
            orientation: config.orientation.clone(),
            content_filter: config.content_filter.clone(),
            credential,
        }
    }

    fn http_error(reason: impl Into<String>) -> WallpaperError {
        WallpaperError::ProviderHttp { provider: "unsplash", reason: reason.into() }
    }
}

#[async_trait]
impl WallpaperProvider for UnsplashProvider {
    fn name(&self) -> &'static str { "unsplash" }

    async fn fetch(&self, topic: &str) -> Result<String, WallpaperError> {
        let key = self.credential.resolve().ok_or(WallpaperError::NotConfigured)?;

        let response = self
            .client
            .get(format!("{}/photos/random", self.base_url))
            .query(&[
                ("orientation", self.orientation.as_str()),
                ("query", topic),
                ("content_filter", self.content_filter.as_str()),
                ("client_id", key.as_str()),
            ])
            .send()
            .await
            // The URL carries the access key; keep it out of error messages.
            .map_err(|err| Self::http_error(err.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::http_error(format!("HTTP {status}")));
        }

        let body = response
            .bytes()
            .await
            .map_err(|err| Self::http_error(err.without_url().to_string()))?;

        parse_photo_url(&body).ok_or_else(|| Self::http_error("response has no image URL"))
    }
}

/// Secondary provider: Lorem Picsum, which serves a random image for any
/// URL. Never fails; the cache-busting token makes each URL distinct.
pub struct PicsumProvider {
    base_url: String,
    width: u32,
    height: u32,
    last_token: AtomicU64,
}

impl PicsumProvider {
    /// Creates a provider from the wallpaper configuration.
    #[must_use]
    pub fn new(config: &WallpaperConfig) -> Self {
        Self {
            base_url: config.fallback_url.trim_end_matches('/').to_string(),
            width: config.width,
            height: config.height,
            last_token: AtomicU64::new(0),
        }
    }

    /// Returns the current time in milliseconds, bumped past the last token
    /// handed out so two calls in the same millisecond still differ.
    fn next_token(&self) -> u64 {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX));

        let bump = |last: u64| now.max(last.saturating_add(1));
        let previous = self
            .last_token
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| Some(bump(last)))
            .unwrap_or_else(|last| last);

        bump(previous)
    }

    fn url_for(&self, token: u64) -> String {
        format!("{}/{}/{}?random={token}", self.base_url, self.width, self.height)
    }
}

#[async_trait]
impl WallpaperProvider for PicsumProvider {
    fn name(&self) -> &'static str { "picsum" }

    async fn fetch(&self, _topic: &str) -> Result<String, WallpaperError> {
        Ok(self.url_for(self.next_token()))
    }
}

/// Providers tried in order until one returns a URL.
pub struct ProviderChain {
    providers: Vec<Box<dyn WallpaperProvider>>,
}

impl ProviderChain {
    /// Creates a chain from providers in priority order.
    #[must_use]
    pub fn new(providers: Vec<Box<dyn WallpaperProvider>>) -> Self { Self { providers } }

    /// The standard chain: Unsplash, then Picsum.
    #[must_use]
    pub fn standard(client: Client, config: &WallpaperConfig, credential: CredentialSource) -> Self {
        Self::new(vec![
            Box::new(UnsplashProvider::new(client, config, credential)),
            Box::new(PicsumProvider::new(config)),
        ])
    }

    /// Provider names in priority order.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> { self.providers.iter().map(|p| p.name()).collect() }

    /// Returns the first URL any provider produces.
    ///
    /// # Errors
    ///
    /// Returns `WallpaperError::AcquisitionExhausted` if every provider fails.
    pub async fn acquire(&self, topic: &str) -> Result<String, WallpaperError> {
        for provider in &self.providers {
            match provider.fetch(topic).await {
                Ok(url) => {
                    tracing::debug!(provider = provider.name(), url = %url, "provider: acquired image");
                    return Ok(url);
                }
                Err(WallpaperError::NotConfigured) => {
                    tracing::debug!(provider = provider.name(), "provider: not configured, skipping");
                }
                Err(err) => {
                    tracing::warn!(provider = provider.name(), error = %err, "provider: fetch failed");
                }
            }
        }

        Err(WallpaperError::AcquisitionExhausted)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use super::*;
    use crate::store::MemoryStore;

    struct CountingProvider {
        calls: Arc<AtomicUsize>,
        result: Option<&'static str>,
    }

    #[async_trait]
    impl WallpaperProvider for CountingProvider {
        fn name(&self) -> &'static str { "counting" }

        async fn fetch(&self, _topic: &str) -> Result<String, WallpaperError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.map(str::to_string).ok_or(WallpaperError::ProviderHttp {
                provider: "counting",
                reason: "HTTP 500 Internal Server Error".to_string(),
            })
        }
    }

    fn credential(stored: Option<&str>, fallback: Option<&str>) -> CredentialSource {
        let store = MemoryStore::new();
        if let Some(value) = stored {
            store.set(CREDENTIAL_KEY, value).unwrap();
        }
        CredentialSource::new(Arc::new(store), fallback.map(str::to_string))
    }

    #[test]
    fn test_is_usable_credential() {
        assert!(is_usable_credential("abc123"));
        assert!(!is_usable_credential(""));
        assert!(!is_usable_credential("   "));
        assert!(!is_usable_credential("YOUR_UNSPLASH_KEY"));
    }

    #[test]
    fn test_credential_prefers_store() {
        assert_eq!(credential(Some("stored"), Some("env")).resolve().as_deref(), Some("stored"));
    }

    #[test]
    fn test_credential_placeholder_in_store_falls_back_to_env() {
        let source = credential(Some("YOUR_UNSPLASH_KEY"), Some(" env-key "));
        assert_eq!(source.resolve().as_deref(), Some("env-key"));
    }

    #[test]
    fn test_credential_absent() {
        assert_eq!(credential(None, None).resolve(), None);
        assert_eq!(credential(None, Some("YOUR_UNSPLASH_KEY")).resolve(), None);
    }

    #[test]
    fn test_parse_photo_url_prefers_regular() {
        let body = br#"{"id":"x","urls":{"full":"https://f","regular":"https://r"}}"#;
        assert_eq!(parse_photo_url(body).as_deref(), Some("https://r"));
    }

    #[test]
    fn test_parse_photo_url_falls_back_to_full() {
        assert_eq!(parse_photo_url(br#"{"urls":{"full":"https://f"}}"#).as_deref(), Some("https://f"));
        assert_eq!(
            parse_photo_url(br#"{"urls":{"regular":"","full":"https://f"}}"#).as_deref(),
            Some("https://f")
        );
    }

    #[test]
    fn test_parse_photo_url_rejects_malformed_bodies() {
        assert_eq!(parse_photo_url(b"not json"), None);
        assert_eq!(parse_photo_url(br#"{"errors":["OAuth error"]}"#), None);
        assert_eq!(parse_photo_url(br#"{"urls":{}}"#), None);
        assert_eq!(parse_photo_url(br#"[]"#), None);
    }

    #[tokio::test]
    async fn test_unsplash_without_credential_is_not_configured() {
        // Nothing listens on the discard port; reaching the network would
        // produce a ProviderHttp error instead.
        let config = WallpaperConfig {
            primary_url: "http://127.0.0.1:9".to_string(),
            ..Default::default()
        };
        let provider = UnsplashProvider::new(Client::new(), &config, credential(None, None));

        let result = provider.fetch("landscape").await;
        assert!(matches!(result, Err(WallpaperError::NotConfigured)));
    }

    #[tokio::test]
    async fn test_picsum_urls_are_distinct_and_templated() {
        let provider = PicsumProvider::new(&WallpaperConfig::default());

        let first = provider.fetch("ignored").await.unwrap();
        let second = provider.fetch("ignored").await.unwrap();

        assert!(first.starts_with("https://picsum.photos/1920/1080?random="));
        assert_ne!(first, second);
    }

    #[test]
    fn test_picsum_tokens_strictly_increase() {
        let provider = PicsumProvider::new(&WallpaperConfig::default());
        let tokens: Vec<u64> = (0..50).map(|_| provider.next_token()).collect();
        assert!(tokens.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[tokio::test]
    async fn test_chain_falls_through_in_order() {
        let first_calls = Arc::new(AtomicUsize::new(0));
        let second_calls = Arc::new(AtomicUsize::new(0));
        let chain = ProviderChain::new(vec![
            Box::new(CountingProvider { calls: Arc::clone(&first_calls), result: None }),
            Box::new(CountingProvider {
                calls: Arc::clone(&second_calls),
                result: Some("https://img/second"),
            }),
        ]);

        assert_eq!(chain.acquire("topic").await.unwrap(), "https://img/second");
        assert_eq!(first_calls.load(Ordering::SeqCst), 1);
        assert_eq!(second_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_chain_stops_at_first_success() {
        let second_calls = Arc::new(AtomicUsize::new(0));
        let chain = ProviderChain::new(vec![
            Box::new(CountingProvider {
                calls: Arc::new(AtomicUsize::new(0)),
                result: Some("https://img/first"),
            }),
            Box::new(CountingProvider { calls: Arc::clone(&second_calls), result: None }),
        ]);

        assert_eq!(chain.acquire("topic").await.unwrap(), "https://img/first");
        assert_eq!(second_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_chain_exhausted() {
        let chain = ProviderChain::new(vec![Box::new(CountingProvider {
            calls: Arc::new(AtomicUsize::new(0)),
            result: None,
        })]);
        assert!(matches!(chain.acquire("topic").await, Err(WallpaperError::AcquisitionExhausted)));

        let empty = ProviderChain::new(Vec::new());
        assert!(matches!(empty.acquire("topic").await, Err(WallpaperError::AcquisitionExhausted)));
    }

    #[tokio::test]
    async fn test_standard_chain_without_credential_uses_picsum() {
        let config = WallpaperConfig {
            primary_url: "http://127.0.0.1:9".to_string(),
            ..Default::default()
        };
        let chain = ProviderChain::standard(Client::new(), &config, credential(None, None));

        assert_eq!(chain.names(), vec!["unsplash", "picsum"]);
        let url = chain.acquire("landscape").await.unwrap();
        assert!(url.contains("picsum.photos"));
        assert!(url.contains("random="));
    }
}
