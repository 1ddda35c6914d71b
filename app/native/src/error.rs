//! Error types for Bento.
//!
//! `BentoError` is the type returned across the CLI boundary. Store and
//! wallpaper errors convert into it so command handlers can use `?`.

use thiserror::Error;

use crate::store::StoreError;
use crate::wallpaper::WallpaperError;

/// Errors that can occur while running a CLI command.
#[derive(Debug, Error)]
pub enum BentoError {
    /// Invalid command arguments.
    #[error("{0}")]
    InvalidArguments(String),
    /// Cache operation failed.
    #[error("Cache error: {0}")]
    CacheError(String),
    /// Key-value store operation failed.
    #[error("Store error: {0}")]
    StoreError(String),
    /// Wallpaper operation failed.
    #[error("Wallpaper error: {0}")]
    WallpaperError(String),
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),
    /// Async runtime could not be started.
    #[error("Runtime error: {0}")]
    RuntimeError(String),
    /// Command output could not be produced.
    #[error("Output error: {0}")]
    OutputError(String),
}

impl From<serde_json::Error> for BentoError {
    fn from(err: serde_json::Error) -> Self { Self::OutputError(err.to_string()) }
}

impl From<StoreError> for BentoError {
    fn from(err: StoreError) -> Self { Self::StoreError(err.to_string()) }
}

impl From<WallpaperError> for BentoError {
    fn from(err: WallpaperError) -> Self { Self::WallpaperError(err.to_string()) }
}
