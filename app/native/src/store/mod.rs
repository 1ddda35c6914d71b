//! Persistent key-value storage for wallpaper slots and provider settings.
//!
//! The store is a flat string-to-string map. Each call is an independent,
//! atomic single-key operation; callers never hold a transaction across
//! calls. Two processes writing the same key resolve last-write-wins.

mod file;
mod memory;

use std::path::PathBuf;

use thiserror::Error;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Store key holding the primary provider credential.
pub const CREDENTIAL_KEY: &str = "provider.credential";

/// Errors raised by a key-value store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing file could not be read or written.
    #[error("store I/O failed: {0}")]
    Io(#[from] std::io::Error),
    /// The backing file exists but does not contain a JSON string map.
    #[error("store file {path} is corrupt: {source}")]
    Corrupt {
        /// Path of the offending file.
        path: PathBuf,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },
}

/// A persistent string key-value store.
///
/// Implementations must make every method atomic with respect to other
/// calls on the same store.
pub trait KeyValueStore: Send + Sync {
    /// Returns the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Removes `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// One of the two wallpaper buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    /// The wallpaper shown on the most recent load.
    Current,
    /// The wallpaper prepared for the following load.
    Next,
}

impl Slot {
    /// Both slots, in display priority order.
    pub const ALL: [Self; 2] = [Self::Next, Self::Current];

    /// Store key backing this slot.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Current => "wallpaper.current",
            Self::Next => "wallpaper.next",
        }
    }

    /// Short lowercase name for logs and CLI output.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Current => "current",
            Self::Next => "next",
        }
    }
}

impl std::fmt::Display for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.write_str(self.name()) }
}
