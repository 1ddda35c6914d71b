//! Bento - a double-buffered wallpaper cache for the desktop.
//!
//! Each run shows a wallpaper immediately, choosing between an image prepared
//! by the previous run, the image shown last time, and a freshly fetched one,
//! then fetches the image the *next* run will show. The two slots are
//! persisted in a small JSON store so the choice survives restarts.
//!
//! The library exposes the cache and its collaborators; the `bento` binary
//! wires them to the desktop through the CLI.

pub mod cache;
pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod platform;
pub mod schema;
pub mod store;
pub mod wallpaper;
