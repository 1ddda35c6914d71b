//! Platform helpers shared by the config loader and the CLI.

pub mod path;
