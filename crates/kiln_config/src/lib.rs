//! Parsing and validation of `kiln.toml` project configuration files.
//!
//! This crate reads the project configuration file and produces a strongly-typed
//! [`KilnConfig`], then resolves its relative paths against the project directory.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod resolve;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str, CONFIG_FILE};
pub use resolve::{resolve_assets, ResolvedAssets};
pub use types::*;
