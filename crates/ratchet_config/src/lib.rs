//! Parsing and validation of `ratchet.toml` project configuration files.
//!
//! This crate reads the project configuration file and produces a strongly-typed
//! [`RatchetConfig`] describing the output directory, resolver load paths,
//! compile behavior, and retention defaults.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str, CONFIG_FILE};
pub use types::*;
