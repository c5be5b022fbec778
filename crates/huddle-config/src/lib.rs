//! huddle configuration.
//!
//! TOML-based configuration for the relay server. Every section uses serde
//! defaults so a partial (or empty) config file works out of the box.

pub mod schema;
pub mod toml_loader;
pub mod validation;

pub use schema::{ChatConfig, HuddleConfig, LogLevel, LoggingConfig, RelayConfig, ServerConfig};

use huddle_common::ConfigError;
use std::path::Path;

/// Load config from an explicit path, or from the platform default path when
/// `path` is `None`.
///
/// An explicit path must exist. The default path is created with a commented
/// template on first run.
pub fn load_config(path: Option<&Path>) -> Result<HuddleConfig, ConfigError> {
    match path {
        Some(p) => toml_loader::load_from_path(p),
        None => toml_loader::load_default(),
    }
}
