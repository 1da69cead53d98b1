//! Configuration management for AssetBox
//!
//! This module provides a layered configuration system that loads settings from:
//! 1. Default values (embedded in structs)
//! 2. TOML configuration file
//! 3. Environment variables (highest priority)
//!
//! # Usage
//!
//! ```no_run
//! use assetbox::config::Config;
//!
//! let config = Config::load().expect("Failed to load configuration");
//! println!("Serving /{} on {}", config.server.route_prefix, config.server.bind_addr);
//! ```
//!
//! # Environment Variables
//!
//! Configuration can be overridden using environment variables with the pattern:
//! `ASSETBOX__<section>__<key>`
//!
//! Examples:
//! - `ASSETBOX__SERVER__BIND_ADDR=0.0.0.0:9000`
//! - `ASSETBOX__STORAGE__ROOT=/srv/uploads`
//! - `ASSETBOX__TRANSFORM__MAX_DECODE_BYTES=256MB`
//!
//! # Configuration File
//!
//! By default, the configuration is loaded from `config/assetbox.toml`.
//! This can be overridden using the `ASSETBOX_CONFIG` environment variable
//! or the `--config` command line flag.

mod models;
mod sources;
mod validation;

pub use crate::humanize::ByteSize;
pub use models::{
    CacheConfig, Config, MimeConfig, ServerConfig, StorageConfig, StorageProvider,
    TransformConfig,
};
pub use validation::ValidationError;

use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] ValidationError),
}

impl Config {
    /// Load configuration from all sources (file + environment)
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file is malformed or validation fails.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(None)
    }

    /// Same as [`Config::load`], with an explicit file taking precedence over `ASSETBOX_CONFIG`
    pub fn load_with(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let config = sources::load(explicit)?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific path
    ///
    /// Useful for testing with custom configuration files.
    pub fn load_from_path(path: std::path::PathBuf) -> Result<Self, ConfigError> {
        let config = sources::load_from_sources(path)?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Route prefix without surrounding slashes
    pub fn route_prefix(&self) -> &str {
        self.server.route_prefix.trim_matches('/')
    }
}
