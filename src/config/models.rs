use crate::humanize::ByteSize;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub mime: MimeConfig,
    #[serde(default)]
    pub transform: TransformConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: SocketAddr,
    /// First path segment of the asset route, e.g. `uploads` for `/uploads/{*path}`
    #[serde(default = "default_route_prefix")]
    pub route_prefix: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            route_prefix: default_route_prefix(),
        }
    }
}

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

fn default_route_prefix() -> String {
    "uploads".to_string()
}

/// Storage provider type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageProvider {
    #[default]
    Local,
    Memory,
}

/// Storage configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub provider: StorageProvider,
    /// Directory served by the local provider
    #[serde(default = "default_storage_root")]
    pub root: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            provider: StorageProvider::default(),
            root: default_storage_root(),
        }
    }
}

fn default_storage_root() -> PathBuf {
    PathBuf::from("uploads")
}

/// Cache metadata attached to successful asset responses
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    #[serde(default = "default_max_age_secs")]
    pub max_age_secs: u64,
    /// Emit `public` so shared caches may store the response
    #[serde(default = "default_public")]
    pub public: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_age_secs: default_max_age_secs(),
            public: default_public(),
        }
    }
}

fn default_max_age_secs() -> u64 {
    2 * 24 * 3600
}

fn default_public() -> bool {
    true
}

/// Content-type registry extension
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MimeConfig {
    /// Optional TOML file with extra `[[mime_map]]` entries
    #[serde(default = "default_map_path")]
    pub map_path: PathBuf,
}

impl Default for MimeConfig {
    fn default() -> Self {
        Self {
            map_path: default_map_path(),
        }
    }
}

fn default_map_path() -> PathBuf {
    PathBuf::from("config/mime-map.toml")
}

/// Thumbnail encoding parameters
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TransformConfig {
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
    /// Upper bound on decoder allocations and on the source bytes buffered for a resize
    #[serde(default = "default_max_decode_bytes")]
    pub max_decode_bytes: ByteSize,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            jpeg_quality: default_jpeg_quality(),
            max_decode_bytes: default_max_decode_bytes(),
        }
    }
}

fn default_jpeg_quality() -> u8 {
    85
}

fn default_max_decode_bytes() -> ByteSize {
    ByteSize(512 * 1024 * 1024)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.server.bind_addr.to_string(), "0.0.0.0:8080");
        assert_eq!(config.server.route_prefix, "uploads");
        assert_eq!(config.storage.provider, StorageProvider::Local);
        assert_eq!(config.cache.max_age_secs, 172_800);
        assert!(config.cache.public);
        assert_eq!(config.transform.jpeg_quality, 85);
        assert_eq!(config.transform.max_decode_bytes.as_u64(), 512 * 1024 * 1024);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
[storage]
provider = "memory"

[transform]
max_decode_bytes = "64MB"
            "#,
        )
        .unwrap();

        assert_eq!(config.storage.provider, StorageProvider::Memory);
        assert_eq!(config.storage.root, PathBuf::from("uploads"));
        assert_eq!(config.transform.max_decode_bytes.as_u64(), 64 * 1024 * 1024);
        assert_eq!(config.transform.jpeg_quality, 85);
    }
}
