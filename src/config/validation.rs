use super::models::{Config, StorageProvider};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("route_prefix must be a non-empty path segment, got '{prefix}'")]
    InvalidRoutePrefix { prefix: String },

    #[error("jpeg_quality must be within 1..=100, got {value}")]
    InvalidJpegQuality { value: u8 },

    #[error("max_decode_bytes must be positive")]
    InvalidDecodeLimit,

    #[error("Local storage provider requires a non-empty root directory")]
    MissingStorageRoot,
}

/// Validate the entire configuration
pub fn validate(config: &Config) -> Result<(), ValidationError> {
    validate_route_prefix(config)?;
    validate_transform(config)?;
    validate_storage(config)?;
    Ok(())
}

/// Route prefix becomes a literal router segment, so placeholders and empty segments are refused
fn validate_route_prefix(config: &Config) -> Result<(), ValidationError> {
    let prefix = config.server.route_prefix.trim_matches('/');

    let invalid = prefix.is_empty()
        || prefix.split('/').any(str::is_empty)
        || prefix.contains(['{', '}', '*', '?', '#']);

    if invalid {
        return Err(ValidationError::InvalidRoutePrefix {
            prefix: config.server.route_prefix.clone(),
        });
    }

    Ok(())
}

fn validate_transform(config: &Config) -> Result<(), ValidationError> {
    let quality = config.transform.jpeg_quality;
    if !(1..=100).contains(&quality) {
        return Err(ValidationError::InvalidJpegQuality { value: quality });
    }

    if config.transform.max_decode_bytes.as_u64() == 0 {
        return Err(ValidationError::InvalidDecodeLimit);
    }

    Ok(())
}

fn validate_storage(config: &Config) -> Result<(), ValidationError> {
    if config.storage.provider == StorageProvider::Local
        && config.storage.root.as_os_str().is_empty()
    {
        return Err(ValidationError::MissingStorageRoot);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::humanize::ByteSize;
    use std::path::PathBuf;

    #[test]
    fn test_valid_config() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_nested_route_prefix_allowed() {
        let mut config = Config::default();
        config.server.route_prefix = "/static/uploads/".to_string();
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_invalid_route_prefix() {
        for prefix in ["", "/", "a//b", "{path}", "files/*rest"] {
            let mut config = Config::default();
            config.server.route_prefix = prefix.to_string();

            let result = validate(&config);
            assert!(
                matches!(result, Err(ValidationError::InvalidRoutePrefix { .. })),
                "prefix {prefix:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_jpeg_quality_range() {
        let mut config = Config::default();
        config.transform.jpeg_quality = 0;
        assert!(matches!(
            validate(&config),
            Err(ValidationError::InvalidJpegQuality { value: 0 })
        ));

        config.transform.jpeg_quality = 101;
        assert!(matches!(
            validate(&config),
            Err(ValidationError::InvalidJpegQuality { value: 101 })
        ));
    }

    #[test]
    fn test_zero_decode_limit() {
        let mut config = Config::default();
        config.transform.max_decode_bytes = ByteSize(0);

        assert!(matches!(
            validate(&config),
            Err(ValidationError::InvalidDecodeLimit)
        ));
    }

    #[test]
    fn test_local_storage_requires_root() {
        let mut config = Config::default();
        config.storage.root = PathBuf::new();
        assert!(matches!(
            validate(&config),
            Err(ValidationError::MissingStorageRoot)
        ));

        config.storage.provider = StorageProvider::Memory;
        assert!(validate(&config).is_ok());
    }
}
