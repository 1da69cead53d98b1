//! Optional mapping file extending the built-in table
//!
//! ```toml
//! [[mime_map]]
//! file_extension = ".apk"
//! mime_type = "application/vnd.android.package-archive"
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MappingError {
    #[error("failed to read mapping file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse mapping file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MappingFile {
    #[serde(default)]
    pub mime_map: Vec<MimeMapEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MimeMapEntry {
    pub file_extension: String,
    pub mime_type: String,
}

impl MappingFile {
    pub fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// `Ok(None)` when the file does not exist
    pub fn read(path: &Path) -> Result<Option<Self>, MappingError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(MappingError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        Self::parse(&contents)
            .map(Some)
            .map_err(|source| MappingError::Parse {
                path: path.to_path_buf(),
                source,
            })
    }
}
