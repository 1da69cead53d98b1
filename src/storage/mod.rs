//! Storage gateway for served assets
//! Uses Apache Arrow object_store crate

use async_trait::async_trait;
use bytes::Bytes;
use futures::{StreamExt, stream::BoxStream};
use object_store::{ObjectStore, local::LocalFileSystem, path::Path as StoragePath};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

use crate::config::{StorageConfig, StorageProvider};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid asset path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("Object store error: {0}")]
    ObjectStoreError(#[from] object_store::Error),
}

impl StorageError {
    /// Missing objects and paths that cannot name one; anything else is a backend fault
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StorageError::NotFound(_) | StorageError::InvalidPath { .. }
        )
    }
}

/// Storage result type
pub type Result<T> = std::result::Result<T, StorageError>;

/// Incremental body of a stored object
pub type ByteStream = BoxStream<'static, std::io::Result<Bytes>>;

/// An opened asset: its byte stream plus the size when the backend reports it
pub struct StoredAsset {
    pub stream: ByteStream,
    pub size: Option<u64>,
}

impl std::fmt::Debug for StoredAsset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoredAsset")
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

impl StoredAsset {
    /// Asset backed by an in-memory buffer
    pub fn from_bytes(data: impl Into<Bytes>) -> Self {
        let data = data.into();
        let size = data.len() as u64;
        Self {
            stream: futures::stream::once(async move { Ok::<_, std::io::Error>(data) }).boxed(),
            size: Some(size),
        }
    }
}

/// Resolves a logical asset path to a readable byte stream
#[async_trait]
pub trait StorageGateway: Send + Sync {
    async fn read_asset(&self, path: &str) -> Result<StoredAsset>;
}

/// Storage client wrapping object_store
#[derive(Clone)]
pub struct StorageClient {
    store: Arc<dyn ObjectStore>,
}

impl StorageClient {
    /// Create new storage client with any object_store backend
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    /// Create in-memory storage for testing/development
    pub fn in_memory() -> Self {
        Self::new(Arc::new(object_store::memory::InMemory::new()))
    }

    /// Serve files below `root`; the directory must exist
    pub fn local(root: &Path) -> Result<Self> {
        let store = LocalFileSystem::new_with_prefix(root)?;
        Ok(Self::new(Arc::new(store)))
    }

    pub fn from_config(config: &StorageConfig) -> Result<Self> {
        match config.provider {
            StorageProvider::Local => Self::local(&config.root),
            StorageProvider::Memory => Ok(Self::in_memory()),
        }
    }

    /// Upload bytes to storage
    pub async fn upload(&self, key: &str, data: impl Into<Bytes>) -> Result<usize> {
        let path = parse_path(key)?;
        let data: Bytes = data.into();
        let size = data.len();

        self.store.put(&path, data.into()).await?;

        tracing::info!(key, size, "Uploaded to storage");
        Ok(size)
    }
}

/// Reject traversal segments and empty parts instead of silently escaping them
fn parse_path(key: &str) -> Result<StoragePath> {
    StoragePath::parse(key.trim_matches('/')).map_err(|err| StorageError::InvalidPath {
        path: key.to_string(),
        reason: err.to_string(),
    })
}

#[async_trait]
impl StorageGateway for StorageClient {
    async fn read_asset(&self, key: &str) -> Result<StoredAsset> {
        let path = parse_path(key)?;

        let result = match self.store.get(&path).await {
            Ok(result) => result,
            Err(object_store::Error::NotFound { .. }) => {
                return Err(StorageError::NotFound(key.to_string()));
            }
            Err(err) => return Err(err.into()),
        };

        let size = result.meta.size;
        tracing::debug!(key, size, "Opened asset stream");

        let stream = result
            .into_stream()
            .map(|chunk| chunk.map_err(std::io::Error::other))
            .boxed();

        Ok(StoredAsset {
            stream,
            size: Some(size),
        })
    }
}
