use bon::Builder;
use bytes::Bytes;
use std::sync::Arc;

use tokio::task::JoinError;

use super::stream::DrainError;
use super::{AssetRequest, AssetStream, DeliveryError, Payload};
use crate::content_type::{ContentTypeRegistry, extension_of};
use crate::imaging::{self, Bounds, Dimensions, ImagingError, RasterFormat, TransformSettings};
use crate::observability::{Metrics, ResourceKind};
use crate::storage::StorageGateway;

/// First prefix handed to the probe; doubled until the header parses
const PROBE_INITIAL_PREFIX: usize = 8 * 1024;

/// A header not found within this many bytes is treated as undecodable
const MAX_PROBE_PREFIX: usize = 4 * 1024 * 1024;

/// Decides which bytes answer an asset request.
///
/// Unknown extension and storage miss reject before any decode. Non-raster
/// assets, or requests without a width, stream the stored bytes untouched.
/// Raster assets with a width are probed; those already within bounds are
/// streamed untouched, the rest are resized on a blocking thread.
#[derive(Builder)]
pub struct AssetService {
    registry: Arc<ContentTypeRegistry>,
    storage: Arc<dyn StorageGateway>,
    #[builder(default)]
    settings: TransformSettings,
    #[builder(default = Arc::new(Metrics::new()))]
    metrics: Arc<Metrics>,
}

impl AssetService {
    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.metrics
    }

    pub fn registry(&self) -> &ContentTypeRegistry {
        &self.registry
    }

    pub async fn resolve(&self, request: &AssetRequest) -> Payload {
        match self.try_resolve(request).await {
            Ok(payload) => payload,
            Err(err) => {
                self.metrics.request_rejected();
                if err.is_not_found() {
                    tracing::debug!(path = %request.path, error = %err, "Asset request rejected");
                } else {
                    tracing::warn!(path = %request.path, error = %err, "Asset request failed");
                }
                Payload::Rejected(err)
            }
        }
    }

    async fn try_resolve(&self, request: &AssetRequest) -> Result<Payload, DeliveryError> {
        let path = request.path.as_str();

        let (extension, mime_type) = extension_of(path)
            .and_then(|ext| Some((ext, self.registry.resolve(ext)?.to_string())))
            .ok_or_else(|| DeliveryError::UnknownExtension(path.to_string()))?;

        let plan = match RasterFormat::from_extension(extension) {
            Some(format) => request.bounds()?.map(|bounds| (format, bounds)),
            None => None,
        };

        let asset = self.storage.read_asset(path).await.map_err(|err| {
            if err.is_not_found() {
                tracing::debug!(path, error = %err, "Asset missing from storage");
            } else {
                tracing::warn!(path, error = %err, "Storage read failed");
            }
            DeliveryError::AssetNotFound(path.to_string())
        })?;
        let mut stream = AssetStream::new(asset, self.metrics.acquire(ResourceKind::Stream));

        let Some((format, bounds)) = plan else {
            return Ok(self.passthrough(stream, mime_type));
        };

        let dimensions = probe_prefix(path, &mut stream, format).await?;

        if bounds.contains(dimensions) {
            tracing::debug!(
                path,
                width = dimensions.width,
                height = dimensions.height,
                "Source within bounds"
            );
            return Ok(self.passthrough(stream, mime_type));
        }

        let limit = self.settings.max_decode_bytes;
        let source = stream.drain(limit).await.map_err(|err| match err {
            DrainError::TooLarge { limit } => DeliveryError::SourceTooLarge {
                path: path.to_string(),
                limit,
            },
            DrainError::Io(err) => {
                tracing::warn!(path, error = %err, "Storage stream failed while buffering");
                DeliveryError::AssetNotFound(path.to_string())
            }
        })?;

        let bytes = self.transform(path, source, format, bounds).await?;
        self.metrics.transform_served();
        tracing::info!(
            path,
            max_width = bounds.max_width,
            max_height = ?bounds.max_height,
            size = bytes.len(),
            "Serving resized image"
        );

        Ok(Payload::Buffer { bytes, mime_type })
    }

    fn passthrough(&self, body: AssetStream, mime_type: String) -> Payload {
        self.metrics.passthrough_served();
        Payload::Stream { body, mime_type }
    }

    /// Decode, resize and encode off the async runtime
    async fn transform(
        &self,
        path: &str,
        source: Bytes,
        format: RasterFormat,
        bounds: Bounds,
    ) -> Result<Bytes, DeliveryError> {
        let metrics = Arc::clone(&self.metrics);
        let settings = self.settings;

        let result = tokio::task::spawn_blocking(move || {
            let decoded = imaging::decode(&source, format, settings.max_decode_bytes, &metrics)?;
            imaging::transform(decoded, bounds, format, &settings)
        })
        .await;

        settle(path, result)
    }
}

/// Probe dimensions from as short a prefix of `stream` as the codec allows.
///
/// The pulled prefix stays buffered in the stream, so a passthrough still
/// emits the asset from its first byte.
async fn probe_prefix(
    path: &str,
    stream: &mut AssetStream,
    format: RasterFormat,
) -> Result<Dimensions, DeliveryError> {
    let mut target = PROBE_INITIAL_PREFIX;

    loop {
        let prefix = stream.fill(target).await.map_err(|err| {
            tracing::warn!(path, error = %err, "Storage stream failed while probing");
            DeliveryError::AssetNotFound(path.to_string())
        })?;
        let pulled = prefix.len();

        match imaging::probe(prefix, format) {
            Ok(dimensions) => return Ok(dimensions),
            Err(source) if stream.is_exhausted() || pulled >= MAX_PROBE_PREFIX => {
                return Err(DeliveryError::DecodeFailure {
                    path: path.to_string(),
                    source,
                });
            }
            Err(_) => target = (target * 2).min(MAX_PROBE_PREFIX),
        }
    }
}

/// Map the outcome of the blocking decode and encode task
fn settle(
    path: &str,
    result: Result<Result<Vec<u8>, ImagingError>, JoinError>,
) -> Result<Bytes, DeliveryError> {
    match result {
        Ok(Ok(encoded)) => Ok(Bytes::from(encoded)),
        Ok(Err(source @ ImagingError::Decode(_))) => Err(DeliveryError::DecodeFailure {
            path: path.to_string(),
            source,
        }),
        Ok(Err(err)) => Err(DeliveryError::TransformFailure {
            path: path.to_string(),
            reason: err.to_string(),
        }),
        Err(join_err) => Err(DeliveryError::TransformFailure {
            path: path.to_string(),
            reason: join_err.to_string(),
        }),
    }
}
