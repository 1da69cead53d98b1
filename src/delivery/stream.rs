use bytes::{Bytes, BytesMut};
use futures::{Stream, StreamExt, TryStreamExt};
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};
use thiserror::Error;

use crate::observability::ResourceLease;
use crate::storage::{ByteStream, StoredAsset};

/// Cap on capacity reserved up front from a backend-reported size
const MAX_PREALLOCATION: u64 = 64 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum DrainError {
    #[error("asset exceeds the {limit} byte buffer limit")]
    TooLarge { limit: u64 },

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// A storage stream owned by one request.
///
/// Bytes pulled ahead with [`fill`](Self::fill) stay in front of the live
/// stream and are emitted first, so a peeked stream still yields the asset
/// from its first byte. Holds the stream's resource lease; the release is
/// recorded when the stream is dropped, by the handler or by the transport
/// once the response body completes or the client disconnects.
pub struct AssetStream {
    buffer: BytesMut,
    live: Option<ByteStream>,
    size: Option<u64>,
    _lease: ResourceLease,
}

impl AssetStream {
    pub fn new(asset: StoredAsset, lease: ResourceLease) -> Self {
        Self {
            buffer: BytesMut::new(),
            live: Some(asset.stream),
            size: asset.size,
            _lease: lease,
        }
    }

    /// Byte length, when known
    pub fn size(&self) -> Option<u64> {
        self.size
    }

    /// Whether the underlying storage stream has ended
    pub fn is_exhausted(&self) -> bool {
        self.live.is_none()
    }

    /// Pull chunks until at least `target` bytes are buffered or the stream ends.
    ///
    /// Returns the buffered prefix, which may be shorter than `target` only
    /// once the stream is exhausted.
    pub async fn fill(&mut self, target: usize) -> io::Result<&[u8]> {
        while self.buffer.len() < target {
            let Some(live) = self.live.as_mut() else {
                break;
            };
            let next = live.try_next().await?;
            match next {
                Some(chunk) => self.buffer.extend_from_slice(&chunk),
                None => self.live = None,
            }
        }
        Ok(&self.buffer)
    }

    /// Read the whole asset into memory, refusing more than `limit` bytes
    pub async fn drain(mut self, limit: u64) -> Result<Bytes, DrainError> {
        if self.size.is_some_and(|size| size > limit) {
            return Err(DrainError::TooLarge { limit });
        }

        let expected = self.size.unwrap_or(0).min(MAX_PREALLOCATION) as usize;
        self.buffer.reserve(expected.saturating_sub(self.buffer.len()));

        if let Some(mut live) = self.live.take() {
            while let Some(chunk) = live.try_next().await? {
                if (self.buffer.len() + chunk.len()) as u64 > limit {
                    return Err(DrainError::TooLarge { limit });
                }
                self.buffer.extend_from_slice(&chunk);
            }
        }

        Ok(self.buffer.split().freeze())
    }
}

impl Stream for AssetStream {
    type Item = io::Result<Bytes>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if !this.buffer.is_empty() {
            return Poll::Ready(Some(Ok(this.buffer.split().freeze())));
        }

        let Some(live) = this.live.as_mut() else {
            return Poll::Ready(None);
        };
        let next = live.poll_next_unpin(cx);
        if let Poll::Ready(None) = next {
            this.live = None;
        }
        next
    }
}

impl std::fmt::Debug for AssetStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetStream")
            .field("size", &self.size)
            .field("buffered", &self.buffer.len())
            .field("exhausted", &self.is_exhausted())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observability::{Metrics, ResourceKind};
    use std::sync::Arc;

    fn chunked(parts: &[&'static [u8]]) -> StoredAsset {
        let chunks: Vec<io::Result<Bytes>> =
            parts.iter().map(|part| Ok(Bytes::from_static(part))).collect();
        StoredAsset {
            stream: futures::stream::iter(chunks).boxed(),
            size: None,
        }
    }

    #[tokio::test]
    async fn streams_chunks_in_order() {
        let metrics = Arc::new(Metrics::new());
        let stream = AssetStream::new(
            chunked(&[b"ab", b"cd", b"e"]),
            metrics.acquire(ResourceKind::Stream),
        );

        let chunks: Vec<Bytes> = stream.try_collect().await.unwrap();
        assert_eq!(chunks.concat(), b"abcde");
        assert_eq!(metrics.snapshot().leaks(), (0, 0));
    }

    #[tokio::test]
    async fn fill_pulls_only_what_is_needed() {
        let metrics = Arc::new(Metrics::new());
        let mut stream = AssetStream::new(
            chunked(&[b"hel", b"lo ", b"wor", b"ld"]),
            metrics.acquire(ResourceKind::Stream),
        );

        assert_eq!(stream.fill(4).await.unwrap(), b"hello ");
        assert!(!stream.is_exhausted());

        // Already satisfied
        assert_eq!(stream.fill(2).await.unwrap(), b"hello ");

        // The peeked prefix is emitted ahead of the rest
        let replayed: Vec<Bytes> = (&mut stream).try_collect().await.unwrap();
        assert_eq!(replayed.concat(), b"hello world");
        assert!(stream.is_exhausted());
        assert_eq!(metrics.snapshot().leaks(), (1, 0));

        drop(stream);
        assert_eq!(metrics.snapshot().leaks(), (0, 0));
    }

    #[tokio::test]
    async fn fill_stops_at_end_of_stream() {
        let metrics = Arc::new(Metrics::new());
        let mut stream =
            AssetStream::new(chunked(&[b"tiny"]), metrics.acquire(ResourceKind::Stream));

        assert_eq!(stream.fill(1024).await.unwrap(), b"tiny");
        assert!(stream.is_exhausted());
    }

    #[tokio::test]
    async fn drain_keeps_peeked_prefix() {
        let metrics = Arc::new(Metrics::new());
        let mut stream = AssetStream::new(
            chunked(&[b"hello ", b"world"]),
            metrics.acquire(ResourceKind::Stream),
        );

        stream.fill(1).await.unwrap();
        let contents = stream.drain(1024).await.unwrap();

        assert_eq!(&contents[..], b"hello world");
        assert_eq!(metrics.snapshot().leaks(), (0, 0));
    }

    #[tokio::test]
    async fn drain_refuses_reported_size_over_limit() {
        let metrics = Arc::new(Metrics::new());
        let stream = AssetStream::new(
            StoredAsset::from_bytes(vec![0u8; 64]),
            metrics.acquire(ResourceKind::Stream),
        );

        let err = stream.drain(16).await.unwrap_err();
        assert!(matches!(err, DrainError::TooLarge { limit: 16 }));
        assert_eq!(metrics.snapshot().leaks(), (0, 0));
    }

    #[tokio::test]
    async fn drain_refuses_unreported_size_over_limit() {
        let metrics = Arc::new(Metrics::new());
        let stream = AssetStream::new(
            chunked(&[b"1234", b"5678", b"9"]),
            metrics.acquire(ResourceKind::Stream),
        );

        assert!(matches!(
            stream.drain(8).await,
            Err(DrainError::TooLarge { limit: 8 })
        ));
    }

    #[tokio::test]
    async fn read_error_propagates_and_still_releases() {
        let metrics = Arc::new(Metrics::new());
        let failing: Vec<io::Result<Bytes>> = vec![
            Ok(Bytes::from_static(b"partial")),
            Err(io::Error::other("disk on fire")),
        ];
        let asset = StoredAsset {
            stream: futures::stream::iter(failing).boxed(),
            size: Some(100),
        };

        let mut stream = AssetStream::new(asset, metrics.acquire(ResourceKind::Stream));
        assert!(stream.fill(1024).await.is_err());

        drop(stream);
        assert_eq!(metrics.snapshot().leaks(), (0, 0));
    }

    #[tokio::test]
    async fn drain_propagates_read_error() {
        let metrics = Arc::new(Metrics::new());
        let failing: Vec<io::Result<Bytes>> = vec![Err(io::Error::other("connection reset"))];
        let asset = StoredAsset {
            stream: futures::stream::iter(failing).boxed(),
            size: None,
        };

        let stream = AssetStream::new(asset, metrics.acquire(ResourceKind::Stream));
        assert!(matches!(stream.drain(1024).await, Err(DrainError::Io(_))));
        assert_eq!(metrics.snapshot().leaks(), (0, 0));
    }
}
