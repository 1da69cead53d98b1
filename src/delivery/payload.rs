use axum::body::Body;
use axum::http::{HeaderValue, header};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;

use super::{AssetStream, CacheDirective, DeliveryError};

/// The single outcome of an asset request
#[derive(Debug)]
pub enum Payload {
    /// Stored bytes, streamed verbatim
    Stream {
        body: AssetStream,
        mime_type: String,
    },
    /// Transformed image, sent as one buffer
    Buffer { bytes: Bytes, mime_type: String },
    Rejected(DeliveryError),
}

fn content_type(mime_type: &str) -> HeaderValue {
    HeaderValue::from_str(mime_type)
        .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"))
}

/// Turn a payload into the HTTP response; successes get `cache` metadata
pub fn emit(payload: Payload, cache: &CacheDirective) -> Response {
    let (mut response, mime_type, length) = match payload {
        Payload::Stream { body, mime_type } => {
            let length = body.size();
            (Response::new(Body::from_stream(body)), mime_type, length)
        }
        Payload::Buffer { bytes, mime_type } => {
            let length = Some(bytes.len() as u64);
            (Response::new(Body::from(bytes)), mime_type, length)
        }
        Payload::Rejected(err) => return err.into_response(),
    };

    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, content_type(&mime_type));
    if let Some(length) = length {
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from(length));
    }

    cache.annotate(&mut response);
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observability::{Metrics, ResourceKind};
    use crate::storage::StoredAsset;
    use axum::http::StatusCode;
    use std::sync::Arc;

    #[tokio::test]
    async fn buffer_payload_sets_headers() {
        let payload = Payload::Buffer {
            bytes: Bytes::from_static(b"thumb"),
            mime_type: "image/png".into(),
        };

        let response = emit(payload, &CacheDirective::default());

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
        assert_eq!(response.headers()[header::CONTENT_LENGTH], "5");
        assert!(response.headers().contains_key(header::CACHE_CONTROL));
    }

    #[tokio::test]
    async fn stream_payload_releases_on_drop() {
        let metrics = Arc::new(Metrics::new());
        let body = AssetStream::new(
            StoredAsset::from_bytes(&b"%PDF-1.7"[..]),
            metrics.acquire(ResourceKind::Stream),
        );

        let response = emit(
            Payload::Stream {
                body,
                mime_type: "application/pdf".into(),
            },
            &CacheDirective::default(),
        );
        assert_eq!(response.headers()[header::CONTENT_LENGTH], "8");
        assert_eq!(metrics.snapshot().leaks(), (1, 0));

        // Client went away before reading the body
        drop(response);
        assert_eq!(metrics.snapshot().leaks(), (0, 0));
    }

    #[test]
    fn rejection_has_no_cache_metadata() {
        let response = emit(
            Payload::Rejected(DeliveryError::AssetNotFound("gone.png".into())),
            &CacheDirective::default(),
        );

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(!response.headers().contains_key(header::CACHE_CONTROL));
        assert!(response.extensions().get::<CacheDirective>().is_none());
    }
}
