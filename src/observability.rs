//! Tracing setup plus request and resource accounting

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber, honouring `RUST_LOG` (default `info`)
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Resources whose release must be accounted for on every request path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    /// Byte stream obtained from storage
    Stream,
    /// Decoded pixel buffer
    Image,
}

impl ResourceKind {
    fn as_str(self) -> &'static str {
        match self {
            ResourceKind::Stream => "stream",
            ResourceKind::Image => "image",
        }
    }
}

#[derive(Debug, Default)]
struct ResourceCounters {
    acquired: AtomicU64,
    released: AtomicU64,
}

/// Metrics handle for recording counters
#[derive(Debug, Default)]
pub struct Metrics {
    passthrough: AtomicU64,
    transformed: AtomicU64,
    rejected: AtomicU64,
    streams: ResourceCounters,
    images: ResourceCounters,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn passthrough_served(&self) {
        self.passthrough.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "passthrough", "Metric incremented");
    }

    pub fn transform_served(&self) {
        self.transformed.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "transformed", "Metric incremented");
    }

    pub fn request_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "rejected", "Metric incremented");
    }

    /// Record an acquisition; the returned lease records the release when dropped
    pub fn acquire(self: &Arc<Self>, kind: ResourceKind) -> ResourceLease {
        self.counters(kind).acquired.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(resource = kind.as_str(), "Resource acquired");

        ResourceLease {
            metrics: Arc::clone(self),
            kind,
        }
    }

    fn counters(&self, kind: ResourceKind) -> &ResourceCounters {
        match kind {
            ResourceKind::Stream => &self.streams,
            ResourceKind::Image => &self.images,
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            passthrough: self.passthrough.load(Ordering::Relaxed),
            transformed: self.transformed.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            streams_acquired: self.streams.acquired.load(Ordering::Relaxed),
            streams_released: self.streams.released.load(Ordering::Relaxed),
            images_acquired: self.images.acquired.load(Ordering::Relaxed),
            images_released: self.images.released.load(Ordering::Relaxed),
        }
    }
}

/// Proof of an outstanding resource. Not `Clone`, so each acquisition is released once.
#[derive(Debug)]
pub struct ResourceLease {
    metrics: Arc<Metrics>,
    kind: ResourceKind,
}

impl ResourceLease {
    pub fn kind(&self) -> ResourceKind {
        self.kind
    }
}

impl Drop for ResourceLease {
    fn drop(&mut self) {
        self.metrics
            .counters(self.kind)
            .released
            .fetch_add(1, Ordering::Relaxed);
        tracing::trace!(resource = self.kind.as_str(), "Resource released");
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub passthrough: u64,
    pub transformed: u64,
    pub rejected: u64,
    pub streams_acquired: u64,
    pub streams_released: u64,
    pub images_acquired: u64,
    pub images_released: u64,
}

impl MetricsSnapshot {
    /// Outstanding `(streams, images)`
    pub fn leaks(&self) -> (u64, u64) {
        (
            self.streams_acquired.saturating_sub(self.streams_released),
            self.images_acquired.saturating_sub(self.images_released),
        )
    }
}
