//! Cache metadata for the external HTTP cache layer

use axum::http::{HeaderValue, header};
use axum::response::Response;
use std::time::Duration;

use crate::config::CacheConfig;

/// Query parameters that partition cache entries for the same path
pub const VARY_BY_QUERY: &[&str] = &["w", "h"];

/// Lifetime and cache-key variance attached to successful responses.
///
/// Inserted into the response extensions as-is; a caching layer keys on the
/// path plus the [`VARY_BY_QUERY`] values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheDirective {
    pub max_age: Duration,
    pub public: bool,
    pub vary_by_query: &'static [&'static str],
}

impl CacheDirective {
    pub fn new(max_age: Duration, public: bool) -> Self {
        Self {
            max_age,
            public,
            vary_by_query: VARY_BY_QUERY,
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(Duration::from_secs(config.max_age_secs), config.public)
    }

    pub fn cache_control(&self) -> HeaderValue {
        let visibility = if self.public { "public" } else { "private" };
        let value = format!("{visibility}, max-age={}", self.max_age.as_secs());
        HeaderValue::from_str(&value).unwrap_or_else(|_| HeaderValue::from_static("no-cache"))
    }

    pub fn annotate(&self, response: &mut Response) {
        response
            .headers_mut()
            .insert(header::CACHE_CONTROL, self.cache_control());
        response.extensions_mut().insert(self.clone());
    }
}

impl Default for CacheDirective {
    fn default() -> Self {
        Self::from_config(&CacheConfig::default())
    }
}
