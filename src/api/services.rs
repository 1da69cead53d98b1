use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::collections::HashMap;
use tracing::Instrument;
use uuid::Uuid;

use super::{
    models::{HealthResponse, SizeQuery},
    state::AppState,
};
use crate::delivery::{AssetRequest, emit};

/// Asset endpoint (GET /{prefix}/{*path}?w=&h=)
///
/// Serves the stored bytes for `path`, or a downscaled variant when the
/// asset is a raster image larger than the `w`/`h` bounds. Unknown
/// extensions and missing assets answer 404 with an empty body.
pub async fn fetch_asset(
    State(state): State<AppState>,
    Path(path): Path<String>,
    Query(query): Query<SizeQuery>,
) -> Response {
    let span = tracing::info_span!(
        "fetch_asset",
        request_id = %Uuid::now_v7(),
        path = %path,
        w = ?query.w,
        h = ?query.h,
    );

    async move {
        let request = AssetRequest::new(path).with_bounds(query.w, query.h);
        let payload = state.service.resolve(&request).await;
        emit(payload, &state.cache)
    }
    .instrument(span)
    .await
}

/// Health check endpoint (GET /health)
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let mut components = HashMap::new();

    components.insert("api".to_string(), "healthy".to_string());
    components.insert("storage".to_string(), "healthy".to_string());

    let registry_status = if state.service.registry().is_empty() {
        "unhealthy"
    } else {
        "healthy"
    };
    components.insert("content_types".to_string(), registry_status.to_string());

    let all_healthy = components.values().all(|status| status == "healthy");
    let status_code = if all_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = HealthResponse {
        status: if all_healthy { "healthy" } else { "unhealthy" }.to_string(),
        components,
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    (status_code, Json(response))
}
