use axum::{Router, routing::get};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use super::{
    services::{fetch_asset, health},
    state::AppState,
};

/// All routes with middleware; the asset route is mounted under the configured prefix
pub fn router(state: AppState) -> Router {
    let asset_route = format!("/{}/{{*path}}", state.config.route_prefix());

    Router::new()
        .route(&asset_route, get(fetch_asset))
        .route("/health", get(health))
        .with_state(state)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
}
