use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use assetbox::api::{self, state::AppState};
use assetbox::config::Config;
use assetbox::content_type::ContentTypeRegistry;
use assetbox::delivery::AssetService;
use assetbox::imaging::TransformSettings;
use assetbox::storage::StorageClient;

use crate::cli::ServeArgs;

type AnyError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub async fn run(args: ServeArgs) -> Result<(), AnyError> {
    info!("Loading configuration");
    let mut config = Config::load_with(args.config.as_deref())
        .map_err(|e| format!("Failed to load config: {}", e))?;
    if let Some(address) = args.address {
        config.server.bind_addr = address;
    }

    let registry = ContentTypeRegistry::load(&config.mime.map_path);
    info!(entries = registry.len(), "Content-type registry ready");

    info!(provider = ?config.storage.provider, root = %config.storage.root.display(), "Opening storage");
    let storage = StorageClient::from_config(&config.storage)
        .map_err(|e| format!("Failed to open storage: {}", e))?;

    let settings = TransformSettings {
        jpeg_quality: config.transform.jpeg_quality,
        max_decode_bytes: config.transform.max_decode_bytes.as_u64(),
    };

    let service = AssetService::builder()
        .registry(Arc::new(registry))
        .storage(Arc::new(storage))
        .settings(settings)
        .build();

    let address = config.server.bind_addr;
    let prefix = config.route_prefix().to_string();
    let app = api::router(AppState::new(config, service));

    let listener = TcpListener::bind(address).await?;
    info!(%address, route = %format!("/{prefix}/{{*path}}"), "AssetBox listening");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        let mut sigterm = signal(SignalKind::terminate())
            .expect("failed to install signal handler");
        sigterm.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
