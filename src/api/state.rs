use std::sync::Arc;

use crate::config::Config;
use crate::delivery::{AssetService, CacheDirective};
use crate::observability::Metrics;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub service: Arc<AssetService>,
    pub cache: Arc<CacheDirective>,
}

impl AppState {
    pub fn new(config: Config, service: AssetService) -> Self {
        let cache = CacheDirective::from_config(&config.cache);

        Self {
            config: Arc::new(config),
            service: Arc::new(service),
            cache: Arc::new(cache),
        }
    }

    pub fn metrics(&self) -> &Arc<Metrics> {
        self.service.metrics()
    }
}
