use std::sync::Arc;

use finboard_import::Loader;
use finboard_storage::DbPool;

use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub loader: Arc<Loader>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(pool: DbPool, loader: Loader, config: Config) -> Self {
        Self {
            pool,
            loader: Arc::new(loader),
            config: Arc::new(config),
        }
    }
}
