//! Application state - Dependency injection container.
//!
//! Handlers reach services through the [`ServiceContainer`]. Redis and the
//! database handle are optional so the router can run over mock services.

use std::sync::Arc;

use crate::config::Config;
use crate::infra::{Cache, Database, Geocoder};
use crate::services::{ServiceContainer, Services};

#[derive(Clone)]
pub struct AppState {
    pub services: Arc<dyn ServiceContainer>,
    /// Redis cache; rate limiting is skipped without it
    pub cache: Option<Arc<Cache>>,
    /// Database handle used by the health check
    pub database: Option<Arc<Database>>,
}

impl AppState {
    /// Build the production state over a live database and Redis.
    pub fn from_config(
        database: Arc<Database>,
        cache: Arc<Cache>,
        geocoder: Arc<dyn Geocoder>,
        config: Config,
    ) -> Self {
        let services = Services::from_connection(
            database.get_connection(),
            config,
            Some(cache.clone()),
            geocoder,
        );

        Self {
            services: Arc::new(services),
            cache: Some(cache),
            database: Some(database),
        }
    }

    /// State over injected services with no infrastructure attached.
    pub fn new(services: Arc<dyn ServiceContainer>) -> Self {
        Self {
            services,
            cache: None,
            database: None,
        }
    }
}
