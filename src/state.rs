//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum.

use sqlx::PgPool;
use std::sync::Arc;

use crate::cache::{CacheConfig, CacheStore};
use crate::config::environment::EnvironmentConfig;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: EnvironmentConfig,
    /// Handle del cache; `NoopCache` cuando Redis no está disponible
    pub cache: Arc<dyn CacheStore>,
    pub cache_config: CacheConfig,
}

impl AppState {
    pub fn new(
        pool: PgPool,
        config: EnvironmentConfig,
        cache: Arc<dyn CacheStore>,
        cache_config: CacheConfig,
    ) -> Self {
        Self {
            pool,
            config,
            cache,
            cache_config,
        }
    }
}
