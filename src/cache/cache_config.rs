//! Configuración de cache
//!
//! Este módulo contiene la configuración para el sistema de cache.

use std::env;
use std::time::Duration;

/// Configuración del cache
#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub redis_url: String,
    /// Tiempo de vida de cada entrada de cache
    pub ttl_seconds: u64,
    /// Prefijo de todas las claves derivadas
    pub key_namespace: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            redis_url: "redis://127.0.0.1:6379".to_string(),
            ttl_seconds: 120,
            key_namespace: "itinerary_planner".to_string(),
        }
    }
}

impl CacheConfig {
    /// Cargar la configuración desde variables de entorno
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            redis_url: env::var("REDIS_URL").unwrap_or(defaults.redis_url),
            ttl_seconds: env::var("CACHE_TTL_SECONDS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.ttl_seconds),
            key_namespace: env::var("CACHE_KEY_NAMESPACE").unwrap_or(defaults.key_namespace),
        }
    }

    /// TTL como `Duration`
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }
}
