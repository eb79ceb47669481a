//! Cache
//!
//! Este módulo contiene el sistema de cache: configuración, esquema de claves,
//! el contrato `CacheStore` y sus implementaciones (Redis, memoria, no-op).

pub mod cache_config;
pub mod keys;
pub mod memory;
pub mod redis_client;
pub mod store;

pub use cache_config::CacheConfig;
pub use keys::CacheKeys;
pub use store::{get_json, set_json, CacheStore, NoopCache};
