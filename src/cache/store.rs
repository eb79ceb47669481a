//! Contrato del cache
//!
//! El cache es estrictamente una optimización, nunca una dependencia de
//! correctitud: todas las operaciones son infalibles desde el punto de vista
//! del llamador. Si el backend no está disponible, `get` degrada a miss y las
//! escrituras degradan a no-op. Esa absorción se impone aquí, en la frontera
//! del adaptador, para que la lógica de negocio no tenga que contemplar caídas
//! del cache.

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;
use tracing::warn;

/// Operaciones de cache sobre claves derivadas
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Obtener el valor de una clave; `None` si no existe, expiró
    /// o el backend no está disponible
    async fn get(&self, key: &str) -> Option<Vec<u8>>;

    /// Guardar un valor con expiración
    async fn set(&self, key: &str, value: &[u8], ttl: Duration);

    /// Eliminar una clave
    async fn delete(&self, key: &str);

    /// Eliminar todas las claves que empiecen con un prefijo;
    /// devuelve cuántas se eliminaron
    async fn delete_by_prefix(&self, prefix: &str) -> usize;
}

/// Leer un valor tipado del cache (deserializado desde JSON)
///
/// Un snapshot que no deserializa se trata como miss: el cache es una pista,
/// la fuente de verdad sigue siendo el store.
pub async fn get_json<T: DeserializeOwned>(cache: &dyn CacheStore, key: &str) -> Option<T> {
    let bytes = cache.get(key).await?;
    match serde_json::from_slice(&bytes) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("⚠️ Snapshot de cache corrupto para clave {}: {}", key, e);
            None
        }
    }
}

/// Guardar un valor tipado en el cache (serializado a JSON)
pub async fn set_json<T: Serialize>(cache: &dyn CacheStore, key: &str, value: &T, ttl: Duration) {
    match serde_json::to_vec(value) {
        Ok(bytes) => cache.set(key, &bytes, ttl).await,
        Err(e) => warn!("⚠️ No se pudo serializar el valor para clave {}: {}", key, e),
    }
}

/// Implementación no-op para cuando el cache está deshabilitado
///
/// Siempre devuelve miss y descarta las escrituras. Se selecciona en el
/// arranque cuando Redis no está configurado o no responde.
pub struct NoopCache;

#[async_trait]
impl CacheStore for NoopCache {
    async fn get(&self, _key: &str) -> Option<Vec<u8>> {
        None
    }

    async fn set(&self, _key: &str, _value: &[u8], _ttl: Duration) {}

    async fn delete(&self, _key: &str) {}

    async fn delete_by_prefix(&self, _prefix: &str) -> usize {
        0
    }
}
