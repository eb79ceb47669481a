//! Cliente Redis
//!
//! Adaptador de `CacheStore` sobre Redis con `ConnectionManager`. Toda falla
//! del backend se absorbe aquí: una lectura fallida es un miss, una escritura
//! fallida es un no-op con warning. El llamador nunca ve errores de Redis.

use anyhow::Result;
use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands, RedisResult};
use std::time::Duration;
use tracing::{debug, info, warn};

use super::store::CacheStore;

/// Cliente Redis con connection pooling y operaciones async
#[derive(Clone)]
pub struct RedisClient {
    manager: ConnectionManager,
}

impl RedisClient {
    /// Crear nuevo cliente Redis
    pub async fn new(redis_url: &str) -> Result<Self> {
        info!("🔗 Conectando a Redis: {}", redis_url);

        let client = redis::Client::open(redis_url)?;
        let manager = ConnectionManager::new(client).await?;

        // Test de conexión usando un comando simple
        let mut conn = manager.clone();
        let _: () = redis::cmd("PING").query_async(&mut conn).await?;

        info!("✅ Redis conectado exitosamente");

        Ok(Self { manager })
    }

    /// Verificar si Redis está conectado
    pub async fn is_connected(&self) -> bool {
        let mut conn = self.manager.clone();
        match redis::cmd("PING").query_async::<_, String>(&mut conn).await {
            Ok(response) => response == "PONG",
            Err(_) => false,
        }
    }
}

#[async_trait]
impl CacheStore for RedisClient {
    async fn get(&self, key: &str) -> Option<Vec<u8>> {
        let mut conn = self.manager.clone();

        match conn.get::<_, Option<Vec<u8>>>(key).await {
            Ok(Some(value)) => {
                debug!("📥 Cache HIT para clave: {}", key);
                Some(value)
            }
            Ok(None) => {
                debug!("❌ Cache MISS para clave: {}", key);
                None
            }
            Err(e) => {
                warn!("⚠️ Error leyendo cache para clave {}: {}", key, e);
                None
            }
        }
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Duration) {
        let mut conn = self.manager.clone();

        let result: RedisResult<()> = conn.set_ex(key, value, ttl.as_secs()).await;

        match result {
            Ok(()) => debug!("💾 Cache SET para clave: {} (TTL: {}s)", key, ttl.as_secs()),
            Err(e) => warn!("⚠️ Error guardando en cache para clave {}: {}", key, e),
        }
    }

    async fn delete(&self, key: &str) {
        let mut conn = self.manager.clone();

        let result: RedisResult<i64> = conn.del(key).await;

        match result {
            Ok(count) => debug!("🗑️ Cache DELETE para clave: {} (eliminados: {})", key, count),
            Err(e) => warn!("⚠️ Error eliminando cache para clave {}: {}", key, e),
        }
    }

    async fn delete_by_prefix(&self, prefix: &str) -> usize {
        let mut conn = self.manager.clone();
        let pattern = format!("{}*", prefix);
        let mut deleted: usize = 0;
        let mut cursor: u64 = 0;

        // SCAN incremental en lugar de KEYS para no bloquear el servidor.
        // Las entradas creadas entre el scan y el delete pueden sobrevivir;
        // esa ventana está acotada por el TTL de las entradas.
        loop {
            let result: RedisResult<(u64, Vec<String>)> = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(100)
                .query_async(&mut conn)
                .await;

            let (next_cursor, keys) = match result {
                Ok(page) => page,
                Err(e) => {
                    warn!("⚠️ Error escaneando claves con prefijo {}: {}", prefix, e);
                    return deleted;
                }
            };

            if !keys.is_empty() {
                match conn.del::<_, i64>(&keys).await {
                    Ok(count) => deleted += count as usize,
                    Err(e) => warn!("⚠️ Error eliminando claves con prefijo {}: {}", prefix, e),
                }
            }

            cursor = next_cursor;
            if cursor == 0 {
                break;
            }
        }

        debug!("🗑️ Cache DELETE por prefijo {} (eliminados: {})", prefix, deleted);
        deleted
    }
}
