//! Cache en memoria
//!
//! Implementación de `CacheStore` sobre un `HashMap` protegido por `RwLock`,
//! con expiración perezosa por TTL. Se usa en tests y como backend liviano
//! para entornos sin Redis.

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use super::store::CacheStore;

struct MemoryEntry {
    data: Vec<u8>,
    expires_at: Instant,
}

impl MemoryEntry {
    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// Cache en memoria con expiración por TTL
#[derive(Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, MemoryEntry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get(&self, key: &str) -> Option<Vec<u8>> {
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if !entry.is_expired() => return Some(entry.data.clone()),
                Some(_) => {}
                None => return None,
            }
        }

        // Entrada expirada: removerla perezosamente
        let mut entries = self.entries.write().await;
        if entries.get(key).map_or(false, |e| e.is_expired()) {
            entries.remove(key);
        }
        None
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Duration) {
        let entry = MemoryEntry {
            data: value.to_vec(),
            expires_at: Instant::now() + ttl,
        };
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), entry);
    }

    async fn delete(&self, key: &str) {
        let mut entries = self.entries.write().await;
        entries.remove(key);
    }

    async fn delete_by_prefix(&self, prefix: &str) -> usize {
        let mut entries = self.entries.write().await;
        let keys: Vec<String> = entries
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect();

        let count = keys.len();
        for key in keys {
            entries.remove(&key);
        }
        count
    }
}
