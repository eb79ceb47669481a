//! Esquema de claves de cache
//!
//! Este módulo deriva las claves de cache de forma determinista: misma entrada,
//! misma clave, siempre. Los campos discriminantes se incluyen posicionalmente
//! separados por `:`, y los valores libres se escapan para que el delimitador
//! nunca aparezca dentro de un campo.

use uuid::Uuid;

/// Generador de claves de cache con namespace
#[derive(Debug, Clone)]
pub struct CacheKeys {
    namespace: String,
}

impl CacheKeys {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    /// Clave de un itinerario individual
    pub fn itinerary(&self, id: Uuid) -> String {
        format!("{}:itinerary:{}", self.namespace, id)
    }

    /// Clave de una página de resultados de listado
    ///
    /// El filtro de destino se normaliza a minúsculas porque el filtrado es
    /// case-insensitive: "Paris" y "paris" son la misma consulta.
    pub fn itinerary_page(
        &self,
        owner_id: Uuid,
        page: u32,
        limit: u32,
        sort: &str,
        destination: Option<&str>,
    ) -> String {
        format!(
            "{}{}:{}:{}:{}",
            self.owner_list_prefix(owner_id),
            page,
            limit,
            escape_field(sort),
            destination.map(escape_field).unwrap_or_default(),
        )
    }

    /// Prefijo de todas las páginas de listado de un propietario,
    /// usado para la evicción masiva al borrar un itinerario
    pub fn owner_list_prefix(&self, owner_id: Uuid) -> String {
        format!("{}:itinerary:list:{}:", self.namespace, owner_id)
    }
}

/// Escapar un valor libre para uso dentro de una clave
///
/// `%` se escapa primero para que el escape sea reversible, y `:` se sustituye
/// para que no colisione con el delimitador de campos.
fn escape_field(value: &str) -> String {
    value
        .to_lowercase()
        .replace('%', "%25")
        .replace(':', "%3a")
}
