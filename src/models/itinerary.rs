//! Modelo de itinerario
//!
//! Un itinerario pertenece siempre a un usuario; el propietario no cambia
//! después de la creación. Los timestamps los mantiene el store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Actividad dentro de un itinerario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// Itinerario persistido
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Itinerary {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub destination: String,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub activities: sqlx::types::Json<Vec<Activity>>,
    pub share_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
