//! DTOs de itinerarios
//!
//! Los responses son los snapshots que se cachean, así que derivan tanto
//! `Serialize` como `Deserialize`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::itinerary::{Activity, Itinerary};

/// Request para crear un itinerario
#[derive(Debug, Deserialize, Validate)]
pub struct CreateItineraryRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1, max = 200))]
    pub destination: String,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub activities: Vec<Activity>,
}

/// Request para actualizar un itinerario (patch parcial)
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateItineraryRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub destination: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub activities: Option<Vec<Activity>>,
}

/// Representación canónica de un itinerario en la API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItineraryResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub destination: String,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub activities: Vec<Activity>,
    pub share_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Itinerary> for ItineraryResponse {
    fn from(it: Itinerary) -> Self {
        Self {
            id: it.id,
            user_id: it.user_id,
            title: it.title,
            destination: it.destination,
            start_date: it.start_date,
            end_date: it.end_date,
            activities: it.activities.0,
            share_id: it.share_id,
            created_at: it.created_at,
            updated_at: it.updated_at,
        }
    }
}

/// Proyección pública de un itinerario compartido (sin propietario)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharedItineraryResponse {
    pub id: Uuid,
    pub title: String,
    pub destination: String,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub activities: Vec<Activity>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Itinerary> for SharedItineraryResponse {
    fn from(it: Itinerary) -> Self {
        Self {
            id: it.id,
            title: it.title,
            destination: it.destination,
            start_date: it.start_date,
            end_date: it.end_date,
            activities: it.activities.0,
            created_at: it.created_at,
            updated_at: it.updated_at,
        }
    }
}

/// Response al generar un enlace de compartido
#[derive(Debug, Serialize)]
pub struct ShareLinkResponse {
    pub share_id: Uuid,
}

/// Query params del listado
#[derive(Debug, Default, Deserialize)]
pub struct ListItinerariesQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub sort: Option<String>,
    pub destination: Option<String>,
}

/// Campo de ordenamiento permitido en el listado
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    CreatedAt,
    UpdatedAt,
    Title,
    Destination,
    StartDate,
}

impl SortField {
    /// Parsear el nombre del campo tal como llega en la query
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "createdAt" => Some(Self::CreatedAt),
            "updatedAt" => Some(Self::UpdatedAt),
            "title" => Some(Self::Title),
            "destination" => Some(Self::Destination),
            "startDate" => Some(Self::StartDate),
            _ => None,
        }
    }

    /// Nombre canónico del campo (se usa en las claves de cache)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreatedAt => "createdAt",
            Self::UpdatedAt => "updatedAt",
            Self::Title => "title",
            Self::Destination => "destination",
            Self::StartDate => "startDate",
        }
    }

    /// Columna SQL correspondiente
    pub fn column(&self) -> &'static str {
        match self {
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
            Self::Title => "title",
            Self::Destination => "destination",
            Self::StartDate => "start_date",
        }
    }
}

/// Parámetros normalizados de una consulta de listado
#[derive(Debug, Clone, PartialEq)]
pub struct ItineraryFilter {
    pub page: u32,
    pub limit: u32,
    pub sort: SortField,
    pub destination: Option<String>,
}
