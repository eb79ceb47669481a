//! Repositorio de itinerarios
//!
//! El contrato `ItineraryStore` es la frontera con el store durable: CRUD
//! con scope de propietario, paginación y filtro por destino. El store asigna
//! el ID y mantiene los timestamps, y cada mutación exitosa devuelve la fila
//! canónica completa porque esa representación es la que se cachea.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::itinerary_dto::{CreateItineraryRequest, ItineraryFilter, UpdateItineraryRequest};
use crate::models::itinerary::Itinerary;
use crate::utils::errors::AppError;

/// Contrato del store durable de itinerarios
#[async_trait]
pub trait ItineraryStore: Send + Sync {
    async fn create(
        &self,
        owner_id: Uuid,
        request: CreateItineraryRequest,
    ) -> Result<Itinerary, AppError>;

    async fn find_by_id(&self, owner_id: Uuid, id: Uuid) -> Result<Option<Itinerary>, AppError>;

    async fn find_by_filter(
        &self,
        owner_id: Uuid,
        filter: &ItineraryFilter,
    ) -> Result<Vec<Itinerary>, AppError>;

    /// Patch atómico de una sola fila; devuelve `None` si no existe
    /// para ese propietario
    async fn update_by_id(
        &self,
        owner_id: Uuid,
        id: Uuid,
        patch: UpdateItineraryRequest,
    ) -> Result<Option<Itinerary>, AppError>;

    /// Devuelve `true` si la fila existía y fue eliminada
    async fn delete_by_id(&self, owner_id: Uuid, id: Uuid) -> Result<bool, AppError>;

    /// Asigna un share_id si la fila aún no tiene uno
    async fn assign_share_id(
        &self,
        owner_id: Uuid,
        id: Uuid,
        share_id: Uuid,
    ) -> Result<Option<Itinerary>, AppError>;

    /// Búsqueda pública por share_id, sin scope de propietario
    async fn find_by_share_id(&self, share_id: Uuid) -> Result<Option<Itinerary>, AppError>;
}

/// Implementación PostgreSQL del store de itinerarios
pub struct ItineraryRepository {
    pool: PgPool,
}

impl ItineraryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ItineraryStore for ItineraryRepository {
    async fn create(
        &self,
        owner_id: Uuid,
        request: CreateItineraryRequest,
    ) -> Result<Itinerary, AppError> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        let itinerary = sqlx::query_as::<_, Itinerary>(
            r#"
            INSERT INTO itineraries (id, user_id, title, destination, start_date, end_date, activities, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .bind(request.title)
        .bind(request.destination)
        .bind(request.start_date)
        .bind(request.end_date)
        .bind(sqlx::types::Json(request.activities))
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(itinerary)
    }

    async fn find_by_id(&self, owner_id: Uuid, id: Uuid) -> Result<Option<Itinerary>, AppError> {
        let itinerary = sqlx::query_as::<_, Itinerary>(
            "SELECT * FROM itineraries WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(itinerary)
    }

    async fn find_by_filter(
        &self,
        owner_id: Uuid,
        filter: &ItineraryFilter,
    ) -> Result<Vec<Itinerary>, AppError> {
        let offset = (filter.page as i64 - 1) * filter.limit as i64;
        let pattern = filter
            .destination
            .as_deref()
            .map(|d| format!("%{}%", escape_like(d)));

        // La columna de ordenamiento viene de un whitelist (SortField),
        // nunca directamente de la query del cliente
        let sql = format!(
            r#"
            SELECT * FROM itineraries
            WHERE user_id = $1 AND ($2::text IS NULL OR destination ILIKE $2)
            ORDER BY {} ASC
            LIMIT $3 OFFSET $4
            "#,
            filter.sort.column()
        );

        let itineraries = sqlx::query_as::<_, Itinerary>(&sql)
            .bind(owner_id)
            .bind(pattern)
            .bind(filter.limit as i64)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        Ok(itineraries)
    }

    async fn update_by_id(
        &self,
        owner_id: Uuid,
        id: Uuid,
        patch: UpdateItineraryRequest,
    ) -> Result<Option<Itinerary>, AppError> {
        let itinerary = sqlx::query_as::<_, Itinerary>(
            r#"
            UPDATE itineraries SET
                title = COALESCE($3, title),
                destination = COALESCE($4, destination),
                start_date = COALESCE($5, start_date),
                end_date = COALESCE($6, end_date),
                activities = COALESCE($7, activities),
                updated_at = $8
            WHERE id = $1 AND user_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .bind(patch.title)
        .bind(patch.destination)
        .bind(patch.start_date)
        .bind(patch.end_date)
        .bind(patch.activities.map(sqlx::types::Json))
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(itinerary)
    }

    async fn delete_by_id(&self, owner_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM itineraries WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn assign_share_id(
        &self,
        owner_id: Uuid,
        id: Uuid,
        share_id: Uuid,
    ) -> Result<Option<Itinerary>, AppError> {
        let itinerary = sqlx::query_as::<_, Itinerary>(
            r#"
            UPDATE itineraries SET
                share_id = COALESCE(share_id, $3),
                updated_at = $4
            WHERE id = $1 AND user_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .bind(share_id)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(itinerary)
    }

    async fn find_by_share_id(&self, share_id: Uuid) -> Result<Option<Itinerary>, AppError> {
        let itinerary =
            sqlx::query_as::<_, Itinerary>("SELECT * FROM itineraries WHERE share_id = $1")
                .bind(share_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(itinerary)
    }
}

/// Escapar los comodines de LIKE en el filtro de destino
fn escape_like(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}
