//! Modelo de usuario

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Usuario registrado
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}
