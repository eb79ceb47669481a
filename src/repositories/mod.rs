//! Repositorios
//!
//! Este módulo contiene el acceso a datos contra PostgreSQL.

pub mod itinerary_repository;
pub mod user_repository;
