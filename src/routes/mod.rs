//! Rutas
//!
//! Este módulo contiene los routers de Axum.

pub mod auth_routes;
pub mod itinerary_routes;
