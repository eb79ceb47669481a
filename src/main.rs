mod cache;
mod config;
mod controllers;
mod dto;
mod middleware;
mod models;
mod repositories;
mod routes;
mod state;
mod utils;

use anyhow::Result;
use axum::Router;
use dotenvy::dotenv;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use cache::redis_client::RedisClient;
use cache::{CacheConfig, CacheStore, NoopCache};
use config::database::DatabaseConfig;
use config::environment::EnvironmentConfig;
use middleware::cors::cors_middleware;
use state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    // Configurar logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    info!("🧳 Itinerary Planner - API de itinerarios de viaje");
    info!("==================================================");

    let config = EnvironmentConfig::default();

    // Inicializar base de datos
    let pool = match DatabaseConfig::default().create_pool().await {
        Ok(pool) => pool,
        Err(e) => {
            error!("❌ Error conectando a la base de datos: {}", e);
            return Err(anyhow::anyhow!("Error de base de datos: {}", e));
        }
    };
    info!("✅ PostgreSQL conectado exitosamente");

    // Inicializar cache: si Redis no responde, la API arranca sin cache
    let cache_config = CacheConfig::from_env();
    let cache: Arc<dyn CacheStore> = match RedisClient::new(&cache_config.redis_url).await {
        Ok(client) => Arc::new(client),
        Err(e) => {
            warn!("⚠️ Redis no disponible, la API sigue solo con el store: {}", e);
            Arc::new(NoopCache)
        }
    };

    // Crear router de la API
    let app_state = AppState::new(pool, config.clone(), cache, cache_config);

    let app = Router::new()
        .nest("/api/auth", routes::auth_routes::create_auth_router())
        .nest(
            "/api/itineraries",
            routes::itinerary_routes::create_itinerary_router(app_state.clone()),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors_middleware())
        .with_state(app_state);

    // Puerto del servidor
    let addr: SocketAddr = config.server_url().parse()?;

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("🔐 Auth:");
    info!("   POST /api/auth/register - Registrar usuario");
    info!("   POST /api/auth/login - Login");
    info!("🧳 Itinerarios:");
    info!("   POST   /api/itineraries - Crear itinerario");
    info!("   GET    /api/itineraries - Listar itinerarios (page, limit, sort, destination)");
    info!("   GET    /api/itineraries/:id - Obtener itinerario");
    info!("   PUT    /api/itineraries/:id - Actualizar itinerario");
    info!("   DELETE /api/itineraries/:id - Eliminar itinerario");
    info!("   POST   /api/itineraries/:id/share - Generar enlace compartido");
    info!("   GET    /api/itineraries/share/:share_id - Lectura pública (sin token)");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("👋 Servidor terminado");
    Ok(())
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}
