use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    routing::{get, post},
    Extension, Json, Router,
};

use crate::controllers::itinerary_controller::ItineraryController;
use crate::dto::itinerary_dto::{
    CreateItineraryRequest, ItineraryResponse, ListItinerariesQuery, ShareLinkResponse,
    SharedItineraryResponse, UpdateItineraryRequest,
};
use crate::middleware::auth::{auth_middleware, AuthenticatedUser};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_itinerary_router(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/", post(create_itinerary).get(list_itineraries))
        .route(
            "/:id",
            get(get_itinerary)
                .put(update_itinerary)
                .delete(delete_itinerary),
        )
        .route("/:id/share", post(generate_share_link))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    // La lectura pública de itinerarios compartidos no requiere token
    Router::new()
        .merge(protected)
        .route("/share/:share_id", get(get_shared_itinerary))
}

async fn create_itinerary(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<CreateItineraryRequest>,
) -> Result<(StatusCode, Json<ItineraryResponse>), AppError> {
    let controller = ItineraryController::from_state(&state);
    let response = controller.create(user.user_id, request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn list_itineraries(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(query): Query<ListItinerariesQuery>,
) -> Result<Json<Vec<ItineraryResponse>>, AppError> {
    let controller = ItineraryController::from_state(&state);
    let response = controller.list(user.user_id, query).await?;
    Ok(Json(response))
}

async fn get_itinerary(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> Result<Json<ItineraryResponse>, AppError> {
    let controller = ItineraryController::from_state(&state);
    let response = controller.get_by_id(user.user_id, &id).await?;
    Ok(Json(response))
}

async fn update_itinerary(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    Json(request): Json<UpdateItineraryRequest>,
) -> Result<Json<ItineraryResponse>, AppError> {
    let controller = ItineraryController::from_state(&state);
    let response = controller.update(user.user_id, &id, request).await?;
    Ok(Json(response))
}

async fn delete_itinerary(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let controller = ItineraryController::from_state(&state);
    controller.delete(user.user_id, &id).await?;
    Ok(Json(serde_json::json!({
        "message": "Itinerario eliminado exitosamente"
    })))
}

async fn generate_share_link(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> Result<Json<ShareLinkResponse>, AppError> {
    let controller = ItineraryController::from_state(&state);
    let response = controller.generate_share_link(user.user_id, &id).await?;
    Ok(Json(response))
}

async fn get_shared_itinerary(
    State(state): State<AppState>,
    Path(share_id): Path<String>,
) -> Result<Json<SharedItineraryResponse>, AppError> {
    let controller = ItineraryController::from_state(&state);
    let response = controller.get_shared(&share_id).await?;
    Ok(Json(response))
}
