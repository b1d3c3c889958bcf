use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::driver_controller::DriverController;
use crate::dto::driver_dto::{CreateDriverRequest, UpdateDriverStatusRequest};
use crate::dto::ApiResponse;
use crate::middleware::{Actor, AppJson};
use crate::models::Driver;
use crate::state::AppState;
use crate::utils::errors::AppResult;

pub fn create_driver_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_driver).get(list_drivers))
        .route("/:id", get(get_driver))
        .route("/:id/status", patch(update_driver_status))
}

async fn create_driver(
    State(state): State<AppState>,
    actor: Actor,
    AppJson(request): AppJson<CreateDriverRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Driver>>)> {
    let response = DriverController::new(&state).create(actor.as_str(), request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn get_driver(State(state): State<AppState>, Path(id): Path<Uuid>) -> AppResult<Json<Driver>> {
    Ok(Json(DriverController::new(&state).get_by_id(id).await?))
}

async fn list_drivers(State(state): State<AppState>) -> AppResult<Json<Vec<Driver>>> {
    Ok(Json(DriverController::new(&state).list().await?))
}

async fn update_driver_status(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    AppJson(request): AppJson<UpdateDriverStatusRequest>,
) -> AppResult<Json<ApiResponse<Driver>>> {
    let response = DriverController::new(&state)
        .update_status(actor.as_str(), id, request)
        .await?;
    Ok(Json(response))
}
