use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::vehicle_controller::VehicleController;
use crate::dto::vehicle_dto::{CreateVehicleRequest, UpdateVehicleStatusRequest};
use crate::dto::ApiResponse;
use crate::middleware::{Actor, AppJson};
use crate::models::Vehicle;
use crate::state::AppState;
use crate::utils::errors::AppResult;

pub fn create_vehicle_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_vehicle).get(list_vehicles))
        .route("/:id", get(get_vehicle).delete(delete_vehicle))
        .route("/:id/status", patch(update_vehicle_status))
        .route("/:id/retire", patch(retire_vehicle))
}

async fn create_vehicle(
    State(state): State<AppState>,
    actor: Actor,
    AppJson(request): AppJson<CreateVehicleRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Vehicle>>)> {
    let response = VehicleController::new(&state).create(actor.as_str(), request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn get_vehicle(State(state): State<AppState>, Path(id): Path<Uuid>) -> AppResult<Json<Vehicle>> {
    Ok(Json(VehicleController::new(&state).get_by_id(id).await?))
}

async fn list_vehicles(State(state): State<AppState>) -> AppResult<Json<Vec<Vehicle>>> {
    Ok(Json(VehicleController::new(&state).list().await?))
}

async fn update_vehicle_status(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    AppJson(request): AppJson<UpdateVehicleStatusRequest>,
) -> AppResult<Json<ApiResponse<Vehicle>>> {
    let response = VehicleController::new(&state)
        .update_status(actor.as_str(), id, request)
        .await?;
    Ok(Json(response))
}

async fn retire_vehicle(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Vehicle>>> {
    let response = VehicleController::new(&state).retire(actor.as_str(), id).await?;
    Ok(Json(response))
}

async fn delete_vehicle(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Vehicle>>> {
    let response = VehicleController::new(&state).delete(actor.as_str(), id).await?;
    Ok(Json(response))
}
