use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::trip_controller::TripController;
use crate::dto::trip_dto::{
    CancelTripRequest, CompleteTripRequest, CompletionResponse, CreateTripRequest,
    DispatchResponse, TripDetailResponse, TripFilters,
};
use crate::dto::ApiResponse;
use crate::middleware::{Actor, AppJson};
use crate::models::Trip;
use crate::state::AppState;
use crate::utils::errors::AppResult;

pub fn create_trip_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_trip).get(list_trips))
        .route("/draft", post(create_draft))
        .route("/complete", post(complete_trip))
        .route("/cancel", post(cancel_trip))
        .route("/:id", get(get_trip))
        .route("/:id/dispatch", post(dispatch_draft))
}

async fn create_trip(
    State(state): State<AppState>,
    actor: Actor,
    AppJson(request): AppJson<CreateTripRequest>,
) -> AppResult<(StatusCode, Json<DispatchResponse>)> {
    let response = TripController::new(&state).create(actor.as_str(), request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn create_draft(
    State(state): State<AppState>,
    actor: Actor,
    AppJson(request): AppJson<CreateTripRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Trip>>)> {
    let response = TripController::new(&state).create_draft(actor.as_str(), request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn dispatch_draft(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> AppResult<Json<DispatchResponse>> {
    let response = TripController::new(&state).dispatch_draft(actor.as_str(), id).await?;
    Ok(Json(response))
}

async fn complete_trip(
    State(state): State<AppState>,
    actor: Actor,
    AppJson(request): AppJson<CompleteTripRequest>,
) -> AppResult<Json<ApiResponse<CompletionResponse>>> {
    let response = TripController::new(&state).complete(actor.as_str(), request).await?;
    Ok(Json(response))
}

async fn cancel_trip(
    State(state): State<AppState>,
    actor: Actor,
    AppJson(request): AppJson<CancelTripRequest>,
) -> AppResult<Json<ApiResponse<DispatchResponse>>> {
    let response = TripController::new(&state).cancel(actor.as_str(), request).await?;
    Ok(Json(response))
}

async fn get_trip(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<TripDetailResponse>> {
    Ok(Json(TripController::new(&state).get_by_id(id).await?))
}

async fn list_trips(
    State(state): State<AppState>,
    Query(filters): Query<TripFilters>,
) -> AppResult<Json<Vec<Trip>>> {
    Ok(Json(TripController::new(&state).list(filters).await?))
}
