use uuid::Uuid;
use validator::Validate;

use crate::dto::trip_dto::{
    CancelTripRequest, CompleteTripRequest, CompletionResponse, CreateTripRequest,
    DispatchResponse, TripDetailResponse, TripFilters,
};
use crate::dto::ApiResponse;
use crate::models::Trip;
use crate::services::{DispatchService, FleetService};
use crate::state::AppState;
use crate::utils::errors::{AppError, AppResult};

pub struct TripController {
    dispatch: DispatchService,
    fleet: FleetService,
}

impl TripController {
    pub fn new(state: &AppState) -> Self {
        Self {
            dispatch: state.dispatch.clone(),
            fleet: state.fleet.clone(),
        }
    }

    /// Crea y despacha; los rechazos salen como `DISPATCH_BLOCKED`
    pub async fn create(&self, actor: &str, request: CreateTripRequest) -> AppResult<DispatchResponse> {
        request.validate()?;
        let outcome = self
            .dispatch
            .create_trip(request.into(), actor)
            .await
            .map_err(AppError::dispatch_blocked)?;
        Ok(outcome.into())
    }

    pub async fn create_draft(&self, actor: &str, request: CreateTripRequest) -> AppResult<ApiResponse<Trip>> {
        request.validate()?;
        let trip = self.dispatch.create_draft(request.into(), actor).await?;
        Ok(ApiResponse::success_with_message(trip, "Borrador creado"))
    }

    pub async fn dispatch_draft(&self, actor: &str, trip_id: Uuid) -> AppResult<DispatchResponse> {
        let outcome = self
            .dispatch
            .dispatch_draft(trip_id, actor)
            .await
            .map_err(AppError::dispatch_blocked)?;
        Ok(outcome.into())
    }

    pub async fn complete(
        &self,
        actor: &str,
        request: CompleteTripRequest,
    ) -> AppResult<ApiResponse<CompletionResponse>> {
        request.validate()?;
        let outcome = self.dispatch.complete_trip(request.into(), actor).await?;
        Ok(ApiResponse::success_with_message(outcome.into(), "Viaje completado"))
    }

    pub async fn cancel(
        &self,
        actor: &str,
        request: CancelTripRequest,
    ) -> AppResult<ApiResponse<DispatchResponse>> {
        request.validate()?;
        let outcome = self.dispatch.cancel_trip(request.trip_id, actor).await?;
        Ok(ApiResponse::success_with_message(outcome.into(), "Viaje cancelado"))
    }

    pub async fn get_by_id(&self, trip_id: Uuid) -> AppResult<TripDetailResponse> {
        let (trip, fuel_logs) = self.fleet.get_trip_with_fuel(trip_id).await?;
        Ok(TripDetailResponse { trip, fuel_logs })
    }

    pub async fn list(&self, filters: TripFilters) -> AppResult<Vec<Trip>> {
        Ok(self.fleet.list_trips(filters.status).await?)
    }
}
