use uuid::Uuid;
use validator::Validate;

use crate::dto::vehicle_dto::{CreateVehicleRequest, UpdateVehicleStatusRequest};
use crate::dto::ApiResponse;
use crate::models::Vehicle;
use crate::services::FleetService;
use crate::state::AppState;
use crate::utils::errors::AppResult;

pub struct VehicleController {
    fleet: FleetService,
}

impl VehicleController {
    pub fn new(state: &AppState) -> Self {
        Self {
            fleet: state.fleet.clone(),
        }
    }

    pub async fn create(&self, actor: &str, request: CreateVehicleRequest) -> AppResult<ApiResponse<Vehicle>> {
        request.validate()?;
        let vehicle = self.fleet.create_vehicle(request.into(), actor).await?;
        Ok(ApiResponse::success_with_message(vehicle, "Vehículo creado exitosamente"))
    }

    pub async fn get_by_id(&self, id: Uuid) -> AppResult<Vehicle> {
        Ok(self.fleet.get_vehicle(id).await?)
    }

    pub async fn list(&self) -> AppResult<Vec<Vehicle>> {
        Ok(self.fleet.list_vehicles().await?)
    }

    pub async fn update_status(
        &self,
        actor: &str,
        id: Uuid,
        request: UpdateVehicleStatusRequest,
    ) -> AppResult<ApiResponse<Vehicle>> {
        let vehicle = self.fleet.set_vehicle_status(id, request.status, actor).await?;
        Ok(ApiResponse::success(vehicle))
    }

    pub async fn retire(&self, actor: &str, id: Uuid) -> AppResult<ApiResponse<Vehicle>> {
        let vehicle = self.fleet.retire_vehicle(id, actor).await?;
        Ok(ApiResponse::success_with_message(vehicle, "Vehículo retirado"))
    }

    pub async fn delete(&self, actor: &str, id: Uuid) -> AppResult<ApiResponse<Vehicle>> {
        let vehicle = self.fleet.soft_delete_vehicle(id, actor).await?;
        Ok(ApiResponse::success_with_message(vehicle, "Vehículo eliminado exitosamente"))
    }
}
