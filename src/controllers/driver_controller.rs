use uuid::Uuid;
use validator::Validate;

use crate::dto::driver_dto::{CreateDriverRequest, UpdateDriverStatusRequest};
use crate::dto::ApiResponse;
use crate::models::Driver;
use crate::services::FleetService;
use crate::state::AppState;
use crate::utils::errors::AppResult;

pub struct DriverController {
    fleet: FleetService,
}

impl DriverController {
    pub fn new(state: &AppState) -> Self {
        Self {
            fleet: state.fleet.clone(),
        }
    }

    pub async fn create(&self, actor: &str, request: CreateDriverRequest) -> AppResult<ApiResponse<Driver>> {
        request.validate()?;
        let driver = self.fleet.create_driver(request.into(), actor).await?;
        Ok(ApiResponse::success_with_message(driver, "Conductor creado exitosamente"))
    }

    pub async fn get_by_id(&self, id: Uuid) -> AppResult<Driver> {
        Ok(self.fleet.get_driver(id).await?)
    }

    pub async fn list(&self) -> AppResult<Vec<Driver>> {
        Ok(self.fleet.list_drivers().await?)
    }

    pub async fn update_status(
        &self,
        actor: &str,
        id: Uuid,
        request: UpdateDriverStatusRequest,
    ) -> AppResult<ApiResponse<Driver>> {
        let driver = self.fleet.set_driver_status(id, request.status, actor).await?;
        Ok(ApiResponse::success(driver))
    }
}
