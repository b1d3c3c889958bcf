use validator::Validate;

use crate::dto::audit_dto::AuditLogFilters;
use crate::models::AuditLog;
use crate::services::FleetService;
use crate::state::AppState;
use crate::utils::errors::AppResult;

pub struct AuditController {
    fleet: FleetService,
}

impl AuditController {
    pub fn new(state: &AppState) -> Self {
        Self {
            fleet: state.fleet.clone(),
        }
    }

    pub async fn list(&self, filters: AuditLogFilters) -> AppResult<Vec<AuditLog>> {
        filters.validate()?;
        Ok(self
            .fleet
            .audit_history(filters.entity_type, filters.entity_id, filters.limit)
            .await?)
    }
}
