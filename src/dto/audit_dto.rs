use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::models::EntityKind;

// Query de `GET /audit-logs`
#[derive(Debug, Deserialize, Validate)]
pub struct AuditLogFilters {
    pub entity_type: Option<EntityKind>,
    pub entity_id: Option<Uuid>,

    #[validate(range(min = 1, max = 1000))]
    pub limit: Option<i64>,
}
