use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};

use crate::controllers::audit_controller::AuditController;
use crate::dto::audit_dto::AuditLogFilters;
use crate::models::AuditLog;
use crate::state::AppState;
use crate::utils::errors::AppResult;

pub fn create_audit_router() -> Router<AppState> {
    Router::new().route("/", get(list_audit_logs))
}

async fn list_audit_logs(
    State(state): State<AppState>,
    Query(filters): Query<AuditLogFilters>,
) -> AppResult<Json<Vec<AuditLog>>> {
    Ok(Json(AuditController::new(&state).list(filters).await?))
}
