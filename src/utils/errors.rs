//! Sistema de manejo de errores
//!
//! `DomainError` es la taxonomía estable que devuelve el núcleo de despacho;
//! `AppError` es la frontera HTTP y el único lugar donde se traduce a códigos
//! de estado.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::models::EntityKind;
use crate::services::state_machine::IllegalTransition;

/// Motivo de una precondición de negocio fallida (422)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PreconditionReason {
    VehicleNotAvailable,
    DriverSuspended,
    DriverNotOnDuty,
    LicenseExpired,
    LicenseCategoryMismatch,
    CargoExceedsCapacity,
    OdometerRegression,
    InvalidFuelLog,
    VehicleNotRetired,
    VehicleHasActiveTrip,
    RegistrationTaken,
}

impl PreconditionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            PreconditionReason::VehicleNotAvailable => "VEHICLE_NOT_AVAILABLE",
            PreconditionReason::DriverSuspended => "DRIVER_SUSPENDED",
            PreconditionReason::DriverNotOnDuty => "DRIVER_NOT_ON_DUTY",
            PreconditionReason::LicenseExpired => "LICENSE_EXPIRED",
            PreconditionReason::LicenseCategoryMismatch => "LICENSE_CATEGORY_MISMATCH",
            PreconditionReason::CargoExceedsCapacity => "CARGO_EXCEEDS_CAPACITY",
            PreconditionReason::OdometerRegression => "ODOMETER_REGRESSION",
            PreconditionReason::InvalidFuelLog => "INVALID_FUEL_LOG",
            PreconditionReason::VehicleNotRetired => "VEHICLE_NOT_RETIRED",
            PreconditionReason::VehicleHasActiveTrip => "VEHICLE_HAS_ACTIVE_TRIP",
            PreconditionReason::RegistrationTaken => "REGISTRATION_TAKEN",
        }
    }
}

/// Clase de conflicto de concurrencia (409, reintentable)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConflictKind {
    DoubleDispatchPrevented,
    ResourceLocked,
    ConcurrentModification,
}

impl ConflictKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConflictKind::DoubleDispatchPrevented => "DOUBLE_DISPATCH_PREVENTED",
            ConflictKind::ResourceLocked => "RESOURCE_LOCKED",
            ConflictKind::ConcurrentModification => "CONCURRENT_MODIFICATION",
        }
    }
}

/// Errores del núcleo de despacho
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("{entity} '{id}' not found")]
    NotFound { entity: EntityKind, id: Uuid },

    #[error("{detail}")]
    PreconditionFailed {
        reason: PreconditionReason,
        detail: String,
    },

    #[error(transparent)]
    IllegalTransition(#[from] IllegalTransition),

    #[error("{detail}")]
    Conflict { kind: ConflictKind, detail: String },

    #[error("unclassified failure: {0}")]
    Unclassified(String),
}

/// Resultado tipado del núcleo
pub type DomainResult<T> = Result<T, DomainError>;

impl DomainError {
    pub fn not_found(entity: EntityKind, id: Uuid) -> Self {
        DomainError::NotFound { entity, id }
    }

    pub fn precondition(reason: PreconditionReason, detail: impl Into<String>) -> Self {
        DomainError::PreconditionFailed {
            reason,
            detail: detail.into(),
        }
    }

    pub fn conflict(kind: ConflictKind, detail: impl Into<String>) -> Self {
        DomainError::Conflict {
            kind,
            detail: detail.into(),
        }
    }

    /// Código estable sobre el que ramifican los clientes
    pub fn reason(&self) -> &'static str {
        match self {
            DomainError::NotFound { entity, .. } => match entity {
                EntityKind::Vehicle => "VEHICLE_NOT_FOUND",
                EntityKind::Driver => "DRIVER_NOT_FOUND",
                EntityKind::Trip => "TRIP_NOT_FOUND",
            },
            DomainError::PreconditionFailed { reason, .. } => reason.as_str(),
            DomainError::IllegalTransition(_) => "ILLEGAL_STATE_TRANSITION",
            DomainError::Conflict { kind, .. } => kind.as_str(),
            DomainError::Unclassified(_) => "UNCLASSIFIED",
        }
    }

    /// Categoría de la taxonomía
    pub fn category(&self) -> &'static str {
        match self {
            DomainError::NotFound { .. } => "NOT_FOUND",
            DomainError::PreconditionFailed { .. } => "PRECONDITION_FAILED",
            DomainError::IllegalTransition(_) => "ILLEGAL_STATE_TRANSITION",
            DomainError::Conflict { .. } => "CONCURRENCY_CONFLICT",
            DomainError::Unclassified(_) => "INTERNAL_ERROR",
        }
    }

    /// Sólo los conflictos de concurrencia se pueden reintentar tal cual
    pub fn is_retryable(&self) -> bool {
        matches!(self, DomainError::Conflict { .. })
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
            DomainError::PreconditionFailed { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            DomainError::IllegalTransition(_) | DomainError::Conflict { .. } => {
                StatusCode::CONFLICT
            }
            DomainError::Unclassified(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn conflict_kind(&self) -> Option<ConflictKind> {
        match self {
            DomainError::Conflict { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        crate::database::conflict::classify(&err)
    }
}

/// Errores principales de la aplicación (frontera HTTP)
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Rechazo de `POST /trips`: se responde con `code = DISPATCH_BLOCKED`
    #[error("dispatch blocked: {0}")]
    DispatchBlocked(DomainError),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl AppError {
    /// Envuelve un error del protocolo de despacho; 404 y 500 conservan su código
    pub fn dispatch_blocked(err: DomainError) -> Self {
        match err {
            DomainError::PreconditionFailed { .. }
            | DomainError::IllegalTransition(_)
            | DomainError::Conflict { .. } => AppError::DispatchBlocked(err),
            other => AppError::Domain(other),
        }
    }
}

/// Respuesta de error para la API
#[derive(Debug, Serialize)]
struct ErrorResponse {
    code: String,
    reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
    retryable: bool,
}

impl ErrorResponse {
    fn new(code: &str, reason: &str, detail: Option<String>, retryable: bool) -> Self {
        Self {
            code: code.to_string(),
            reason: reason.to_string(),
            detail,
            retryable,
        }
    }
}

fn domain_response(code: &str, err: &DomainError) -> (StatusCode, ErrorResponse) {
    let status = err.status_code();
    let detail = if status.is_server_error() {
        tracing::error!(reason = err.reason(), error = %err, "❌ Fallo no clasificado");
        Some("An unexpected error occurred".to_string())
    } else {
        tracing::warn!(reason = err.reason(), error = %err, "Solicitud rechazada");
        Some(err.to_string())
    };
    (
        status,
        ErrorResponse::new(code, err.reason(), detail, err.is_retryable()),
    )
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_response) = match &self {
            AppError::Domain(err) => domain_response(err.category(), err),

            AppError::DispatchBlocked(err) => domain_response("DISPATCH_BLOCKED", err),

            AppError::Validation(e) => {
                tracing::warn!("Validation error: {}", e);
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse::new(
                        "VALIDATION_ERROR",
                        "INVALID_REQUEST",
                        Some(e.to_string()),
                        false,
                    ),
                )
            }

            AppError::BadRequest(msg) => {
                tracing::warn!("Bad request: {}", msg);
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse::new("VALIDATION_ERROR", "BAD_REQUEST", Some(msg.clone()), false),
                )
            }
        };

        (status, Json(error_response)).into_response()
    }
}

/// Resultado tipado para operaciones que pueden fallar
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::VehicleStatus;
    use crate::services::state_machine::transition;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn precondition_on_dispatch_is_422_dispatch_blocked() {
        let err = DomainError::precondition(
            PreconditionReason::CargoExceedsCapacity,
            "cargo 1200 kg exceeds max load 1000 kg",
        );
        let response = AppError::dispatch_blocked(err).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = body_json(response).await;
        assert_eq!(body["code"], "DISPATCH_BLOCKED");
        assert_eq!(body["reason"], "CARGO_EXCEEDS_CAPACITY");
        assert_eq!(body["retryable"], false);
        assert!(body["detail"].as_str().unwrap().contains("1200"));
    }

    #[tokio::test]
    async fn double_dispatch_is_409_and_retryable() {
        let err = DomainError::conflict(
            ConflictKind::DoubleDispatchPrevented,
            "vehicle already has an active trip",
        );
        let response = AppError::dispatch_blocked(err).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let body = body_json(response).await;
        assert_eq!(body["reason"], "DOUBLE_DISPATCH_PREVENTED");
        assert_eq!(body["retryable"], true);
    }

    #[tokio::test]
    async fn not_found_keeps_its_own_code_on_dispatch() {
        let err = DomainError::not_found(EntityKind::Driver, Uuid::nil());
        let response = AppError::dispatch_blocked(err).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = body_json(response).await;
        assert_eq!(body["code"], "NOT_FOUND");
        assert_eq!(body["reason"], "DRIVER_NOT_FOUND");
    }

    #[tokio::test]
    async fn illegal_transition_is_409_not_retryable() {
        let err: DomainError = transition(VehicleStatus::Retired, VehicleStatus::Available)
            .unwrap_err()
            .into();
        let response = AppError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let body = body_json(response).await;
        assert_eq!(body["code"], "ILLEGAL_STATE_TRANSITION");
        assert_eq!(body["reason"], "ILLEGAL_STATE_TRANSITION");
        assert_eq!(body["retryable"], false);
    }

    #[tokio::test]
    async fn unclassified_hides_the_internal_message() {
        let err = DomainError::Unclassified("connection reset by peer".to_string());
        let response = AppError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["code"], "INTERNAL_ERROR");
        assert!(!body["detail"].as_str().unwrap().contains("connection reset"));
    }

    #[test]
    fn only_conflicts_are_retryable() {
        assert!(DomainError::conflict(ConflictKind::ResourceLocked, "x").is_retryable());
        assert!(
            !DomainError::precondition(PreconditionReason::LicenseExpired, "x").is_retryable()
        );
        assert!(!DomainError::not_found(EntityKind::Trip, Uuid::nil()).is_retryable());
    }

    #[test]
    fn reserved_vehicle_is_a_precondition() {
        let err = DomainError::precondition(PreconditionReason::VehicleHasActiveTrip, "draft");
        assert_eq!(err.reason(), "VEHICLE_HAS_ACTIVE_TRIP");
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
