//! Clasificador de conflictos
//!
//! Traduce las señales de PostgreSQL (SQLSTATE + nombre de restricción) a la
//! taxonomía estable de `DomainError`. Es el único sitio que conoce los
//! códigos nativos del motor.

use crate::utils::errors::{ConflictKind, DomainError};

pub const UNIQUE_VIOLATION: &str = "23505";
pub const LOCK_NOT_AVAILABLE: &str = "55P03";
pub const SERIALIZATION_FAILURE: &str = "40001";
pub const DEADLOCK_DETECTED: &str = "40P01";

pub const ACTIVE_TRIP_VEHICLE_CONSTRAINT: &str = "uq_trips_active_vehicle";
pub const ACTIVE_TRIP_DRIVER_CONSTRAINT: &str = "uq_trips_active_driver";
pub const VEHICLE_REGISTRATION_CONSTRAINT: &str = "vehicles_registration_key";

/// Clasifica un par (SQLSTATE, restricción). `None` si no es un conflicto conocido.
pub fn classify_sqlstate(code: Option<&str>, constraint: Option<&str>) -> Option<ConflictKind> {
    match code? {
        UNIQUE_VIOLATION
            if matches!(
                constraint,
                Some(ACTIVE_TRIP_VEHICLE_CONSTRAINT) | Some(ACTIVE_TRIP_DRIVER_CONSTRAINT)
            ) =>
        {
            Some(ConflictKind::DoubleDispatchPrevented)
        }
        LOCK_NOT_AVAILABLE => Some(ConflictKind::ResourceLocked),
        SERIALIZATION_FAILURE | DEADLOCK_DETECTED => Some(ConflictKind::ConcurrentModification),
        _ => None,
    }
}

fn conflict_detail(kind: ConflictKind, constraint: Option<&str>) -> String {
    match (kind, constraint) {
        (ConflictKind::DoubleDispatchPrevented, Some(ACTIVE_TRIP_VEHICLE_CONSTRAINT)) => {
            "vehicle already has an active trip".to_string()
        }
        (ConflictKind::DoubleDispatchPrevented, _) => "driver already has an active trip".to_string(),
        (ConflictKind::ResourceLocked, _) => {
            "resource is being modified by another request, retry".to_string()
        }
        (ConflictKind::ConcurrentModification, _) => {
            "concurrent modification detected, retry the whole operation".to_string()
        }
    }
}

/// ¿Es una violación de unicidad sobre `constraint`?
pub fn is_unique_violation(err: &sqlx::Error, constraint: &str) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            db_err.code().as_deref() == Some(UNIQUE_VIOLATION)
                && db_err.constraint() == Some(constraint)
        }
        _ => false,
    }
}

/// Clasifica un error de sqlx; lo no reconocido queda como `Unclassified`
pub fn classify(err: &sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = err {
        let code = db_err.code();
        if let Some(kind) = classify_sqlstate(code.as_deref(), db_err.constraint()) {
            tracing::debug!(
                sqlstate = code.as_deref().unwrap_or(""),
                reason = kind.as_str(),
                "Conflicto de almacenamiento clasificado"
            );
            return DomainError::conflict(kind, conflict_detail(kind, db_err.constraint()));
        }
    }
    DomainError::Unclassified(err.to_string())
}
