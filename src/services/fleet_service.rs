//! Operaciones directas sobre una sola entidad
//!
//! Altas, cambios manuales de estado, retiro y borrado lógico. Cada mutación
//! es su propia transacción read committed con bloqueo NOWAIT y su entrada de
//! auditoría. `on_trip` nunca se alcanza ni se abandona desde aquí.

use serde_json::json;
use sqlx::{PgConnection, PgPool};
use tracing::info;
use uuid::Uuid;

use crate::database::conflict::{is_unique_violation, VEHICLE_REGISTRATION_CONSTRAINT};
use crate::database::{IsolationLevel, LockSet};
use crate::models::{
    AuditEntry, AuditLog, Driver, DriverStatus, EntityKind, FuelLog, NewDriver, NewVehicle,
    Trip, TripStatus, Vehicle, VehicleStatus,
};
use crate::repositories::{
    audit_repository, driver_repository, fuel_log_repository, trip_repository,
    vehicle_repository,
};
use crate::services::audit_service;
use crate::services::protocol::{run_protocol, PhaseTracker, ProtocolPhase};
use crate::services::transition_service::{self, TransitionContext};
use crate::utils::errors::{DomainError, DomainResult, PreconditionReason};

/// Límite por defecto del historial de auditoría
pub const DEFAULT_AUDIT_LIMIT: i64 = 100;
pub const MAX_AUDIT_LIMIT: i64 = 1000;

#[derive(Clone)]
pub struct FleetService {
    pool: PgPool,
}

impl FleetService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_vehicle(&self, new: NewVehicle, actor: &str) -> DomainResult<Vehicle> {
        let actor = actor.to_string();
        let vehicle = run_protocol(
            &self.pool,
            "create_vehicle",
            IsolationLevel::ReadCommitted,
            move |conn, phase| Box::pin(async move { create_vehicle_in_tx(conn, phase, new, &actor).await }),
        )
        .await?;

        info!(vehicle = %vehicle.registration, "🚛 Vehículo registrado");
        Ok(vehicle)
    }

    pub async fn create_driver(&self, new: NewDriver, actor: &str) -> DomainResult<Driver> {
        let actor = actor.to_string();
        let driver = run_protocol(
            &self.pool,
            "create_driver",
            IsolationLevel::ReadCommitted,
            move |conn, phase| {
                Box::pin(async move {
                    phase.advance(ProtocolPhase::Mutating);
                    let driver = driver_repository::insert(&mut *conn, &new).await?;

                    phase.advance(ProtocolPhase::Auditing);
                    let entry = AuditEntry::new(
                        EntityKind::Driver,
                        driver.id,
                        "entity_created",
                        &actor,
                        json!({
                            "to": driver.status.as_str(),
                            "full_name": driver.full_name,
                            "license_expiry": driver.license_expiry,
                            "license_category": driver.license_category,
                        }),
                    );
                    audit_service::append(&mut *conn, &entry).await?;
                    Ok(driver)
                })
            },
        )
        .await?;

        info!(driver = %driver.full_name, "🧑‍✈️ Conductor registrado");
        Ok(driver)
    }

    /// Cambio manual available <-> in_shop (y cualquier otra arista no reservada)
    pub async fn set_vehicle_status(
        &self,
        vehicle_id: Uuid,
        target: VehicleStatus,
        actor: &str,
    ) -> DomainResult<Vehicle> {
        let actor = actor.to_string();
        run_protocol(
            &self.pool,
            "set_vehicle_status",
            IsolationLevel::ReadCommitted,
            move |conn, phase| {
                Box::pin(async move {
                    manual_vehicle_in_tx(conn, phase, vehicle_id, target, &actor).await
                })
            },
        )
        .await
    }

    /// `PATCH /vehicles/{id}/retire`
    pub async fn retire_vehicle(&self, vehicle_id: Uuid, actor: &str) -> DomainResult<Vehicle> {
        let actor = actor.to_string();
        let vehicle = run_protocol(
            &self.pool,
            "retire_vehicle",
            IsolationLevel::ReadCommitted,
            move |conn, phase| {
                Box::pin(async move {
                    manual_vehicle_in_tx(conn, phase, vehicle_id, VehicleStatus::Retired, &actor)
                        .await
                })
            },
        )
        .await?;

        info!(vehicle = %vehicle.registration, "🪦 Vehículo retirado");
        Ok(vehicle)
    }

    /// Borrado lógico; sólo para vehículos ya retirados
    pub async fn soft_delete_vehicle(&self, vehicle_id: Uuid, actor: &str) -> DomainResult<Vehicle> {
        let actor = actor.to_string();
        run_protocol(
            &self.pool,
            "soft_delete_vehicle",
            IsolationLevel::ReadCommitted,
            move |conn, phase| {
                Box::pin(async move {
                    phase.advance(ProtocolPhase::Locking);
                    let vehicle = lock_vehicle(&mut *conn, vehicle_id).await?;

                    phase.advance(ProtocolPhase::Guarding);
                    if vehicle.status != VehicleStatus::Retired {
                        return Err(DomainError::precondition(
                            PreconditionReason::VehicleNotRetired,
                            format!(
                                "vehicle {} is {}, only retired vehicles can be deleted",
                                vehicle.registration,
                                vehicle.status.as_str()
                            ),
                        ));
                    }
                    ensure_no_active_trip(&mut *conn, &vehicle).await?;

                    phase.advance(ProtocolPhase::Mutating);
                    let deleted = vehicle_repository::soft_delete(&mut *conn, vehicle.id).await?;

                    phase.advance(ProtocolPhase::Auditing);
                    let entry = AuditEntry::new(
                        EntityKind::Vehicle,
                        deleted.id,
                        "vehicle_soft_deleted",
                        &actor,
                        json!({ "registration": deleted.registration, "deleted_at": deleted.deleted_at }),
                    );
                    audit_service::append(&mut *conn, &entry).await?;
                    Ok(deleted)
                })
            },
        )
        .await
    }

    /// `PATCH /drivers/{id}/status`
    pub async fn set_driver_status(
        &self,
        driver_id: Uuid,
        target: DriverStatus,
        actor: &str,
    ) -> DomainResult<Driver> {
        let actor = actor.to_string();
        let driver = run_protocol(
            &self.pool,
            "set_driver_status",
            IsolationLevel::ReadCommitted,
            move |conn, phase| {
                Box::pin(async move {
                    phase.advance(ProtocolPhase::Locking);
                    let mut driver = LockSet::new()
                        .driver(driver_id)
                        .acquire(&mut *conn)
                        .await?
                        .driver
                        .ok_or_else(|| DomainError::not_found(EntityKind::Driver, driver_id))?;

                    phase.advance(ProtocolPhase::Mutating);
                    let ctx = TransitionContext::new(&actor);
                    let entry = transition_service::manual_driver_transition(
                        &mut *conn,
                        &mut driver,
                        target,
                        &ctx,
                    )
                    .await?;

                    phase.advance(ProtocolPhase::Auditing);
                    audit_service::append(&mut *conn, &entry).await?;
                    Ok(driver)
                })
            },
        )
        .await?;

        info!(driver = %driver.full_name, status = driver.status.as_str(), "👤 Estado de conductor actualizado");
        Ok(driver)
    }

    pub async fn get_vehicle(&self, id: Uuid) -> DomainResult<Vehicle> {
        vehicle_repository::find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| DomainError::not_found(EntityKind::Vehicle, id))
    }

    pub async fn list_vehicles(&self) -> DomainResult<Vec<Vehicle>> {
        Ok(vehicle_repository::list(&self.pool).await?)
    }

    pub async fn get_driver(&self, id: Uuid) -> DomainResult<Driver> {
        driver_repository::find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| DomainError::not_found(EntityKind::Driver, id))
    }

    pub async fn list_drivers(&self) -> DomainResult<Vec<Driver>> {
        Ok(driver_repository::list(&self.pool).await?)
    }

    pub async fn get_trip(&self, id: Uuid) -> DomainResult<Trip> {
        trip_repository::find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| DomainError::not_found(EntityKind::Trip, id))
    }

    /// Viaje con sus cargas de combustible
    pub async fn get_trip_with_fuel(&self, id: Uuid) -> DomainResult<(Trip, Vec<FuelLog>)> {
        let trip = self.get_trip(id).await?;
        let fuel_logs = fuel_log_repository::find_by_trip(&self.pool, trip.id).await?;
        Ok((trip, fuel_logs))
    }

    pub async fn list_trips(&self, status: Option<TripStatus>) -> DomainResult<Vec<Trip>> {
        Ok(trip_repository::list(&self.pool, status).await?)
    }

    /// Historial de auditoría en orden de escritura
    pub async fn audit_history(
        &self,
        entity_type: Option<EntityKind>,
        entity_id: Option<Uuid>,
        limit: Option<i64>,
    ) -> DomainResult<Vec<AuditLog>> {
        let limit = clamp_audit_limit(limit);
        Ok(audit_repository::list(
            &self.pool,
            entity_type.map(|kind| kind.as_str()),
            entity_id,
            limit,
        )
        .await?)
    }
}

fn clamp_audit_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_AUDIT_LIMIT).clamp(1, MAX_AUDIT_LIMIT)
}

async fn lock_vehicle(conn: &mut PgConnection, vehicle_id: Uuid) -> DomainResult<Vehicle> {
    LockSet::new()
        .vehicle(vehicle_id)
        .acquire(conn)
        .await?
        .vehicle
        .ok_or_else(|| DomainError::not_found(EntityKind::Vehicle, vehicle_id))
}

/// Un vehículo reservado por un viaje activo no puede retirarse ni borrarse:
/// el viaje quedaría sin poder cancelarse y su conductor bloqueado.
async fn ensure_no_active_trip(conn: &mut PgConnection, vehicle: &Vehicle) -> DomainResult<()> {
    match trip_repository::find_active_by_vehicle(conn, vehicle.id).await? {
        Some(trip) => Err(DomainError::precondition(
            PreconditionReason::VehicleHasActiveTrip,
            format!(
                "vehicle {} is reserved by {} trip {}",
                vehicle.registration,
                trip.status.as_str(),
                trip.id
            ),
        )),
        None => Ok(()),
    }
}

async fn create_vehicle_in_tx(
    conn: &mut PgConnection,
    phase: &mut PhaseTracker,
    new: NewVehicle,
    actor: &str,
) -> DomainResult<Vehicle> {
    phase.advance(ProtocolPhase::Mutating);
    let vehicle = match vehicle_repository::insert(&mut *conn, &new).await {
        Ok(vehicle) => vehicle,
        Err(e) if is_unique_violation(&e, VEHICLE_REGISTRATION_CONSTRAINT) => {
            return Err(DomainError::precondition(
                PreconditionReason::RegistrationTaken,
                format!("registration {} is already in use", new.registration),
            ));
        }
        Err(e) => return Err(e.into()),
    };

    phase.advance(ProtocolPhase::Auditing);
    let entry = AuditEntry::new(
        EntityKind::Vehicle,
        vehicle.id,
        "entity_created",
        actor,
        json!({
            "to": vehicle.status.as_str(),
            "registration": vehicle.registration,
            "odometer": vehicle.odometer,
            "max_load_kg": vehicle.max_load_kg,
        }),
    );
    audit_service::append(&mut *conn, &entry).await?;
    Ok(vehicle)
}

async fn manual_vehicle_in_tx(
    conn: &mut PgConnection,
    phase: &mut PhaseTracker,
    vehicle_id: Uuid,
    target: VehicleStatus,
    actor: &str,
) -> DomainResult<Vehicle> {
    phase.advance(ProtocolPhase::Locking);
    let mut vehicle = lock_vehicle(&mut *conn, vehicle_id).await?;

    if target == VehicleStatus::Retired {
        phase.advance(ProtocolPhase::Guarding);
        ensure_no_active_trip(&mut *conn, &vehicle).await?;
    }

    phase.advance(ProtocolPhase::Mutating);
    let ctx = TransitionContext::new(actor);
    let entry =
        transition_service::manual_vehicle_transition(&mut *conn, &mut vehicle, target, &ctx)
            .await?;

    phase.advance(ProtocolPhase::Auditing);
    audit_service::append(&mut *conn, &entry).await?;
    Ok(vehicle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn audit_limit_defaults_and_is_bounded() {
        assert_eq!(clamp_audit_limit(None), DEFAULT_AUDIT_LIMIT);
        assert_eq!(clamp_audit_limit(Some(0)), 1);
        assert_eq!(clamp_audit_limit(Some(-5)), 1);
        assert_eq!(clamp_audit_limit(Some(50)), 50);
        assert_eq!(clamp_audit_limit(Some(10_000)), MAX_AUDIT_LIMIT);
    }
}
