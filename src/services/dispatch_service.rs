//! Protocolo de despacho
//!
//! Crear, despachar, completar y cancelar viajes. Cada operación es una única
//! transacción: bloquea vehículo, conductor y viaje en el orden global,
//! valida contra las instantáneas bloqueadas, aplica las transiciones
//! guardadas y escribe una entrada de auditoría por transición. Cualquier
//! fallo revierte la unidad completa, auditoría incluida.
//!
//! Crear y despachar usan aislamiento serializable como segunda línea de
//! defensa frente a write skew; completar y cancelar usan read committed.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::json;
use sqlx::{PgConnection, PgPool};
use tracing::info;
use uuid::Uuid;

use crate::database::{IsolationLevel, LockSet};
use crate::models::{
    AuditEntry, Driver, DriverStatus, EntityKind, FuelLog, Trip, TripStatus, Vehicle,
    VehicleStatus,
};
use crate::repositories::{fuel_log_repository, trip_repository};
use crate::services::audit_service::{self, PendingAudit};
use crate::services::post_commit::{PostCommitRunner, PostCommitTask};
use crate::services::preconditions;
use crate::services::protocol::{run_protocol, PhaseTracker, ProtocolPhase};
use crate::services::state_machine::transition;
use crate::services::transition_service::{self, TransitionContext};
use crate::utils::errors::{ConflictKind, DomainError, DomainResult};

#[derive(Debug, Clone, Copy)]
pub struct CreateTripCommand {
    pub vehicle_id: Uuid,
    pub driver_id: Uuid,
    pub cargo_weight_kg: i32,
}

#[derive(Debug, Clone, Copy)]
pub struct CompleteTripCommand {
    pub trip_id: Uuid,
    pub final_odometer: i64,
    pub liters: Option<Decimal>,
    pub fuel_cost: Option<Decimal>,
}

/// Estado final de las tres entidades tras la operación
#[derive(Debug, Clone, Serialize)]
pub struct DispatchOutcome {
    pub trip: Trip,
    pub vehicle: Vehicle,
    pub driver: Driver,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompletionOutcome {
    pub trip: Trip,
    pub vehicle: Vehicle,
    pub driver: Driver,
    pub fuel_log: Option<FuelLog>,
}

#[derive(Clone)]
pub struct DispatchService {
    pool: PgPool,
    post_commit: PostCommitRunner,
}

impl DispatchService {
    pub fn new(pool: PgPool, post_commit: PostCommitRunner) -> Self {
        Self { pool, post_commit }
    }

    /// `POST /trips`: inserta el viaje y lo despacha en la misma unidad
    pub async fn create_trip(
        &self,
        cmd: CreateTripCommand,
        actor: &str,
    ) -> DomainResult<DispatchOutcome> {
        let actor = actor.to_string();
        let today = Utc::now().date_naive();

        let outcome = run_protocol(
            &self.pool,
            "create_trip",
            IsolationLevel::Serializable,
            move |conn, phase| {
                Box::pin(async move { create_trip_in_tx(conn, phase, cmd, &actor, today).await })
            },
        )
        .await?;

        info!(
            trip_id = %outcome.trip.id,
            vehicle = %outcome.vehicle.registration,
            driver = %outcome.driver.full_name,
            "🚚 Viaje despachado"
        );
        self.post_commit.spawn(vec![PostCommitTask::ServiceDueCheck {
            vehicle_id: outcome.vehicle.id,
        }]);
        Ok(outcome)
    }

    /// `POST /trips/draft`: reserva vehículo y conductor sin despachar
    pub async fn create_draft(&self, cmd: CreateTripCommand, actor: &str) -> DomainResult<Trip> {
        let actor = actor.to_string();
        let today = Utc::now().date_naive();

        run_protocol(
            &self.pool,
            "create_draft",
            IsolationLevel::Serializable,
            move |conn, phase| {
                Box::pin(async move { create_draft_in_tx(conn, phase, cmd, &actor, today).await })
            },
        )
        .await
    }

    /// `POST /trips/{id}/dispatch`: despacha un borrador existente
    pub async fn dispatch_draft(&self, trip_id: Uuid, actor: &str) -> DomainResult<DispatchOutcome> {
        let actor = actor.to_string();
        let today = Utc::now().date_naive();

        let outcome = run_protocol(
            &self.pool,
            "dispatch_draft",
            IsolationLevel::Serializable,
            move |conn, phase| {
                Box::pin(
                    async move { dispatch_draft_in_tx(conn, phase, trip_id, &actor, today).await },
                )
            },
        )
        .await?;

        self.post_commit.spawn(vec![PostCommitTask::ServiceDueCheck {
            vehicle_id: outcome.vehicle.id,
        }]);
        Ok(outcome)
    }

    /// `POST /trips/complete`
    pub async fn complete_trip(
        &self,
        cmd: CompleteTripCommand,
        actor: &str,
    ) -> DomainResult<CompletionOutcome> {
        let actor = actor.to_string();

        let outcome = run_protocol(
            &self.pool,
            "complete_trip",
            IsolationLevel::ReadCommitted,
            move |conn, phase| Box::pin(async move { complete_in_tx(conn, phase, cmd, &actor).await }),
        )
        .await?;

        info!(
            trip_id = %outcome.trip.id,
            odometer = outcome.vehicle.odometer,
            "🏁 Viaje completado"
        );
        self.post_commit.spawn(vec![PostCommitTask::ServiceDueCheck {
            vehicle_id: outcome.vehicle.id,
        }]);
        Ok(outcome)
    }

    /// `POST /trips/cancel`
    pub async fn cancel_trip(&self, trip_id: Uuid, actor: &str) -> DomainResult<DispatchOutcome> {
        let actor = actor.to_string();

        run_protocol(
            &self.pool,
            "cancel_trip",
            IsolationLevel::ReadCommitted,
            move |conn, phase| Box::pin(async move { cancel_in_tx(conn, phase, trip_id, &actor).await }),
        )
        .await
    }
}

fn trip_created_entry(trip: &Trip, actor: &str) -> AuditEntry {
    AuditEntry::new(
        EntityKind::Trip,
        trip.id,
        "trip_created",
        actor,
        json!({
            "to": trip.status.as_str(),
            "vehicle_id": trip.vehicle_id,
            "driver_id": trip.driver_id,
            "cargo_weight_kg": trip.cargo_weight_kg,
            "start_odometer": trip.start_odometer,
        }),
    )
}

/// Lectura sin bloqueo para conocer vehículo y conductor antes de bloquear en orden
async fn read_trip(conn: &mut PgConnection, trip_id: Uuid) -> DomainResult<Trip> {
    trip_repository::find_by_id(&mut *conn, trip_id)
        .await?
        .ok_or_else(|| DomainError::not_found(EntityKind::Trip, trip_id))
}

/// Bloquea vehículo, conductor y viaje y comprueba que el viaje bloqueado
/// sigue apuntando a los recursos que se bloquearon
async fn lock_trip_resources(
    conn: &mut PgConnection,
    unlocked: &Trip,
) -> DomainResult<(Vehicle, Driver, Trip)> {
    let (vehicle, driver, trip) = LockSet::new()
        .vehicle(unlocked.vehicle_id)
        .driver(unlocked.driver_id)
        .trip(unlocked.id)
        .acquire(conn)
        .await?
        .into_all()?;

    if trip.vehicle_id != vehicle.id || trip.driver_id != driver.id {
        return Err(DomainError::conflict(
            ConflictKind::ConcurrentModification,
            format!("trip {} changed while its resources were being locked", trip.id),
        ));
    }
    Ok((vehicle, driver, trip))
}

/// Vehicle available->on_trip, Driver on_duty->on_trip, Trip draft->dispatched
async fn move_to_dispatched(
    conn: &mut PgConnection,
    vehicle: &mut Vehicle,
    driver: &mut Driver,
    trip: &mut Trip,
    actor: &str,
    pending: &mut PendingAudit,
) -> DomainResult<()> {
    let ctx = TransitionContext::for_trip(actor, trip.id);
    pending.push(
        transition_service::transition_vehicle(&mut *conn, vehicle, VehicleStatus::OnTrip, None, &ctx)
            .await?,
    );
    pending.push(
        transition_service::transition_driver(&mut *conn, driver, DriverStatus::OnTrip, &ctx).await?,
    );
    pending.push(
        transition_service::transition_trip(&mut *conn, trip, TripStatus::Dispatched, &ctx).await?,
    );
    Ok(())
}

async fn create_trip_in_tx(
    conn: &mut PgConnection,
    phase: &mut PhaseTracker,
    cmd: CreateTripCommand,
    actor: &str,
    today: NaiveDate,
) -> DomainResult<DispatchOutcome> {
    phase.advance(ProtocolPhase::Locking);
    let (mut vehicle, mut driver) = LockSet::new()
        .vehicle(cmd.vehicle_id)
        .driver(cmd.driver_id)
        .acquire(&mut *conn)
        .await?
        .into_vehicle_and_driver()?;

    phase.advance(ProtocolPhase::Guarding);
    preconditions::check_dispatch(&vehicle, &driver, cmd.cargo_weight_kg, today)?;

    phase.advance(ProtocolPhase::Mutating);
    let mut trip = trip_repository::insert_draft(
        &mut *conn,
        vehicle.id,
        driver.id,
        cmd.cargo_weight_kg,
        vehicle.odometer,
        actor,
    )
    .await?;
    let mut pending = PendingAudit::from(trip_created_entry(&trip, actor));
    move_to_dispatched(conn, &mut vehicle, &mut driver, &mut trip, actor, &mut pending).await?;

    phase.advance(ProtocolPhase::Auditing);
    audit_service::append_all(&mut *conn, pending).await?;

    Ok(DispatchOutcome {
        trip,
        vehicle,
        driver,
    })
}

async fn create_draft_in_tx(
    conn: &mut PgConnection,
    phase: &mut PhaseTracker,
    cmd: CreateTripCommand,
    actor: &str,
    today: NaiveDate,
) -> DomainResult<Trip> {
    phase.advance(ProtocolPhase::Locking);
    let (vehicle, driver) = LockSet::new()
        .vehicle(cmd.vehicle_id)
        .driver(cmd.driver_id)
        .acquire(&mut *conn)
        .await?
        .into_vehicle_and_driver()?;

    phase.advance(ProtocolPhase::Guarding);
    preconditions::check_draft(&vehicle, &driver, cmd.cargo_weight_kg, today)?;

    phase.advance(ProtocolPhase::Mutating);
    let trip = trip_repository::insert_draft(
        &mut *conn,
        vehicle.id,
        driver.id,
        cmd.cargo_weight_kg,
        vehicle.odometer,
        actor,
    )
    .await?;

    phase.advance(ProtocolPhase::Auditing);
    audit_service::append(&mut *conn, &trip_created_entry(&trip, actor)).await?;
    Ok(trip)
}

async fn dispatch_draft_in_tx(
    conn: &mut PgConnection,
    phase: &mut PhaseTracker,
    trip_id: Uuid,
    actor: &str,
    today: NaiveDate,
) -> DomainResult<DispatchOutcome> {
    let unlocked = read_trip(&mut *conn, trip_id).await?;

    phase.advance(ProtocolPhase::Locking);
    let (mut vehicle, mut driver, mut trip) = lock_trip_resources(&mut *conn, &unlocked).await?;

    phase.advance(ProtocolPhase::Guarding);
    transition(trip.status, TripStatus::Dispatched)?;
    preconditions::check_dispatch(&vehicle, &driver, trip.cargo_weight_kg, today)?;

    phase.advance(ProtocolPhase::Mutating);
    if trip.start_odometer != vehicle.odometer {
        trip_repository::set_start_odometer(&mut *conn, trip.id, vehicle.odometer).await?;
        trip.start_odometer = vehicle.odometer;
    }
    let mut pending = PendingAudit::new();
    move_to_dispatched(conn, &mut vehicle, &mut driver, &mut trip, actor, &mut pending).await?;

    phase.advance(ProtocolPhase::Auditing);
    audit_service::append_all(&mut *conn, pending).await?;

    Ok(DispatchOutcome {
        trip,
        vehicle,
        driver,
    })
}

async fn complete_in_tx(
    conn: &mut PgConnection,
    phase: &mut PhaseTracker,
    cmd: CompleteTripCommand,
    actor: &str,
) -> DomainResult<CompletionOutcome> {
    let unlocked = read_trip(&mut *conn, cmd.trip_id).await?;

    phase.advance(ProtocolPhase::Locking);
    let (mut vehicle, mut driver, mut trip) = lock_trip_resources(&mut *conn, &unlocked).await?;

    phase.advance(ProtocolPhase::Guarding);
    transition(trip.status, TripStatus::Completed)?;
    transition(vehicle.status, VehicleStatus::Available)?;
    transition(driver.status, DriverStatus::OnDuty)?;
    preconditions::check_final_odometer(trip.start_odometer, vehicle.odometer, cmd.final_odometer)?;
    let fuel = preconditions::check_fuel(cmd.liters, cmd.fuel_cost)?;

    phase.advance(ProtocolPhase::Mutating);
    let fuel_log = match fuel {
        Some(entry) => Some(
            fuel_log_repository::insert(
                &mut *conn,
                trip.id,
                vehicle.id,
                entry.liters,
                entry.fuel_cost,
                cmd.final_odometer,
            )
            .await?,
        ),
        None => None,
    };
    trip_repository::set_end_odometer(&mut *conn, trip.id, cmd.final_odometer).await?;
    trip.end_odometer = Some(cmd.final_odometer);

    let ctx = TransitionContext::for_trip(actor, trip.id);
    let mut pending = PendingAudit::new();
    pending.push(
        transition_service::transition_vehicle(
            &mut *conn,
            &mut vehicle,
            VehicleStatus::Available,
            Some(cmd.final_odometer),
            &ctx,
        )
        .await?,
    );
    pending.push(
        transition_service::transition_driver(&mut *conn, &mut driver, DriverStatus::OnDuty, &ctx)
            .await?,
    );
    pending.push(
        transition_service::transition_trip(&mut *conn, &mut trip, TripStatus::Completed, &ctx)
            .await?,
    );

    phase.advance(ProtocolPhase::Auditing);
    audit_service::append_all(&mut *conn, pending).await?;

    Ok(CompletionOutcome {
        trip,
        vehicle,
        driver,
        fuel_log,
    })
}

async fn cancel_in_tx(
    conn: &mut PgConnection,
    phase: &mut PhaseTracker,
    trip_id: Uuid,
    actor: &str,
) -> DomainResult<DispatchOutcome> {
    let unlocked = read_trip(&mut *conn, trip_id).await?;

    phase.advance(ProtocolPhase::Locking);
    let (mut vehicle, mut driver, mut trip) = lock_trip_resources(&mut *conn, &unlocked).await?;

    phase.advance(ProtocolPhase::Guarding);
    transition(trip.status, TripStatus::Cancelled)?;
    // Un borrador nunca movió sus recursos: no se tocan
    let was_dispatched = trip.status == TripStatus::Dispatched;

    phase.advance(ProtocolPhase::Mutating);
    let ctx = TransitionContext::for_trip(actor, trip.id);
    let mut pending = PendingAudit::new();
    if was_dispatched && vehicle.status == VehicleStatus::OnTrip {
        pending.push(
            transition_service::transition_vehicle(
                &mut *conn,
                &mut vehicle,
                VehicleStatus::Available,
                None,
                &ctx,
            )
            .await?,
        );
    }
    if was_dispatched && driver.status == DriverStatus::OnTrip {
        pending.push(
            transition_service::transition_driver(&mut *conn, &mut driver, DriverStatus::OnDuty, &ctx)
                .await?,
        );
    }
    pending.push(
        transition_service::transition_trip(&mut *conn, &mut trip, TripStatus::Cancelled, &ctx)
            .await?,
    );

    phase.advance(ProtocolPhase::Auditing);
    audit_service::append_all(&mut *conn, pending).await?;

    Ok(DispatchOutcome {
        trip,
        vehicle,
        driver,
    })
}
