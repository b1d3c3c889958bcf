//! Aplicación de transiciones guardadas
//!
//! Únicas funciones que escriben `status` en vehicles, drivers y trips. Cada
//! una recibe la instantánea leída bajo bloqueo en la transacción en curso,
//! ejecuta la guarda, escribe el nuevo estado, actualiza la instantánea y
//! devuelve la entrada de auditoría que debe escribirse en la misma unidad.

use serde_json::json;
use sqlx::PgConnection;
use uuid::Uuid;

use crate::models::{AuditEntry, Driver, DriverStatus, Trip, TripStatus, Vehicle, VehicleStatus};
use crate::services::audit_service::transition_metadata;
use crate::services::state_machine::{manual_transition, transition, Lifecycle};
use crate::utils::errors::DomainResult;

/// Quién provoca la transición y, si aplica, el viaje que la motiva
#[derive(Debug, Clone, Copy)]
pub struct TransitionContext<'a> {
    pub actor: &'a str,
    pub trip_id: Option<Uuid>,
}

impl<'a> TransitionContext<'a> {
    pub fn new(actor: &'a str) -> Self {
        Self {
            actor,
            trip_id: None,
        }
    }

    pub fn for_trip(actor: &'a str, trip_id: Uuid) -> Self {
        Self {
            actor,
            trip_id: Some(trip_id),
        }
    }
}

fn audit_entry<S: Lifecycle>(
    id: Uuid,
    from: S,
    to: S,
    ctx: &TransitionContext<'_>,
    extra: serde_json::Value,
) -> AuditEntry {
    let mut extra = extra;
    if let (Some(trip_id), Some(map)) = (ctx.trip_id, extra.as_object_mut()) {
        map.entry("trip_id").or_insert(json!(trip_id));
    }
    AuditEntry::new(
        S::ENTITY,
        id,
        from.audit_action(to),
        ctx.actor,
        transition_metadata(from.name(), to.name(), extra),
    )
}

/// Vehicle: guarda + escritura. `odometer` se fija en el mismo UPDATE (cierre de viaje).
pub async fn transition_vehicle(
    conn: &mut PgConnection,
    vehicle: &mut Vehicle,
    target: VehicleStatus,
    odometer: Option<i64>,
    ctx: &TransitionContext<'_>,
) -> DomainResult<AuditEntry> {
    let from = vehicle.status;
    transition(from, target)?;
    write_vehicle(conn, vehicle, from, target, odometer, ctx).await
}

/// Vehicle fuera del protocolo de despacho: `on_trip` queda reservado
pub async fn manual_vehicle_transition(
    conn: &mut PgConnection,
    vehicle: &mut Vehicle,
    target: VehicleStatus,
    ctx: &TransitionContext<'_>,
) -> DomainResult<AuditEntry> {
    let from = vehicle.status;
    manual_transition(from, target, VehicleStatus::OnTrip)?;
    write_vehicle(conn, vehicle, from, target, None, ctx).await
}

async fn write_vehicle(
    conn: &mut PgConnection,
    vehicle: &mut Vehicle,
    from: VehicleStatus,
    target: VehicleStatus,
    odometer: Option<i64>,
    ctx: &TransitionContext<'_>,
) -> DomainResult<AuditEntry> {
    let updated = sqlx::query_as::<_, Vehicle>(
        r#"
        UPDATE vehicles
        SET status = $2, odometer = COALESCE($3, odometer), updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(vehicle.id)
    .bind(target)
    .bind(odometer)
    .fetch_one(&mut *conn)
    .await?;

    let extra = match odometer {
        Some(km) => json!({ "odometer_before": vehicle.odometer, "odometer": km }),
        None => json!({}),
    };
    *vehicle = updated;
    Ok(audit_entry(vehicle.id, from, target, ctx, extra))
}

pub async fn transition_driver(
    conn: &mut PgConnection,
    driver: &mut Driver,
    target: DriverStatus,
    ctx: &TransitionContext<'_>,
) -> DomainResult<AuditEntry> {
    let from = driver.status;
    transition(from, target)?;
    write_driver(conn, driver, from, target, ctx).await
}

/// Driver fuera del protocolo de despacho: `on_trip` queda reservado
pub async fn manual_driver_transition(
    conn: &mut PgConnection,
    driver: &mut Driver,
    target: DriverStatus,
    ctx: &TransitionContext<'_>,
) -> DomainResult<AuditEntry> {
    let from = driver.status;
    manual_transition(from, target, DriverStatus::OnTrip)?;
    write_driver(conn, driver, from, target, ctx).await
}

async fn write_driver(
    conn: &mut PgConnection,
    driver: &mut Driver,
    from: DriverStatus,
    target: DriverStatus,
    ctx: &TransitionContext<'_>,
) -> DomainResult<AuditEntry> {
    let updated = sqlx::query_as::<_, Driver>(
        "UPDATE drivers SET status = $2, updated_at = now() WHERE id = $1 RETURNING *",
    )
    .bind(driver.id)
    .bind(target)
    .fetch_one(&mut *conn)
    .await?;

    *driver = updated;
    Ok(audit_entry(driver.id, from, target, ctx, json!({})))
}

/// Trip: además del estado fija la marca de tiempo correspondiente
pub async fn transition_trip(
    conn: &mut PgConnection,
    trip: &mut Trip,
    target: TripStatus,
    ctx: &TransitionContext<'_>,
) -> DomainResult<AuditEntry> {
    let from = trip.status;
    transition(from, target)?;

    let updated = sqlx::query_as::<_, Trip>(
        r#"
        UPDATE trips
        SET status = $2,
            dispatched_at = CASE WHEN $2 = 'dispatched'::trip_status THEN now() ELSE dispatched_at END,
            completed_at  = CASE WHEN $2 = 'completed'::trip_status  THEN now() ELSE completed_at END,
            cancelled_at  = CASE WHEN $2 = 'cancelled'::trip_status  THEN now() ELSE cancelled_at END,
            updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(trip.id)
    .bind(target)
    .fetch_one(&mut *conn)
    .await?;

    *trip = updated;
    let extra = json!({
        "vehicle_id": trip.vehicle_id,
        "driver_id": trip.driver_id,
        "end_odometer": trip.end_odometer,
    });
    Ok(audit_entry(trip.id, from, target, ctx, extra))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EntityKind;

    #[test]
    fn audit_entry_carries_trip_context_and_specialised_action() {
        let trip_id = Uuid::new_v4();
        let vehicle_id = Uuid::new_v4();
        let ctx = TransitionContext::for_trip("dispatcher-7", trip_id);

        let entry = audit_entry(
            vehicle_id,
            VehicleStatus::Available,
            VehicleStatus::OnTrip,
            &ctx,
            json!({}),
        );
        assert_eq!(entry.entity_type, EntityKind::Vehicle);
        assert_eq!(entry.entity_id, vehicle_id);
        assert_eq!(entry.action, "vehicle_dispatched");
        assert_eq!(entry.actor, "dispatcher-7");
        assert_eq!(entry.metadata["from"], "available");
        assert_eq!(entry.metadata["to"], "on_trip");
        assert_eq!(entry.metadata["trip_id"], json!(trip_id));
    }

    #[test]
    fn audit_entry_without_trip_has_no_trip_id() {
        let ctx = TransitionContext::new("ops");
        let entry = audit_entry(
            Uuid::new_v4(),
            DriverStatus::OnDuty,
            DriverStatus::OffDuty,
            &ctx,
            json!({}),
        );
        assert_eq!(entry.action, "entity_state_changed");
        assert!(entry.metadata.get("trip_id").is_none());
    }
}
