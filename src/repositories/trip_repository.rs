use sqlx::{PgConnection, PgExecutor};
use uuid::Uuid;

use crate::models::{Trip, TripStatus};

/// Inserta un viaje en `draft`. Si el vehículo o el conductor ya tienen un
/// viaje activo, PostgreSQL responde 23505 sobre `uq_trips_active_*`.
pub async fn insert_draft(
    conn: &mut PgConnection,
    vehicle_id: Uuid,
    driver_id: Uuid,
    cargo_weight_kg: i32,
    start_odometer: i64,
    created_by: &str,
) -> Result<Trip, sqlx::Error> {
    sqlx::query_as::<_, Trip>(
        r#"
        INSERT INTO trips (id, vehicle_id, driver_id, status, cargo_weight_kg, start_odometer, created_by)
        VALUES ($1, $2, $3, 'draft', $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(vehicle_id)
    .bind(driver_id)
    .bind(cargo_weight_kg)
    .bind(start_odometer)
    .bind(created_by)
    .fetch_one(conn)
    .await
}

pub async fn find_by_id<'e, E>(executor: E, id: Uuid) -> Result<Option<Trip>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, Trip>("SELECT * FROM trips WHERE id = $1")
        .bind(id)
        .fetch_optional(executor)
        .await
}

pub async fn list<'e, E>(executor: E, status: Option<TripStatus>) -> Result<Vec<Trip>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, Trip>(
        r#"
        SELECT * FROM trips
        WHERE ($1::trip_status IS NULL OR status = $1)
        ORDER BY created_at DESC
        "#,
    )
    .bind(status)
    .fetch_all(executor)
    .await
}

/// Viaje activo (`draft` o `dispatched`) que reserva el vehículo, si existe
pub async fn find_active_by_vehicle(
    conn: &mut PgConnection,
    vehicle_id: Uuid,
) -> Result<Option<Trip>, sqlx::Error> {
    sqlx::query_as::<_, Trip>(
        "SELECT * FROM trips WHERE vehicle_id = $1 AND status IN ('draft', 'dispatched')",
    )
    .bind(vehicle_id)
    .fetch_optional(conn)
    .await
}

pub async fn lock_nowait(conn: &mut PgConnection, id: Uuid) -> Result<Option<Trip>, sqlx::Error> {
    sqlx::query_as::<_, Trip>("SELECT * FROM trips WHERE id = $1 FOR UPDATE NOWAIT")
        .bind(id)
        .fetch_optional(conn)
        .await
}

pub async fn set_start_odometer(
    conn: &mut PgConnection,
    id: Uuid,
    start_odometer: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE trips SET start_odometer = $2, updated_at = now() WHERE id = $1")
        .bind(id)
        .bind(start_odometer)
        .execute(conn)
        .await?;
    Ok(())
}

pub async fn set_end_odometer(
    conn: &mut PgConnection,
    id: Uuid,
    end_odometer: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE trips SET end_odometer = $2, updated_at = now() WHERE id = $1")
        .bind(id)
        .bind(end_odometer)
        .execute(conn)
        .await?;
    Ok(())
}
