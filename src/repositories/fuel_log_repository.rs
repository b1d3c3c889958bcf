use rust_decimal::Decimal;
use sqlx::{PgConnection, PgExecutor};
use uuid::Uuid;

use crate::models::FuelLog;

pub async fn insert(
    conn: &mut PgConnection,
    trip_id: Uuid,
    vehicle_id: Uuid,
    liters: Decimal,
    fuel_cost: Option<Decimal>,
    odometer: i64,
) -> Result<FuelLog, sqlx::Error> {
    sqlx::query_as::<_, FuelLog>(
        r#"
        INSERT INTO fuel_logs (id, trip_id, vehicle_id, liters, fuel_cost, odometer)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(trip_id)
    .bind(vehicle_id)
    .bind(liters)
    .bind(fuel_cost)
    .bind(odometer)
    .fetch_one(conn)
    .await
}

pub async fn find_by_trip<'e, E>(executor: E, trip_id: Uuid) -> Result<Vec<FuelLog>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, FuelLog>("SELECT * FROM fuel_logs WHERE trip_id = $1 ORDER BY created_at")
        .bind(trip_id)
        .fetch_all(executor)
        .await
}
