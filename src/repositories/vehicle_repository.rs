use sqlx::{PgConnection, PgExecutor};
use uuid::Uuid;

use crate::models::{NewVehicle, Vehicle};

pub async fn insert(conn: &mut PgConnection, new: &NewVehicle) -> Result<Vehicle, sqlx::Error> {
    sqlx::query_as::<_, Vehicle>(
        r#"
        INSERT INTO vehicles (id, registration, model, vehicle_class, status, odometer, service_due_km, max_load_kg)
        VALUES ($1, $2, $3, $4, 'available', $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&new.registration)
    .bind(&new.model)
    .bind(&new.vehicle_class)
    .bind(new.odometer)
    .bind(new.service_due_km)
    .bind(new.max_load_kg)
    .fetch_one(conn)
    .await
}

/// Busca un vehículo no eliminado
pub async fn find_by_id<'e, E>(executor: E, id: Uuid) -> Result<Option<Vehicle>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, Vehicle>("SELECT * FROM vehicles WHERE id = $1 AND deleted_at IS NULL")
        .bind(id)
        .fetch_optional(executor)
        .await
}

pub async fn list<'e, E>(executor: E) -> Result<Vec<Vehicle>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, Vehicle>(
        "SELECT * FROM vehicles WHERE deleted_at IS NULL ORDER BY created_at DESC",
    )
    .fetch_all(executor)
    .await
}

/// `FOR UPDATE NOWAIT`: falla con 55P03 si otra transacción tiene la fila
pub async fn lock_nowait(conn: &mut PgConnection, id: Uuid) -> Result<Option<Vehicle>, sqlx::Error> {
    sqlx::query_as::<_, Vehicle>(
        "SELECT * FROM vehicles WHERE id = $1 AND deleted_at IS NULL FOR UPDATE NOWAIT",
    )
    .bind(id)
    .fetch_optional(conn)
    .await
}

/// Marca de borrado lógico; los vehículos nunca se borran físicamente
pub async fn soft_delete(conn: &mut PgConnection, id: Uuid) -> Result<Vehicle, sqlx::Error> {
    sqlx::query_as::<_, Vehicle>(
        r#"
        UPDATE vehicles
        SET deleted_at = now(), updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .fetch_one(conn)
    .await
}
