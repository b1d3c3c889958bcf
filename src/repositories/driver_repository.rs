use sqlx::{PgConnection, PgExecutor};
use uuid::Uuid;

use crate::models::{Driver, NewDriver};

pub async fn insert(conn: &mut PgConnection, new: &NewDriver) -> Result<Driver, sqlx::Error> {
    sqlx::query_as::<_, Driver>(
        r#"
        INSERT INTO drivers (id, full_name, status, license_expiry, license_category, safety_score)
        VALUES ($1, $2, 'off_duty', $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&new.full_name)
    .bind(new.license_expiry)
    .bind(&new.license_category)
    .bind(new.safety_score)
    .fetch_one(conn)
    .await
}

pub async fn find_by_id<'e, E>(executor: E, id: Uuid) -> Result<Option<Driver>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, Driver>("SELECT * FROM drivers WHERE id = $1")
        .bind(id)
        .fetch_optional(executor)
        .await
}

pub async fn list<'e, E>(executor: E) -> Result<Vec<Driver>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, Driver>("SELECT * FROM drivers ORDER BY full_name")
        .fetch_all(executor)
        .await
}

pub async fn lock_nowait(conn: &mut PgConnection, id: Uuid) -> Result<Option<Driver>, sqlx::Error> {
    sqlx::query_as::<_, Driver>("SELECT * FROM drivers WHERE id = $1 FOR UPDATE NOWAIT")
        .bind(id)
        .fetch_optional(conn)
        .await
}
