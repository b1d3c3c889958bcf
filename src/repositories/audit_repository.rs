use sqlx::PgExecutor;
use uuid::Uuid;

use crate::models::{AuditEntry, AuditLog};

pub async fn insert<'e, E>(executor: E, entry: &AuditEntry) -> Result<AuditLog, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, AuditLog>(
        r#"
        INSERT INTO audit_logs (id, entity_type, entity_id, action, actor, metadata)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(entry.entity_type.as_str())
    .bind(entry.entity_id)
    .bind(&entry.action)
    .bind(&entry.actor)
    .bind(&entry.metadata)
    .fetch_one(executor)
    .await
}

/// Historial de una entidad, o de todas si no se filtra
pub async fn list<'e, E>(
    executor: E,
    entity_type: Option<&str>,
    entity_id: Option<Uuid>,
    limit: i64,
) -> Result<Vec<AuditLog>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, AuditLog>(
        r#"
        SELECT * FROM audit_logs
        WHERE ($1::text IS NULL OR entity_type = $1)
          AND ($2::uuid IS NULL OR entity_id = $2)
        ORDER BY created_at, id
        LIMIT $3
        "#,
    )
    .bind(entity_type)
    .bind(entity_id)
    .bind(limit)
    .fetch_all(executor)
    .await
}
