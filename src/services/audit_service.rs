//! Escritor de auditoría
//!
//! `append` escribe dentro de la transacción en curso: si falla, la unidad
//! completa se revierte. `append_best_effort` es para trabajo posterior al
//! commit y nunca propaga el error.

use serde_json::{json, Map, Value};
use sqlx::{PgConnection, PgPool};
use tracing::{debug, warn};

use crate::models::AuditEntry;
use crate::repositories::audit_repository;
use crate::utils::errors::DomainResult;

/// Entradas de auditoría producidas por transiciones y aún no escritas
#[must_use = "las entradas de auditoría deben escribirse en la misma transacción"]
#[derive(Debug, Default)]
pub struct PendingAudit {
    entries: Vec<AuditEntry>,
}

impl PendingAudit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: AuditEntry) {
        self.entries.push(entry);
    }
}

impl From<AuditEntry> for PendingAudit {
    fn from(entry: AuditEntry) -> Self {
        Self {
            entries: vec![entry],
        }
    }
}

/// Escribe una entrada dentro de la transacción
pub async fn append(conn: &mut PgConnection, entry: &AuditEntry) -> DomainResult<()> {
    audit_repository::insert(&mut *conn, entry).await?;
    debug!(
        entity = %entry.entity_type,
        id = %entry.entity_id,
        action = %entry.action,
        "📝 Auditoría registrada"
    );
    Ok(())
}

/// Escribe todas las entradas pendientes, en orden
pub async fn append_all(conn: &mut PgConnection, pending: PendingAudit) -> DomainResult<usize> {
    let count = pending.entries.len();
    for entry in &pending.entries {
        append(&mut *conn, entry).await?;
    }
    Ok(count)
}

/// Escritura tolerante a fallos para tareas posteriores al commit
pub async fn append_best_effort(pool: &PgPool, entry: AuditEntry) {
    if let Err(e) = audit_repository::insert(pool, &entry).await {
        warn!(
            entity = %entry.entity_type,
            id = %entry.entity_id,
            action = %entry.action,
            "⚠️ No se pudo escribir la auditoría post-commit: {}",
            e
        );
    }
}

/// Metadatos `{from, to}` más el contexto adicional (si es un objeto)
pub fn transition_metadata(from: &str, to: &str, extra: Value) -> Value {
    let mut map = Map::new();
    map.insert("from".to_string(), json!(from));
    map.insert("to".to_string(), json!(to));
    if let Value::Object(extra) = extra {
        for (key, value) in extra {
            if !value.is_null() {
                map.insert(key, value);
            }
        }
    }
    Value::Object(map)
}
