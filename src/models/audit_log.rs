//! Modelo de AuditLog
//!
//! Registro inmutable: la tabla rechaza UPDATE y DELETE mediante trigger.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::EntityKind;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AuditLog {
    pub id: Uuid,
    pub entity_type: String,
    pub entity_id: Uuid,
    pub action: String,
    pub actor: String,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// Entrada pendiente de escribir
#[derive(Debug, Clone)]
pub struct AuditEntry {
    pub entity_type: EntityKind,
    pub entity_id: Uuid,
    pub action: String,
    pub actor: String,
    pub metadata: serde_json::Value,
}

impl AuditEntry {
    pub fn new(
        entity_type: EntityKind,
        entity_id: Uuid,
        action: impl Into<String>,
        actor: impl Into<String>,
        metadata: serde_json::Value,
    ) -> Self {
        Self {
            entity_type,
            entity_id,
            action: action.into(),
            actor: actor.into(),
            metadata,
        }
    }
}
