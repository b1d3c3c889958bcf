//! Tareas posteriores al commit
//!
//! Se lanzan una vez conocido el resultado de la transacción, como mucho un
//! intento cada una, y sus fallos sólo se registran. Nunca cambian el
//! resultado que ya recibió el llamador.

use serde_json::json;
use sqlx::PgPool;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::{AuditEntry, EntityKind};
use crate::repositories::vehicle_repository;
use crate::services::audit_service;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostCommitTask {
    /// Aviso si el vehículo alcanzó (o está cerca de) su revisión
    ServiceDueCheck { vehicle_id: Uuid },
}

#[derive(Clone)]
pub struct PostCommitRunner {
    pool: PgPool,
    service_due_margin_km: i64,
}

impl PostCommitRunner {
    pub fn new(pool: PgPool, service_due_margin_km: i64) -> Self {
        Self {
            pool,
            service_due_margin_km,
        }
    }

    /// Lanza las tareas sin esperar su resultado
    pub fn spawn(&self, tasks: Vec<PostCommitTask>) {
        for task in tasks {
            let runner = self.clone();
            tokio::spawn(async move {
                if let Err(e) = runner.run(&task).await {
                    warn!(?task, "⚠️ Tarea post-commit falló: {:#}", e);
                }
            });
        }
    }

    pub async fn run(&self, task: &PostCommitTask) -> anyhow::Result<()> {
        match task {
            PostCommitTask::ServiceDueCheck { vehicle_id } => {
                self.check_service_due(*vehicle_id).await
            }
        }
    }

    async fn check_service_due(&self, vehicle_id: Uuid) -> anyhow::Result<()> {
        let Some(vehicle) = vehicle_repository::find_by_id(&self.pool, vehicle_id).await? else {
            return Ok(());
        };

        if !service_due(vehicle.odometer, vehicle.service_due_km, self.service_due_margin_km) {
            debug!(vehicle = %vehicle.registration, "Revisión no pendiente");
            return Ok(());
        }

        warn!(
            vehicle = %vehicle.registration,
            odometer = vehicle.odometer,
            service_due_km = vehicle.service_due_km,
            "🔧 Vehículo con revisión pendiente"
        );
        audit_service::append_best_effort(
            &self.pool,
            AuditEntry::new(
                EntityKind::Vehicle,
                vehicle.id,
                "service_due_alert",
                "system",
                json!({
                    "odometer": vehicle.odometer,
                    "service_due_km": vehicle.service_due_km,
                }),
            ),
        )
        .await;
        Ok(())
    }
}

/// ¿Está el odómetro dentro del margen (o por encima) del umbral de revisión?
pub fn service_due(odometer: i64, service_due_km: i64, margin_km: i64) -> bool {
    odometer >= service_due_km.saturating_sub(margin_km.max(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_due_thresholds() {
        assert!(!service_due(40_000, 45_000, 500));
        assert!(service_due(44_500, 45_000, 500));
        assert!(service_due(46_000, 45_000, 500));
        assert!(service_due(45_000, 45_000, 0));
        assert!(!service_due(44_999, 45_000, 0));
    }

    #[test]
    fn negative_margin_is_treated_as_zero() {
        assert!(!service_due(44_999, 45_000, -100));
    }
}
