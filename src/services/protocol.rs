//! Fases de una operación transaccional
//!
//! `Validating -> Locking -> Guarding -> Mutating -> Auditing -> Committed`,
//! con `Aborted` alcanzable desde cualquier fase. `run_protocol` envuelve
//! `with_transaction` y registra en qué fase se abortó cada unidad.

use futures::future::BoxFuture;
use sqlx::{PgConnection, PgPool};
use tracing::{debug, info, warn};

use crate::database::{with_transaction, IsolationLevel};
use crate::utils::errors::{DomainError, DomainResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolPhase {
    Validating,
    Locking,
    Guarding,
    Mutating,
    Auditing,
    Committed,
    Aborted,
}

#[derive(Debug)]
pub struct PhaseTracker {
    operation: &'static str,
    phase: ProtocolPhase,
}

impl PhaseTracker {
    pub fn new(operation: &'static str) -> Self {
        Self {
            operation,
            phase: ProtocolPhase::Validating,
        }
    }

    pub fn phase(&self) -> ProtocolPhase {
        self.phase
    }

    pub fn advance(&mut self, next: ProtocolPhase) {
        debug!(operation = self.operation, from = ?self.phase, to = ?next, "Fase");
        self.phase = next;
    }

    pub fn abort(&mut self, err: &DomainError) {
        warn!(
            operation = self.operation,
            phase = ?self.phase,
            reason = err.reason(),
            "⛔ Operación abortada: {}",
            err
        );
        self.phase = ProtocolPhase::Aborted;
    }
}

/// Ejecuta una operación completa en una única transacción
pub async fn run_protocol<T, F>(
    pool: &PgPool,
    operation: &'static str,
    isolation: IsolationLevel,
    body: F,
) -> DomainResult<T>
where
    T: Send + 'static,
    F: for<'c> FnOnce(&'c mut PgConnection, &'c mut PhaseTracker) -> BoxFuture<'c, DomainResult<T>>
        + Send
        + 'static,
{
    let result = with_transaction(pool, isolation, move |conn| {
        Box::pin(async move {
            let mut tracker = PhaseTracker::new(operation);
            let result = body(conn, &mut tracker).await;
            if let Err(err) = &result {
                tracker.abort(err);
            }
            result
        })
    })
    .await;

    match &result {
        Ok(_) => info!(operation, phase = ?ProtocolPhase::Committed, "✅ Operación confirmada"),
        Err(err) => debug!(operation, reason = err.reason(), "Unidad revertida"),
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::errors::{ConflictKind, DomainError};

    #[test]
    fn tracker_starts_validating_and_ends_aborted() {
        let mut tracker = PhaseTracker::new("complete_trip");
        assert_eq!(tracker.phase(), ProtocolPhase::Validating);

        tracker.advance(ProtocolPhase::Locking);
        assert_eq!(tracker.phase(), ProtocolPhase::Locking);

        tracker.abort(&DomainError::conflict(ConflictKind::ResourceLocked, "held"));
        assert_eq!(tracker.phase(), ProtocolPhase::Aborted);
    }
}
