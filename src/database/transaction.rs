//! Coordinador de transacciones
//!
//! `with_transaction` abre una transacción con el nivel de aislamiento pedido,
//! ejecuta el cuerpo con el manejador explícito (`&mut PgConnection`), hace
//! commit si el cuerpo devuelve `Ok` y rollback en cualquier otro caso. La
//! conexión vuelve al pool en todas las salidas; los bloqueos de fila se
//! liberan con el commit o el rollback.

use futures::future::BoxFuture;
use sqlx::{PgConnection, PgPool};
use tracing::{debug, warn};

use crate::utils::errors::DomainResult;

/// Nivel de aislamiento de la transacción
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IsolationLevel {
    #[default]
    ReadCommitted,
    Serializable,
}

impl IsolationLevel {
    pub fn set_statement(&self) -> &'static str {
        match self {
            IsolationLevel::ReadCommitted => "SET TRANSACTION ISOLATION LEVEL READ COMMITTED",
            IsolationLevel::Serializable => "SET TRANSACTION ISOLATION LEVEL SERIALIZABLE",
        }
    }
}

/// Ejecuta `body` dentro de una transacción.
///
/// Los errores de `begin`, del propio cuerpo y del `commit` salen ya
/// clasificados como `DomainError` (un fallo de serialización en el commit se
/// convierte en `CONCURRENT_MODIFICATION`).
pub async fn with_transaction<T, F>(
    pool: &PgPool,
    isolation: IsolationLevel,
    body: F,
) -> DomainResult<T>
where
    T: Send,
    F: for<'c> FnOnce(&'c mut PgConnection) -> BoxFuture<'c, DomainResult<T>> + Send,
{
    let mut tx = pool.begin().await?;
    sqlx::query(isolation.set_statement())
        .execute(&mut *tx)
        .await?;

    match body(&mut *tx).await {
        Ok(value) => {
            tx.commit().await?;
            debug!(?isolation, "Transacción confirmada");
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                // El drop de la conexión también descarta la transacción
                warn!("⚠️ Rollback falló: {}", rollback_err);
            }
            debug!(?isolation, reason = err.reason(), "Transacción revertida");
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_isolation_is_read_committed() {
        assert_eq!(IsolationLevel::default(), IsolationLevel::ReadCommitted);
        assert!(IsolationLevel::Serializable
            .set_statement()
            .ends_with("SERIALIZABLE"));
    }
}
