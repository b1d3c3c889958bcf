//! Módulo de base de datos
//!
//! Pool de PostgreSQL, coordinador de transacciones, bloqueos de fila y
//! clasificación de conflictos.

pub mod conflict;
pub mod connection;
pub mod locks;
pub mod transaction;

pub use connection::DatabaseConnection;
pub use locks::{LockSet, LockTarget, LockedRows};
pub use transaction::{with_transaction, IsolationLevel};
