//! Repositorios
//!
//! Acceso SQL a cada tabla. Todas las funciones reciben el ejecutor de forma
//! explícita (`&PgPool` o `&mut PgConnection` dentro de una transacción).
//! Ninguna escribe columnas `status`: eso lo hace `transition_service`.

pub mod audit_repository;
pub mod driver_repository;
pub mod fuel_log_repository;
pub mod trip_repository;
pub mod vehicle_repository;
