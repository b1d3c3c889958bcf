//! Controllers
//!
//! Capa fina entre los handlers HTTP y los servicios: valida el cuerpo,
//! construye el comando y traduce el error del núcleo a `AppError`.

pub mod audit_controller;
pub mod driver_controller;
pub mod trip_controller;
pub mod vehicle_controller;
