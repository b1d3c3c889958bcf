//! Middleware del sistema
//!
//! Extractores (actor de auditoría, cuerpo JSON) y configuración de CORS.

pub mod actor;
pub mod cors;
pub mod json;

pub use actor::Actor;
pub use cors::cors_middleware;
pub use json::AppJson;
