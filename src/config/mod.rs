//! Configuración del proyecto
//!
//! Este módulo contiene la configuración de base de datos y las variables de
//! entorno del servicio de despacho.

pub mod database;
pub mod environment;

pub use database::DatabaseConfig;
pub use environment::EnvironmentConfig;

/// Lee un valor opcional y lo parsea, con error legible si es inválido
pub(crate) fn parse_var<T, F>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{} must be valid ({}): {}", key, raw, e)),
        None => Ok(default),
    }
}
