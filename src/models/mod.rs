//! Modelos del dominio de flota
//!
//! Este módulo contiene las filas persistidas (vehículos, conductores, viajes,
//! combustible y auditoría) y los enums de estado que las acompañan.

pub mod audit_log;
pub mod driver;
pub mod fuel_log;
pub mod trip;
pub mod vehicle;

pub use audit_log::*;
pub use driver::*;
pub use fuel_log::*;
pub use trip::*;
pub use vehicle::*;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Tipo de entidad con ciclo de vida propio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Vehicle,
    Driver,
    Trip,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Vehicle => "vehicle",
            EntityKind::Driver => "driver",
            EntityKind::Trip => "trip",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
