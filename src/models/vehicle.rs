//! Modelo de Vehicle
//!
//! Mapea la tabla `vehicles`. El campo `status` sólo se escribe a través de
//! las transiciones guardadas de `services::transition_service`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

/// Estado del vehículo - mapea al ENUM vehicle_status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq, Hash)]
#[sqlx(type_name = "vehicle_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum VehicleStatus {
    Available,
    OnTrip,
    InShop,
    Retired,
}

impl VehicleStatus {
    pub const ALL: [VehicleStatus; 4] = [
        VehicleStatus::Available,
        VehicleStatus::OnTrip,
        VehicleStatus::InShop,
        VehicleStatus::Retired,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleStatus::Available => "available",
            VehicleStatus::OnTrip => "on_trip",
            VehicleStatus::InShop => "in_shop",
            VehicleStatus::Retired => "retired",
        }
    }
}

/// Vehicle principal - mapea exactamente a la tabla vehicles
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Vehicle {
    pub id: Uuid,
    pub registration: String,
    pub model: Option<String>,
    pub vehicle_class: Option<String>,
    pub status: VehicleStatus,
    pub odometer: i64,
    pub service_due_km: i64,
    pub max_load_kg: i32,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Vehicle {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Datos para dar de alta un vehículo
#[derive(Debug, Clone)]
pub struct NewVehicle {
    pub registration: String,
    pub model: Option<String>,
    pub vehicle_class: Option<String>,
    pub odometer: i64,
    pub service_due_km: i64,
    pub max_load_kg: i32,
}
