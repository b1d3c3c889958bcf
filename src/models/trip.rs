//! Modelo de Trip
//!
//! Un viaje une exactamente un vehículo y un conductor. Mientras está en
//! `draft` o `dispatched` reserva ambos recursos (índices únicos parciales
//! `uq_trips_active_vehicle` y `uq_trips_active_driver`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

/// Estado del viaje - mapea al ENUM trip_status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq, Hash)]
#[sqlx(type_name = "trip_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TripStatus {
    Draft,
    Dispatched,
    Completed,
    Cancelled,
}

impl TripStatus {
    pub const ALL: [TripStatus; 4] = [
        TripStatus::Draft,
        TripStatus::Dispatched,
        TripStatus::Completed,
        TripStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TripStatus::Draft => "draft",
            TripStatus::Dispatched => "dispatched",
            TripStatus::Completed => "completed",
            TripStatus::Cancelled => "cancelled",
        }
    }

    /// Estados que cuentan para la restricción de viaje activo
    pub fn is_active(&self) -> bool {
        matches!(self, TripStatus::Draft | TripStatus::Dispatched)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Trip {
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub driver_id: Uuid,
    pub status: TripStatus,
    pub cargo_weight_kg: i32,
    pub start_odometer: i64,
    pub end_odometer: Option<i64>,
    pub created_by: String,
    pub dispatched_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
