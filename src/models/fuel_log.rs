use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Carga de combustible registrada al completar un viaje
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FuelLog {
    pub id: Uuid,
    pub trip_id: Uuid,
    pub vehicle_id: Uuid,
    pub liters: Decimal,
    pub fuel_cost: Option<Decimal>,
    pub odometer: i64,
    pub created_at: DateTime<Utc>,
}
