use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::{Driver, FuelLog, Trip, TripStatus, Vehicle};
use crate::services::{CompleteTripCommand, CompletionOutcome, CreateTripCommand, DispatchOutcome};

// Request para crear (y despachar) un viaje
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTripRequest {
    pub vehicle_id: Uuid,
    pub driver_id: Uuid,

    #[validate(range(min = 1))]
    pub cargo_weight_kg: i32,
}

impl From<CreateTripRequest> for CreateTripCommand {
    fn from(request: CreateTripRequest) -> Self {
        Self {
            vehicle_id: request.vehicle_id,
            driver_id: request.driver_id,
            cargo_weight_kg: request.cargo_weight_kg,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CompleteTripRequest {
    pub trip_id: Uuid,

    #[validate(range(min = 0))]
    pub final_odometer: i64,

    /// Litros repostados; junto con `fuel_cost` genera un registro de combustible
    pub liters: Option<Decimal>,
    pub fuel_cost: Option<Decimal>,
}

impl From<CompleteTripRequest> for CompleteTripCommand {
    fn from(request: CompleteTripRequest) -> Self {
        Self {
            trip_id: request.trip_id,
            final_odometer: request.final_odometer,
            liters: request.liters,
            fuel_cost: request.fuel_cost,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CancelTripRequest {
    pub trip_id: Uuid,
}

// Filtros de listado
#[derive(Debug, Deserialize)]
pub struct TripFilters {
    pub status: Option<TripStatus>,
}

/// `201 {trip, vehicle, driver}`
#[derive(Debug, Serialize)]
pub struct DispatchResponse {
    pub trip: Trip,
    pub vehicle: Vehicle,
    pub driver: Driver,
}

impl From<DispatchOutcome> for DispatchResponse {
    fn from(outcome: DispatchOutcome) -> Self {
        Self {
            trip: outcome.trip,
            vehicle: outcome.vehicle,
            driver: outcome.driver,
        }
    }
}

/// `GET /trips/{id}`
#[derive(Debug, Serialize)]
pub struct TripDetailResponse {
    #[serde(flatten)]
    pub trip: Trip,
    pub fuel_logs: Vec<FuelLog>,
}

#[derive(Debug, Serialize)]
pub struct CompletionResponse {
    pub trip: Trip,
    pub vehicle: Vehicle,
    pub driver: Driver,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fuel_log: Option<FuelLog>,
}

impl From<CompletionOutcome> for CompletionResponse {
    fn from(outcome: CompletionOutcome) -> Self {
        Self {
            trip: outcome.trip,
            vehicle: outcome.vehicle,
            driver: outcome.driver,
            fuel_log: outcome.fuel_log,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn zero_cargo_is_rejected() {
        let request: CreateTripRequest = serde_json::from_value(json!({
            "vehicle_id": Uuid::new_v4(),
            "driver_id": Uuid::new_v4(),
            "cargo_weight_kg": 0,
        }))
        .unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn fuel_fields_are_optional_decimals() {
        let request: CompleteTripRequest = serde_json::from_value(json!({
            "trip_id": Uuid::new_v4(),
            "final_odometer": 120_500,
            "liters": "42.5",
        }))
        .unwrap();
        assert!(request.validate().is_ok());
        assert_eq!(request.liters, Some(Decimal::new(425, 1)));
        assert!(request.fuel_cost.is_none());
    }

    #[test]
    fn negative_final_odometer_is_rejected() {
        let request: CompleteTripRequest = serde_json::from_value(json!({
            "trip_id": Uuid::new_v4(),
            "final_odometer": -1,
        }))
        .unwrap();
        assert!(request.validate().is_err());
    }
}
