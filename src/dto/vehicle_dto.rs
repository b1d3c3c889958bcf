use serde::Deserialize;
use validator::Validate;

use crate::models::{NewVehicle, VehicleStatus};

// Request para registrar un vehículo
#[derive(Debug, Deserialize, Validate)]
pub struct CreateVehicleRequest {
    #[validate(length(min = 2, max = 20))]
    pub registration: String,

    #[validate(length(min = 1, max = 100))]
    pub model: Option<String>,

    #[validate(length(min = 1, max = 50))]
    pub vehicle_class: Option<String>,

    #[validate(range(min = 0))]
    pub odometer: Option<i64>,

    #[validate(range(min = 1))]
    pub service_due_km: i64,

    #[validate(range(min = 1))]
    pub max_load_kg: i32,
}

impl From<CreateVehicleRequest> for NewVehicle {
    fn from(request: CreateVehicleRequest) -> Self {
        Self {
            registration: request.registration.trim().to_uppercase(),
            model: request.model,
            vehicle_class: request.vehicle_class,
            odometer: request.odometer.unwrap_or(0),
            service_due_km: request.service_due_km,
            max_load_kg: request.max_load_kg,
        }
    }
}

// Cambio manual de estado (available <-> in_shop)
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateVehicleStatusRequest {
    pub status: VehicleStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn registration_is_normalised_and_odometer_defaults_to_zero() {
        let request: CreateVehicleRequest = serde_json::from_value(json!({
            "registration": " ab-123-cd ",
            "service_due_km": 30000,
            "max_load_kg": 1000,
        }))
        .unwrap();
        assert!(request.validate().is_ok());

        let new = NewVehicle::from(request);
        assert_eq!(new.registration, "AB-123-CD");
        assert_eq!(new.odometer, 0);
    }

    #[test]
    fn unknown_status_does_not_deserialize() {
        let result: Result<UpdateVehicleStatusRequest, _> =
            serde_json::from_value(json!({ "status": "parked" }));
        assert!(result.is_err());
    }
}
