//! Precondiciones del despacho
//!
//! Comprobaciones puras sobre las instantáneas bloqueadas. Se ejecutan antes
//! de la guarda de la máquina de estados para que cada rechazo tenga su
//! propio motivo (p. ej. `DRIVER_SUSPENDED` frente a `DRIVER_NOT_ON_DUTY`).

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::models::{Driver, DriverStatus, Vehicle, VehicleStatus};
use crate::utils::errors::{ConflictKind, DomainError, DomainResult, PreconditionReason};

/// El vehículo debe estar `available`; si ya está `on_trip` pertenece a otro viaje activo
pub fn check_vehicle_for_dispatch(vehicle: &Vehicle) -> DomainResult<()> {
    match vehicle.status {
        VehicleStatus::Available => Ok(()),
        VehicleStatus::OnTrip => Err(DomainError::conflict(
            ConflictKind::DoubleDispatchPrevented,
            format!("vehicle {} is already on an active trip", vehicle.registration),
        )),
        other => Err(DomainError::precondition(
            PreconditionReason::VehicleNotAvailable,
            format!(
                "vehicle {} is {}, expected available",
                vehicle.registration,
                other.as_str()
            ),
        )),
    }
}

/// El conductor debe estar `on_duty`; suspendido y fuera de turno son motivos distintos
pub fn check_driver_for_dispatch(driver: &Driver) -> DomainResult<()> {
    match driver.status {
        DriverStatus::OnDuty => Ok(()),
        DriverStatus::OnTrip => Err(DomainError::conflict(
            ConflictKind::DoubleDispatchPrevented,
            format!("driver {} is already on an active trip", driver.full_name),
        )),
        DriverStatus::Suspended => Err(DomainError::precondition(
            PreconditionReason::DriverSuspended,
            format!("driver {} is suspended", driver.full_name),
        )),
        DriverStatus::OffDuty => Err(DomainError::precondition(
            PreconditionReason::DriverNotOnDuty,
            format!("driver {} is off duty", driver.full_name),
        )),
    }
}

/// Licencia, categoría y capacidad: no dependen del estado de los recursos
pub fn check_assignment(
    vehicle: &Vehicle,
    driver: &Driver,
    cargo_weight_kg: i32,
    today: NaiveDate,
) -> DomainResult<()> {
    if !driver.license_valid_on(today) {
        return Err(DomainError::precondition(
            PreconditionReason::LicenseExpired,
            format!(
                "license of driver {} expired on {}",
                driver.full_name, driver.license_expiry
            ),
        ));
    }

    if let (Some(category), Some(class)) = (&driver.license_category, &vehicle.vehicle_class) {
        if !category.trim().eq_ignore_ascii_case(class.trim()) {
            return Err(DomainError::precondition(
                PreconditionReason::LicenseCategoryMismatch,
                format!(
                    "license category {} does not cover vehicle class {}",
                    category, class
                ),
            ));
        }
    }

    if cargo_weight_kg > vehicle.max_load_kg {
        return Err(DomainError::precondition(
            PreconditionReason::CargoExceedsCapacity,
            format!(
                "cargo {} kg exceeds max load {} kg of vehicle {}",
                cargo_weight_kg, vehicle.max_load_kg, vehicle.registration
            ),
        ));
    }

    Ok(())
}

/// Todas las precondiciones de un despacho, en el orden en que se informan
pub fn check_dispatch(
    vehicle: &Vehicle,
    driver: &Driver,
    cargo_weight_kg: i32,
    today: NaiveDate,
) -> DomainResult<()> {
    check_vehicle_for_dispatch(vehicle)?;
    check_driver_for_dispatch(driver)?;
    check_assignment(vehicle, driver, cargo_weight_kg, today)
}

/// Un borrador reserva recursos que todavía podrían despacharse
pub fn check_draft(
    vehicle: &Vehicle,
    driver: &Driver,
    cargo_weight_kg: i32,
    today: NaiveDate,
) -> DomainResult<()> {
    if vehicle.status == VehicleStatus::Retired {
        return Err(DomainError::precondition(
            PreconditionReason::VehicleNotAvailable,
            format!("vehicle {} is retired", vehicle.registration),
        ));
    }
    if driver.status == DriverStatus::Suspended {
        return Err(DomainError::precondition(
            PreconditionReason::DriverSuspended,
            format!("driver {} is suspended", driver.full_name),
        ));
    }
    check_assignment(vehicle, driver, cargo_weight_kg, today)
}

/// Odómetro final estrictamente mayor que el inicial y nunca por debajo del vehículo
pub fn check_final_odometer(
    start_odometer: i64,
    vehicle_odometer: i64,
    final_odometer: i64,
) -> DomainResult<()> {
    if final_odometer <= start_odometer {
        return Err(DomainError::precondition(
            PreconditionReason::OdometerRegression,
            format!(
                "final odometer {} must be greater than start odometer {}",
                final_odometer, start_odometer
            ),
        ));
    }
    if final_odometer < vehicle_odometer {
        return Err(DomainError::precondition(
            PreconditionReason::OdometerRegression,
            format!(
                "final odometer {} is below the vehicle odometer {}",
                final_odometer, vehicle_odometer
            ),
        ));
    }
    Ok(())
}

/// Carga de combustible validada, si la hay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FuelEntry {
    pub liters: Decimal,
    pub fuel_cost: Option<Decimal>,
}

pub fn check_fuel(
    liters: Option<Decimal>,
    fuel_cost: Option<Decimal>,
) -> DomainResult<Option<FuelEntry>> {
    let liters = match (liters, fuel_cost) {
        (None, None) => return Ok(None),
        (None, Some(_)) => {
            return Err(DomainError::precondition(
                PreconditionReason::InvalidFuelLog,
                "fuel_cost requires liters",
            ))
        }
        (Some(liters), _) => liters,
    };

    if liters <= Decimal::ZERO {
        return Err(DomainError::precondition(
            PreconditionReason::InvalidFuelLog,
            format!("liters must be positive, got {}", liters),
        ));
    }
    if let Some(cost) = fuel_cost {
        if cost < Decimal::ZERO {
            return Err(DomainError::precondition(
                PreconditionReason::InvalidFuelLog,
                format!("fuel_cost cannot be negative, got {}", cost),
            ));
        }
    }

    Ok(Some(FuelEntry { liters, fuel_cost }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
    }

    fn vehicle(status: VehicleStatus) -> Vehicle {
        Vehicle {
            id: Uuid::new_v4(),
            registration: "AB-123-CD".to_string(),
            model: Some("Daily 35".to_string()),
            vehicle_class: Some("C1".to_string()),
            status,
            odometer: 42_000,
            service_due_km: 45_000,
            max_load_kg: 1000,
            deleted_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn driver(status: DriverStatus) -> Driver {
        Driver {
            id: Uuid::new_v4(),
            full_name: "Lucía Romero".to_string(),
            status,
            license_expiry: today() + Duration::days(30),
            license_category: Some("c1".to_string()),
            safety_score: 92,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn reason(result: DomainResult<()>) -> &'static str {
        result.unwrap_err().reason()
    }

    #[test]
    fn happy_path_passes() {
        let v = vehicle(VehicleStatus::Available);
        let d = driver(DriverStatus::OnDuty);
        assert!(check_dispatch(&v, &d, 1000, today()).is_ok());
    }

    #[test]
    fn cargo_over_capacity() {
        let v = vehicle(VehicleStatus::Available);
        let d = driver(DriverStatus::OnDuty);
        assert_eq!(
            reason(check_dispatch(&v, &d, 1200, today())),
            "CARGO_EXCEEDS_CAPACITY"
        );
    }

    #[test]
    fn license_expired_yesterday() {
        let v = vehicle(VehicleStatus::Available);
        let mut d = driver(DriverStatus::OnDuty);
        d.license_expiry = today() - Duration::days(1);
        assert_eq!(reason(check_dispatch(&v, &d, 500, today())), "LICENSE_EXPIRED");

        // El día del vencimiento todavía es válido
        d.license_expiry = today();
        assert!(check_dispatch(&v, &d, 500, today()).is_ok());
    }

    #[test]
    fn suspended_and_off_duty_are_distinct() {
        let v = vehicle(VehicleStatus::Available);
        assert_eq!(
            reason(check_dispatch(&v, &driver(DriverStatus::Suspended), 10, today())),
            "DRIVER_SUSPENDED"
        );
        assert_eq!(
            reason(check_dispatch(&v, &driver(DriverStatus::OffDuty), 10, today())),
            "DRIVER_NOT_ON_DUTY"
        );
    }

    #[test]
    fn resources_on_trip_are_double_dispatch_conflicts() {
        let d = driver(DriverStatus::OnDuty);
        let err = check_dispatch(&vehicle(VehicleStatus::OnTrip), &d, 10, today()).unwrap_err();
        assert_eq!(err.conflict_kind(), Some(ConflictKind::DoubleDispatchPrevented));

        let v = vehicle(VehicleStatus::Available);
        let err = check_dispatch(&v, &driver(DriverStatus::OnTrip), 10, today()).unwrap_err();
        assert_eq!(err.conflict_kind(), Some(ConflictKind::DoubleDispatchPrevented));
    }

    #[test]
    fn vehicle_in_shop_is_not_available() {
        let d = driver(DriverStatus::OnDuty);
        assert_eq!(
            reason(check_dispatch(&vehicle(VehicleStatus::InShop), &d, 10, today())),
            "VEHICLE_NOT_AVAILABLE"
        );
    }

    #[test]
    fn category_only_checked_when_both_are_set() {
        let mut v = vehicle(VehicleStatus::Available);
        let mut d = driver(DriverStatus::OnDuty);
        d.license_category = Some("B".to_string());
        assert_eq!(
            reason(check_dispatch(&v, &d, 10, today())),
            "LICENSE_CATEGORY_MISMATCH"
        );

        v.vehicle_class = None;
        assert!(check_dispatch(&v, &d, 10, today()).is_ok());

        v.vehicle_class = Some("C1".to_string());
        d.license_category = None;
        assert!(check_dispatch(&v, &d, 10, today()).is_ok());
    }

    #[test]
    fn draft_allows_off_duty_driver_but_not_retired_vehicle() {
        let v = vehicle(VehicleStatus::Available);
        assert!(check_draft(&v, &driver(DriverStatus::OffDuty), 10, today()).is_ok());
        assert_eq!(
            reason(check_draft(&vehicle(VehicleStatus::Retired), &driver(DriverStatus::OnDuty), 10, today())),
            "VEHICLE_NOT_AVAILABLE"
        );
        assert_eq!(
            reason(check_draft(&v, &driver(DriverStatus::Suspended), 10, today())),
            "DRIVER_SUSPENDED"
        );
    }

    #[test]
    fn final_odometer_must_strictly_increase() {
        assert_eq!(reason(check_final_odometer(1000, 1000, 1000)), "ODOMETER_REGRESSION");
        assert_eq!(reason(check_final_odometer(1000, 1000, 900)), "ODOMETER_REGRESSION");
        assert_eq!(reason(check_final_odometer(1000, 1500, 1200)), "ODOMETER_REGRESSION");
        assert!(check_final_odometer(1000, 1000, 1001).is_ok());
    }

    #[test]
    fn fuel_entry_validation() {
        assert_eq!(check_fuel(None, None).unwrap(), None);
        assert_eq!(
            check_fuel(Some(Decimal::new(455, 1)), Some(Decimal::new(7890, 2))).unwrap(),
            Some(FuelEntry {
                liters: Decimal::new(455, 1),
                fuel_cost: Some(Decimal::new(7890, 2)),
            })
        );
        for (liters, cost) in [
            (None, Some(Decimal::ONE)),
            (Some(Decimal::ZERO), None),
            (Some(Decimal::ONE), Some(Decimal::NEGATIVE_ONE)),
        ] {
            assert_eq!(
                check_fuel(liters, cost).unwrap_err().reason(),
                "INVALID_FUEL_LOG"
            );
        }
    }
}
